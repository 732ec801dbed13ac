//! Runtime core: arbitration, rebinding and delivery.
//!
//! The public entry point is [`Activator`], built with [`ActivatorBuilder`].
//!
//! Internal modules:
//! - [`arbiter`]: write-once cell racing the activation signal against a grace timer;
//! - [`rebinder`]: owns the single handler slot (capture → deliver);
//! - [`pipeline`]: extracts the file payload and calls the importer;
//! - [`activator`]: context object tying the above together;
//! - [`builder`]: wiring (bus, subscribers, timer).

mod activator;
mod arbiter;
mod builder;
mod config;
mod pipeline;
mod rebinder;
mod slot;

pub use activator::Activator;
pub use arbiter::{Arbiter, ArbiterState, ResolvedBy};
pub use builder::ActivatorBuilder;
pub use config::{Config, DEFAULT_GRACE};
pub use pipeline::{deliver, extract_bytes, Delivery};
pub use rebinder::Rebinder;
pub use slot::ListenerRole;

