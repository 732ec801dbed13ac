//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Arbiter`, capture/deliver handlers, the delivery pipeline,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `Activator` listener (fans out to `SubscriberSet`) and
//!   receivers handed out by `Activator::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
