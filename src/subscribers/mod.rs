//! # Event subscribers for the activation runtime.
//!
//! ```text
//!   Arbiter / handlers / pipeline ── publish(Event) ──► Bus ──► Activator listener
//!                                                                   │
//!                                                             SubscriberSet::emit
//!                                                          ┌────────┼────────┐
//!                                                          ▼        ▼        ▼
//!                                                      LogWriter  Metrics  Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
