//! # LogWriter: events rendered through `tracing`
//!
//! A subscriber that turns runtime events into structured `tracing` records.
//! Install any `tracing` subscriber in the host application to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG activator: listener installed role="capture"
//!  INFO activator: activation resolved kind="file_open"
//!  INFO activator: import completed file="blink.hex" bytes=2048 create_new=true
//!  WARN activator: import failed file="blink.hex" reason="import failed: bad checksum"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let role = e.role.map(|r| r.as_str());
        let kind = e.activation.map(|k| k.as_str());
        let file = e.file.as_deref();
        let reason = e.reason.as_deref();

        match e.kind {
            EventKind::ListenerInstalled => {
                tracing::debug!(target: "activator", ?role, "listener installed");
            }
            EventKind::ListenerRemoved => {
                tracing::debug!(target: "activator", ?role, "listener removed");
            }
            EventKind::ActivationCaptured => {
                tracing::debug!(target: "activator", ?role, ?kind, "activation captured");
            }
            EventKind::ActivationResolved => {
                tracing::info!(target: "activator", ?kind, "activation resolved");
            }
            EventKind::ActivationMissed => {
                tracing::info!(target: "activator", timeout_ms = ?e.timeout_ms, "no activation within grace period");
            }
            EventKind::DuplicateSignalIgnored => {
                tracing::debug!(target: "activator", ?role, ?kind, "duplicate activation ignored");
            }
            EventKind::DeliveryStarted => {
                tracing::info!(target: "activator", ?file, create_new = ?e.create_new, "delivering activation");
            }
            EventKind::NotRegularFile => {
                tracing::info!(target: "activator", ?file, ?reason, "activated item is not a regular file");
            }
            EventKind::PayloadExtracted => {
                tracing::debug!(target: "activator", ?file, bytes = ?e.bytes, "payload extracted");
            }
            EventKind::ImportCompleted => {
                tracing::info!(
                    target: "activator",
                    ?file,
                    bytes = ?e.bytes,
                    create_new = ?e.create_new,
                    importer = ?e.importer.as_deref(),
                    "import completed"
                );
            }
            EventKind::ImportFailed => {
                tracing::warn!(target: "activator", ?file, ?reason, "import failed");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "activator", subscriber = ?e.subscriber, ?reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "activator", subscriber = ?e.subscriber, ?reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}
