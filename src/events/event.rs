//! # Runtime events emitted by the arbiter, rebinder and delivery pipeline.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Listener events**: which handler is registered with the activation source
//! - **Arbiter events**: how (and whether) the launch activation was resolved
//! - **Delivery events**: payload extraction and import
//! - **Subscriber events**: fan-out health (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! listener role, file name, byte counts and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use activator::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ImportCompleted)
//!     .with_file("blink.hex")
//!     .with_bytes(512)
//!     .with_create_new(true);
//!
//! assert_eq!(ev.kind, EventKind::ImportCompleted);
//! assert_eq!(ev.file.as_deref(), Some("blink.hex"));
//! assert_eq!(ev.bytes, Some(512));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::activation::ActivationKind;
use crate::core::ListenerRole;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Listener events ===
    /// A handler was registered with the activation source.
    ///
    /// Sets:
    /// - `role`: capture or deliver
    ListenerInstalled,

    /// A handler was unregistered (swapped out, or removed after firing).
    ///
    /// Sets:
    /// - `role`: role of the removed handler
    ListenerRemoved,

    /// A registered handler observed an activation.
    ///
    /// Sets:
    /// - `role`: handler that observed it
    /// - `activation`: activation kind
    ActivationCaptured,

    // === Arbiter events ===
    /// The arbiter resolved with a signal (first writer).
    ///
    /// Sets:
    /// - `activation`: activation kind
    ActivationResolved,

    /// The grace period elapsed before any signal; the arbiter resolved to absent.
    ///
    /// Sets:
    /// - `timeout_ms`: configured grace period (ms)
    ActivationMissed,

    /// A signal arrived after resolution (or a handler fired twice) and was ignored.
    ///
    /// Sets:
    /// - `activation`: activation kind of the ignored signal
    /// - `role`: handler that saw it, if any
    DuplicateSignalIgnored,

    // === Delivery events ===
    /// Delivery of a file activation started.
    ///
    /// Sets:
    /// - `file`: file name
    /// - `create_new`: import policy flag
    DeliveryStarted,

    /// The activated item is not a regular file; nothing was read.
    ///
    /// Sets:
    /// - `file`: item name
    NotRegularFile,

    /// File content was read fully into memory.
    ///
    /// Sets:
    /// - `file`: file name
    /// - `bytes`: payload length
    PayloadExtracted,

    /// The importer accepted the payload.
    ///
    /// Sets:
    /// - `file`, `bytes`, `create_new`, `importer`
    ImportCompleted,

    /// Reading or importing failed.
    ///
    /// Sets:
    /// - `file`, `create_new`
    /// - `reason`: error message
    ImportFailed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Activation kind, for signal-related events.
    pub activation: Option<ActivationKind>,
    /// Listener role, for registration-related events.
    pub role: Option<ListenerRole>,
    /// Name of the activated file.
    pub file: Option<Arc<str>>,
    /// Name of the importer that handled the payload.
    pub importer: Option<Arc<str>>,
    /// Payload length in bytes.
    pub bytes: Option<u64>,
    /// Import policy flag ("create a new project if the target is missing").
    pub create_new: Option<bool>,
    /// Grace period in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Subscriber name, for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            activation: None,
            role: None,
            file: None,
            importer: None,
            bytes: None,
            create_new: None,
            timeout_ms: None,
            reason: None,
            subscriber: None,
        }
    }

    #[inline]
    pub fn with_activation(mut self, kind: ActivationKind) -> Self {
        self.activation = Some(kind);
        self
    }

    #[inline]
    pub fn with_role(mut self, role: ListenerRole) -> Self {
        self.role = Some(role);
        self
    }

    #[inline]
    pub fn with_file(mut self, name: impl Into<Arc<str>>) -> Self {
        self.file = Some(name.into());
        self
    }

    #[inline]
    pub fn with_importer(mut self, name: impl Into<Arc<str>>) -> Self {
        self.importer = Some(name.into());
        self
    }

    #[inline]
    pub fn with_bytes(mut self, n: usize) -> Self {
        self.bytes = Some(n as u64);
        self
    }

    #[inline]
    pub fn with_create_new(mut self, flag: bool) -> Self {
        self.create_new = Some(flag);
        self
    }

    /// Attaches a grace period (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
