//! # Listener rebinding: capture first, deliver later.
//!
//! [`Rebinder`] owns the single handler slot registered with the
//! [`ActivationSource`]. Two logical handlers can occupy it:
//!
//! - **capture (H1)**, installed by [`Rebinder::capture_once`]: unregisters
//!   itself and forwards the raw activation into the [`Arbiter`];
//! - **deliver (H2)**, installed by [`Rebinder::rebind_for_delivery`]:
//!   unregisters itself and routes a file activation into the delivery
//!   pipeline with `create_new = false`.
//!
//! ## Protocol
//! ```text
//!   Idle ──capture_once──► Capturing ──H1 fires──► Captured
//!                              │                       │
//!                              └───rebind_for_delivery─┴──► Delivering ──H2 fires──► Delivered
//! ```
//!
//! ## Rules
//! - At most one handler is registered at any instant; the swap goes through
//!   [`ActivationSource::replace_listener`] under the slot lock.
//! - Each handler retires only the registration it created (install
//!   generation), so a handler that fires after being swapped out never
//!   removes its successor.
//! - H2 never re-fires for an activation H1 already captured; that event is
//!   replayed from the arbiter (`Activator::load_if_pending`).
//! - Repeated or out-of-order calls are tolerated, or rejected with
//!   [`ActivationError::Protocol`] when `strict` is set.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::arbiter::Arbiter;
use super::pipeline::{self, Delivery};
use super::slot::{Installed, ListenerRole, SlotState, SlotStatus};
use crate::activation::ActivationEvent;
use crate::error::ActivationError;
use crate::events::{Bus, Event, EventKind};
use crate::import::ImporterRef;
use crate::source::{ActivationSource, Handler};

type LiveDelivery = JoinHandle<Result<Delivery, ActivationError>>;

struct Shared {
    source: Arc<dyn ActivationSource>,
    arbiter: Arc<Arbiter>,
    bus: Bus,
    strict: bool,
    runtime: Handle,
    slot: Mutex<SlotState>,
    live: Mutex<Option<LiveDelivery>>,
}

impl Shared {
    /// Unregisters the handler of `generation` if it is still installed.
    fn retire(&self, generation: u64, next: SlotStatus) -> bool {
        let mut slot = self.slot.lock();
        let Some(inst) = slot.take_if(generation) else {
            return false;
        };
        self.source.remove_listener(inst.id);
        slot.status = next;
        self.bus
            .publish(Event::new(EventKind::ListenerRemoved).with_role(inst.role));
        true
    }

    fn reject(&self, reason: String) -> Result<(), ActivationError> {
        if self.strict {
            return Err(ActivationError::protocol(reason));
        }
        tracing::debug!(%reason, "ignoring out-of-order rebinder call");
        Ok(())
    }
}

/// Manages which handler is registered with the activation source.
pub struct Rebinder {
    shared: Arc<Shared>,
}

impl Rebinder {
    /// Must be called within a tokio runtime; deliveries are spawned on it.
    pub(crate) fn new(
        source: Arc<dyn ActivationSource>,
        arbiter: Arc<Arbiter>,
        bus: Bus,
        strict: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                arbiter,
                bus,
                strict,
                runtime: Handle::current(),
                slot: Mutex::new(SlotState::new()),
                live: Mutex::new(None),
            }),
        }
    }

    /// Installs the capture handler.
    ///
    /// Precondition: called at most once, before any `rebind_for_delivery`.
    pub fn capture_once(&self) -> Result<(), ActivationError> {
        let mut slot = self.shared.slot.lock();
        if slot.status != SlotStatus::Idle {
            let reason = format!("capture_once called in state {:?}", slot.status);
            drop(slot);
            return self.shared.reject(reason);
        }

        let generation = slot.next_generation();
        let handler = capture_handler(Arc::downgrade(&self.shared), generation);
        let id = self.shared.source.add_listener(handler);
        slot.installed = Some(Installed {
            role: ListenerRole::Capture,
            id,
            generation,
        });
        slot.status = SlotStatus::Capturing;
        self.shared
            .bus
            .publish(Event::new(EventKind::ListenerInstalled).with_role(ListenerRole::Capture));
        Ok(())
    }

    /// Swaps whatever is installed for the deliver handler bound to `importer`.
    ///
    /// Once the deliver handler has fired nothing is registered again: the
    /// source fires at most once, and a stray second signal must stay unhandled.
    pub fn rebind_for_delivery(&self, importer: ImporterRef) -> Result<(), ActivationError> {
        let mut slot = self.shared.slot.lock();
        if slot.status == SlotStatus::Delivered || (slot.delivery_bound() && self.shared.strict) {
            let reason = format!("rebind_for_delivery called in state {:?}", slot.status);
            drop(slot);
            return self.shared.reject(reason);
        }

        let generation = slot.next_generation();
        let handler = deliver_handler(Arc::downgrade(&self.shared), generation, importer);
        let old = slot.installed.take();
        let id = self
            .shared
            .source
            .replace_listener(old.map(|i| i.id), handler);

        if let Some(old) = old {
            self.shared
                .bus
                .publish(Event::new(EventKind::ListenerRemoved).with_role(old.role));
        }
        slot.installed = Some(Installed {
            role: ListenerRole::Deliver,
            id,
            generation,
        });
        slot.status = SlotStatus::Delivering;
        self.shared
            .bus
            .publish(Event::new(EventKind::ListenerInstalled).with_role(ListenerRole::Deliver));
        Ok(())
    }

    /// Role of the handler currently registered, if any.
    pub fn installed_role(&self) -> Option<ListenerRole> {
        self.shared.slot.lock().installed.map(|i| i.role)
    }

    /// Waits for the delivery started by the deliver handler, if it fired.
    ///
    /// Returns `None` if H2 has not fired (or its result was already taken).
    pub async fn join_live_delivery(&self) -> Option<Result<Delivery, ActivationError>> {
        let handle = self.shared.live.lock().take()?;
        Some(match handle.await {
            Ok(res) => res,
            Err(e) => Err(ActivationError::Import {
                error: format!("delivery task aborted: {e}"),
            }),
        })
    }
}

fn capture_handler(shared: Weak<Shared>, generation: u64) -> Handler {
    Arc::new(move |event: ActivationEvent| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        shared.retire(generation, SlotStatus::Captured);
        shared.bus.publish(
            Event::new(EventKind::ActivationCaptured)
                .with_role(ListenerRole::Capture)
                .with_activation(event.kind()),
        );
        // Forwarded even if this handler was swapped out mid-dispatch; the
        // arbiter drops it if already resolved.
        shared.arbiter.offer(event);
    })
}

fn deliver_handler(shared: Weak<Shared>, generation: u64, importer: ImporterRef) -> Handler {
    Arc::new(move |event: ActivationEvent| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if !shared.retire(generation, SlotStatus::Delivered) {
            shared.bus.publish(
                Event::new(EventKind::DuplicateSignalIgnored)
                    .with_role(ListenerRole::Deliver)
                    .with_activation(event.kind()),
            );
            return;
        }
        shared.bus.publish(
            Event::new(EventKind::ActivationCaptured)
                .with_role(ListenerRole::Deliver)
                .with_activation(event.kind()),
        );

        let bus = shared.bus.clone();
        let importer = Arc::clone(&importer);
        let handle = shared.runtime.spawn(async move {
            let res = pipeline::deliver(&event, &*importer, false, &bus).await;
            if let Err(e) = &res {
                tracing::warn!(error = %e, label = e.as_label(), "activation delivery failed");
            }
            res
        });
        *shared.live.lock() = Some(handle);
    })
}
