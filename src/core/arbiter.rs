//! # Single-shot activation arbiter.
//!
//! [`Arbiter`] decides, exactly once, what the launch context was. Two sources
//! race to write a write-once cell:
//! - the activation signal, forwarded by the capture handler via [`Arbiter::offer`];
//! - a grace timer started at construction.
//!
//! ## Architecture
//! ```text
//! Arbiter::start(grace)
//!   └─► spawn timer: select! {
//!          sleep(grace)          ─► resolve(None)   (ActivationMissed)
//!          cell resolved (signal) ─► exit           (timer discarded)
//!       }
//!
//! offer(event) ─► first writer? ─► Resolved(Some(event))  (ActivationResolved)
//!                       └─ no  ─► ignored                 (DuplicateSignalIgnored)
//!
//! await_result() ─► wait_for(resolved) ─► clone of the cached outcome
//! ```
//!
//! ## Rules
//! - **Write-once**: first writer wins; later offers and a late timer are silent no-ops.
//! - **Replayable**: any number of callers, before or after resolution, observe the same value.
//! - **No filtering**: any activation kind is accepted; policy lives in the rebinder.
//! - **Infallible**: absence is a valid terminal state, not an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::activation::ActivationEvent;
use crate::events::{Bus, Event, EventKind};

/// What resolved the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    /// An activation signal arrived first.
    Signal,
    /// The grace period elapsed first.
    Timeout,
}

/// Observable state of the write-once cell.
#[derive(Debug, Clone)]
pub enum ArbiterState {
    /// Neither the signal nor the timer has fired.
    Pending,
    /// Final outcome; never changes again.
    Resolved {
        /// `None` if the timer won.
        result: Option<ActivationEvent>,
        by: ResolvedBy,
    },
}

impl ArbiterState {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ArbiterState::Resolved { .. })
    }

    /// Cached outcome, if resolved.
    pub fn result(&self) -> Option<&Option<ActivationEvent>> {
        match self {
            ArbiterState::Pending => None,
            ArbiterState::Resolved { result, .. } => Some(result),
        }
    }

    pub fn resolved_by(&self) -> Option<ResolvedBy> {
        match self {
            ArbiterState::Pending => None,
            ArbiterState::Resolved { by, .. } => Some(*by),
        }
    }
}

/// Write-once cell racing the activation signal against a grace timer.
#[derive(Debug)]
pub struct Arbiter {
    cell: watch::Sender<ArbiterState>,
    grace: Option<Duration>,
    bus: Bus,
}

impl Arbiter {
    /// Creates the arbiter and starts its grace timer.
    ///
    /// `grace = None` resolves to absent immediately. Must be called within a
    /// tokio runtime otherwise.
    pub fn start(grace: Option<Duration>, bus: Bus) -> Arc<Self> {
        let (cell, _rx) = watch::channel(ArbiterState::Pending);
        let arbiter = Arc::new(Self { cell, grace, bus });

        match grace {
            None => arbiter.resolve_timeout(),
            Some(dur) => {
                let timer = Arc::clone(&arbiter);
                let mut rx = arbiter.cell.subscribe();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = time::sleep(dur) => timer.resolve_timeout(),
                        _ = rx.wait_for(ArbiterState::is_resolved) => {}
                    }
                });
            }
        }
        arbiter
    }

    /// Offers an activation signal. Returns `true` if it resolved the arbiter.
    ///
    /// Never blocks; safe to call from a synchronous source handler.
    pub fn offer(&self, event: ActivationEvent) -> bool {
        let kind = event.kind();
        let won = self.cell.send_if_modified(|st| match st {
            ArbiterState::Pending => {
                *st = ArbiterState::Resolved {
                    result: Some(event),
                    by: ResolvedBy::Signal,
                };
                true
            }
            ArbiterState::Resolved { .. } => false,
        });

        if won {
            self.bus
                .publish(Event::new(EventKind::ActivationResolved).with_activation(kind));
        } else {
            self.bus
                .publish(Event::new(EventKind::DuplicateSignalIgnored).with_activation(kind));
        }
        won
    }

    fn resolve_timeout(&self) {
        let won = self.cell.send_if_modified(|st| match st {
            ArbiterState::Pending => {
                *st = ArbiterState::Resolved {
                    result: None,
                    by: ResolvedBy::Timeout,
                };
                true
            }
            ArbiterState::Resolved { .. } => false,
        });

        if won {
            self.bus.publish(
                Event::new(EventKind::ActivationMissed)
                    .with_timeout(self.grace.unwrap_or(Duration::ZERO)),
            );
        }
    }

    /// Waits for resolution and returns the cached outcome.
    ///
    /// Callable any number of times, before or after resolution.
    pub async fn await_result(&self) -> Option<ActivationEvent> {
        let mut rx = self.cell.subscribe();
        let out = match rx.wait_for(ArbiterState::is_resolved).await {
            Ok(st) => st.result().cloned().flatten(),
            // The sender lives in `self`; it cannot be dropped while borrowed.
            Err(_) => None,
        };
        out
    }

    /// Non-suspending view of the cell.
    pub fn peek(&self) -> ArbiterState {
        self.cell.borrow().clone()
    }

    /// Configured grace period (`None` = resolved immediately).
    pub fn grace(&self) -> Option<Duration> {
        self.grace
    }
}
