//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the activation runtime.
//!
//! ## Sentinel values
//! - `grace = 0s` → the arbiter resolves to absent immediately
//!   (activation capture effectively disabled)

use std::time::Duration;

/// Default time the arbiter waits for the launch activation.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(3500);

/// Configuration for the activation runtime.
///
/// ## Field semantics
/// - `grace`: how long the arbiter waits for the launch activation before resolving to absent
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `strict_protocol`: fail fast on out-of-order rebinder calls instead of ignoring them
#[derive(Clone, Debug)]
pub struct Config {
    /// Time window for the launch activation.
    ///
    /// The timer starts when the runtime is built and cannot be cancelled;
    /// once it fires without a prior signal, a later signal is ignored.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Report repeated or out-of-order `capture_once` / `rebind_for_delivery`
    /// calls as `ActivationError::Protocol`.
    ///
    /// When `false` (default) such calls are silently tolerated.
    pub strict_protocol: bool,
}

impl Config {
    /// Returns the grace period as an `Option`.
    ///
    /// - `None` → resolve to absent immediately
    /// - `Some(d)` → wait up to `d` for the activation
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 3500ms`
    /// - `bus_capacity = 1024`
    /// - `strict_protocol = false`
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            bus_capacity: 1024,
            strict_protocol: false,
        }
    }
}
