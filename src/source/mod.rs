//! # Activation signal source.
//!
//! The environment delivers the launch activation through an
//! `addEventListener`/`removeEventListener`-style facility. [`ActivationSource`]
//! is that boundary; [`LocalSource`] is an in-process implementation the
//! embedding application fires when the platform hands it an activation.
//!
//! ## Dispatch model
//! ```text
//! fire(event)
//!   ├─► lock, snapshot registered handlers, unlock
//!   └─► call each handler synchronously with a clone of the event
//! ```
//!
//! Handlers may add/remove listeners from inside their own invocation
//! (the snapshot is taken before any handler runs).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::activation::ActivationEvent;

/// Synchronous activation handler.
pub type Handler = Arc<dyn Fn(ActivationEvent) + Send + Sync + 'static>;

/// Identifies a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Facility that delivers the launch activation to registered handlers.
///
/// The environment fires at most once per process lifetime; consumers must
/// still tolerate a second delivery.
pub trait ActivationSource: Send + Sync + 'static {
    /// Registers `handler`; registration is additive.
    fn add_listener(&self, handler: Handler) -> ListenerId;

    /// Unregisters the handler. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Removes `old` (if any) and registers `handler`.
    ///
    /// Implementations should make the swap atomic with respect to dispatch,
    /// so that an activation is never observed by neither handler.
    fn replace_listener(&self, old: Option<ListenerId>, handler: Handler) -> ListenerId {
        if let Some(old) = old {
            self.remove_listener(old);
        }
        self.add_listener(handler)
    }

    /// Number of currently registered handlers.
    fn listener_count(&self) -> usize;
}

#[derive(Default)]
struct SourceState {
    next_id: u64,
    listeners: Vec<(ListenerId, Handler)>,
    fired: u64,
}

impl SourceState {
    fn insert(&mut self, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, handler));
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }
}

/// In-process [`ActivationSource`].
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use activator::{ActivationEvent, ActivationSource, LocalSource};
///
/// let src = LocalSource::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = hits.clone();
/// let id = src.add_listener(Arc::new(move |_ev: ActivationEvent| {
///     h.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// assert_eq!(src.fire(ActivationEvent::Normal), 1);
/// assert!(src.remove_listener(id));
/// assert_eq!(src.fire(ActivationEvent::Normal), 0);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct LocalSource {
    state: Mutex<SourceState>,
}

impl LocalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the source as a shared handle.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Delivers `event` to every handler registered at the time of the call.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&self, event: ActivationEvent) -> usize {
        let snapshot: Vec<Handler> = {
            let mut st = self.state.lock();
            st.fired += 1;
            st.listeners.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        for h in &snapshot {
            h(event.clone());
        }
        snapshot.len()
    }

    /// How many times [`fire`](Self::fire) was called.
    pub fn fire_count(&self) -> u64 {
        self.state.lock().fired
    }
}

impl ActivationSource for LocalSource {
    fn add_listener(&self, handler: Handler) -> ListenerId {
        self.state.lock().insert(handler)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.lock().remove(id)
    }

    fn replace_listener(&self, old: Option<ListenerId>, handler: Handler) -> ListenerId {
        let mut st = self.state.lock();
        if let Some(old) = old {
            st.remove(old);
        }
        st.insert(handler)
    }

    fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}
