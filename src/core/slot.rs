use crate::source::ListenerId;

/// Role a handler plays while registered with the activation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerRole {
    /// Records the activation into the arbiter.
    Capture,
    /// Routes the activation to the import pipeline.
    Deliver,
}

impl ListenerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerRole::Capture => "capture",
            ListenerRole::Deliver => "deliver",
        }
    }
}

/// Handler currently registered with the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Installed {
    pub role: ListenerRole,
    pub id: ListenerId,
    /// Install generation; a handler only retires the registration it created.
    pub generation: u64,
}

/// Progress of the rebinding protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SlotStatus {
    /// Nothing installed yet.
    Idle,
    /// Capture handler installed, waiting for the activation.
    Capturing,
    /// Capture handler fired and removed itself.
    Captured,
    /// Deliver handler installed.
    Delivering,
    /// Deliver handler fired and removed itself.
    Delivered,
}

/// The single handler slot.
pub(super) struct SlotState {
    pub status: SlotStatus,
    pub installed: Option<Installed>,
    next_generation: u64,
}

impl SlotState {
    /// Creates a new idle slot.
    pub fn new() -> Self {
        Self {
            status: SlotStatus::Idle,
            installed: None,
            next_generation: 0,
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Takes the registration if it still belongs to `generation`.
    pub fn take_if(&mut self, generation: u64) -> Option<Installed> {
        match self.installed {
            Some(i) if i.generation == generation => self.installed.take(),
            _ => None,
        }
    }

    /// Whether the deliver phase was entered.
    pub fn delivery_bound(&self) -> bool {
        matches!(self.status, SlotStatus::Delivering | SlotStatus::Delivered)
    }
}
