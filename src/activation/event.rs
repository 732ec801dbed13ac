//! # Activation events delivered by the environment.
//!
//! An [`ActivationEvent`] is either a normal launch or a file-open carrying the
//! opened items. It is immutable once constructed and cheap to clone (file
//! handles are shared).
//!
//! ## Example
//! ```rust
//! use activator::{ActivationEvent, ActivationKind, LocalFile};
//!
//! let ev = ActivationEvent::file_open(LocalFile::arc("blink.hex"));
//! assert_eq!(ev.kind(), ActivationKind::FileOpen);
//! assert_eq!(ev.file().map(|f| f.name().to_string()).as_deref(), Some("blink.hex"));
//!
//! assert!(ActivationEvent::Normal.file().is_none());
//! ```

use std::fmt;

use super::file::FileRef;

/// Classification of an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    /// Plain launch (tile, shortcut, command line without a file).
    Normal,
    /// Launch caused by the user opening a data file with the application.
    FileOpen,
}

impl ActivationKind {
    /// Short stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationKind::Normal => "normal",
            ActivationKind::FileOpen => "file_open",
        }
    }
}

/// Activation payload.
#[derive(Clone)]
pub enum ActivationEvent {
    /// Normal launch.
    Normal,
    /// File-open launch. The environment may report several items; the first
    /// one is the file that gets delivered.
    FileOpen {
        /// Opened items, in the order the environment reported them.
        files: Vec<FileRef>,
    },
}

impl ActivationEvent {
    /// File-open activation for a single item.
    pub fn file_open(file: FileRef) -> Self {
        ActivationEvent::FileOpen { files: vec![file] }
    }

    /// Returns the activation kind.
    pub fn kind(&self) -> ActivationKind {
        match self {
            ActivationEvent::Normal => ActivationKind::Normal,
            ActivationEvent::FileOpen { .. } => ActivationKind::FileOpen,
        }
    }

    #[inline]
    pub fn is_file_open(&self) -> bool {
        matches!(self, ActivationEvent::FileOpen { .. })
    }

    /// The item to deliver: the first opened file, if any.
    pub fn file(&self) -> Option<&FileRef> {
        match self {
            ActivationEvent::Normal => None,
            ActivationEvent::FileOpen { files } => files.first(),
        }
    }
}

impl fmt::Debug for ActivationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationEvent::Normal => f.write_str("Normal"),
            ActivationEvent::FileOpen { files } => f
                .debug_struct("FileOpen")
                .field("files", &files.iter().map(|x| x.name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}
