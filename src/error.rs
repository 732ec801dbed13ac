//! Error types used by the activation runtime.
//!
//! [`ActivationError`] covers everything that can go wrong while an activation
//! is turned into an import: reading the opened file, the importer rejecting
//! the payload, and (opt-in) out-of-order use of the rebinder.
//!
//! Two outcomes are deliberately **not** errors:
//! - the arbiter timing out (a valid terminal state, reported as `ActivationMissed`);
//! - a second activation signal (silently ignored, reported as `DuplicateSignalIgnored`).

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by the activation import flow.
///
/// None of these are fatal to the host process; they are local to the
/// activation-import path and must not block normal startup.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActivationError {
    /// Reading the activated file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path (or display name) of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The importer rejected or failed to decode the payload.
    #[error("import failed: {error}")]
    Import {
        /// The underlying error message.
        error: String,
    },

    /// Rebinder operations were called out of order (strict mode only).
    #[error("activation protocol violation: {reason}")]
    Protocol {
        /// What went wrong.
        reason: String,
    },

    /// A replay was requested before any importer was installed.
    #[error("no importer installed")]
    NoImporter,
}

impl ActivationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use activator::ActivationError;
    ///
    /// let err = ActivationError::Import { error: "bad checksum".into() };
    /// assert_eq!(err.as_label(), "activation_import_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivationError::Io { .. } => "activation_io",
            ActivationError::Import { .. } => "activation_import_failed",
            ActivationError::Protocol { .. } => "activation_protocol",
            ActivationError::NoImporter => "activation_no_importer",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActivationError::Io { path, source } => {
                format!("io: {} ({source})", path.display())
            }
            ActivationError::Import { error } => format!("import: {error}"),
            ActivationError::Protocol { reason } => format!("protocol: {reason}"),
            ActivationError::NoImporter => "no importer installed".to_string(),
        }
    }

    /// Whether the error belongs to the I/O family (read or decode failure).
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ActivationError::Io { .. } | ActivationError::Import { .. }
        )
    }

    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        ActivationError::Protocol {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let io = ActivationError::Io {
            path: PathBuf::from("game.hex"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.as_label(), "activation_io");
        assert_eq!(ActivationError::NoImporter.as_label(), "activation_no_importer");
        assert_eq!(
            ActivationError::protocol("twice").as_label(),
            "activation_protocol"
        );
    }

    #[test]
    fn test_io_family() {
        let io = ActivationError::Io {
            path: PathBuf::from("a.hex"),
            source: std::io::Error::other("disk"),
        };
        assert!(io.is_io());
        assert!(ActivationError::Import { error: "x".into() }.is_io());
        assert!(!ActivationError::NoImporter.is_io());
        assert!(!ActivationError::protocol("x").is_io());
    }

    #[test]
    fn test_display_includes_path() {
        let io = ActivationError::Io {
            path: PathBuf::from("/tmp/prog.hex"),
            source: std::io::Error::other("denied"),
        };
        let msg = io.to_string();
        assert!(msg.contains("/tmp/prog.hex"), "{msg}");
        assert!(msg.contains("denied"), "{msg}");
    }

    #[test]
    fn test_messages_carry_details() {
        assert_eq!(
            ActivationError::Import { error: "bad checksum".into() }.as_message(),
            "import: bad checksum"
        );
        assert_eq!(
            ActivationError::protocol("twice").as_message(),
            "protocol: twice"
        );
        assert_eq!(ActivationError::NoImporter.as_message(), "no importer installed");
    }
}
