//! # Activation data model.
//!
//! - [`ActivationEvent`], [`ActivationKind`] what the environment delivered
//! - [`FileItem`], [`FileRef`], [`LocalFile`] the file boundary

mod event;
mod file;

pub use event::{ActivationEvent, ActivationKind};
pub use file::{FileItem, FileRef, LocalFile};
