//! # Deliver a file activation to the importer.
//!
//! Turns one [`ActivationEvent`] into one import and publishes lifecycle events to [`Bus`].
//!
//! ## Event flow
//! ```text
//! Normal launch:
//!   (nothing observable) → Delivery::NotFileActivation
//!
//! File-open:
//!   publish DeliveryStarted
//!     ├─ no item / not a regular file → publish NotRegularFile → Delivery::NotRegularFile
//!     ├─ read_all_bytes() Err        → publish ImportFailed   → Err(Io)
//!     └─ publish PayloadExtracted
//!          └─ importer.import_decoded(bytes, create_new)
//!               ├─ Ok  → publish ImportCompleted → Delivery::Imported
//!               └─ Err → publish ImportFailed    → Err(..)
//! ```
//!
//! ## Rules
//! - The type query happens **before** any read; non-regular items are never read.
//! - The read is atomic from the caller's perspective: full payload or error.
//! - The importer is called at most once per delivery.

use std::path::PathBuf;

use crate::{
    activation::{ActivationEvent, FileItem},
    error::ActivationError,
    events::{Bus, Event, EventKind},
    import::Importer,
};

/// Outcome of a delivery attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The payload was handed to the importer and accepted.
    Imported {
        /// Payload length.
        bytes: usize,
    },
    /// The activation was a normal launch; nothing to import.
    NotFileActivation,
    /// The activated item is missing or not a regular file; nothing was read.
    NotRegularFile,
    /// The arbiter resolved to absent (no activation was captured in time).
    NoActivation,
    /// The captured activation was already replayed; the importer was not called again.
    AlreadyDelivered,
}

/// Reads the whole item into memory.
///
/// Returns `Ok(None)` without reading if the handle is not a regular file.
pub async fn extract_bytes(file: &dyn FileItem) -> Result<Option<Vec<u8>>, ActivationError> {
    if !file.is_regular_file().await {
        return Ok(None);
    }
    file.read_all_bytes()
        .await
        .map(Some)
        .map_err(|source| ActivationError::Io {
            path: PathBuf::from(file.name()),
            source,
        })
}

/// Delivers `event` to `importer`, passing `create_new` through as the import policy.
pub async fn deliver(
    event: &ActivationEvent,
    importer: &dyn Importer,
    create_new: bool,
    bus: &Bus,
) -> Result<Delivery, ActivationError> {
    if !event.is_file_open() {
        return Ok(Delivery::NotFileActivation);
    }

    let Some(file) = event.file() else {
        bus.publish(Event::new(EventKind::NotRegularFile).with_reason("no item"));
        return Ok(Delivery::NotRegularFile);
    };
    let name = file.name();
    bus.publish(
        Event::new(EventKind::DeliveryStarted)
            .with_file(name)
            .with_create_new(create_new),
    );

    let bytes = match extract_bytes(&**file).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            bus.publish(Event::new(EventKind::NotRegularFile).with_file(name));
            return Ok(Delivery::NotRegularFile);
        }
        Err(e) => {
            publish_failed(bus, name, create_new, &e);
            return Err(e);
        }
    };

    let len = bytes.len();
    bus.publish(
        Event::new(EventKind::PayloadExtracted)
            .with_file(name)
            .with_bytes(len),
    );

    match importer.import_decoded(bytes, create_new).await {
        Ok(()) => {
            bus.publish(
                Event::new(EventKind::ImportCompleted)
                    .with_file(name)
                    .with_bytes(len)
                    .with_create_new(create_new)
                    .with_importer(importer.name()),
            );
            Ok(Delivery::Imported { bytes: len })
        }
        Err(e) => {
            publish_failed(bus, name, create_new, &e);
            Err(e)
        }
    }
}

/// Publishes `ImportFailed` with error details.
fn publish_failed(bus: &Bus, file: &str, create_new: bool, err: &ActivationError) {
    bus.publish(
        Event::new(EventKind::ImportFailed)
            .with_file(file)
            .with_create_new(create_new)
            .with_reason(err.to_string()),
    );
}
