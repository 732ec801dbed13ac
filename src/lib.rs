//! # activator
//!
//! **activator** decides, exactly once, how the host application was launched
//! (normally, or by the operating system opening a data file with it) and
//! hands that launch context to whichever subsystem asks for it, even if it
//! asks long after the activation fired, or if the activation never fires.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                  ┌───────────────────────────┐
//!                  │ ActivationSource          │  (environment; fires at most once)
//!                  │  add/remove/replace       │
//!                  └─────────────┬─────────────┘
//!                                │ exactly one handler registered
//!                 ┌──────────────┴───────────────┐
//!                 ▼                              ▼
//!       ┌──────────────────┐           ┌──────────────────┐
//!       │ capture (H1)     │  rebind   │ deliver (H2)     │
//!       │ unregister, then │ ────────► │ unregister, then │
//!       │ arbiter.offer()  │           │ pipeline(false)  │
//!       └────────┬─────────┘           └────────┬─────────┘
//!                ▼                              │
//!   ┌────────────────────────────┐              │
//!   │ Arbiter (write-once cell)  │◄── grace     │
//!   │ first of {signal, timer}   │    timer     │
//!   └────────────┬───────────────┘              │
//!                │ await_result() (replayable)  │
//!                ▼                              ▼
//!   load_if_pending() ─► pipeline(true) ─► extract_bytes ─► Importer
//! ```
//!
//! Every transition is published on a broadcast [`Bus`] and
//! fanned out to [`Subscribe`] implementations.
//!
//! ### Import policy
//! - **replay** (`load_if_pending`): the file launched the app → `create_new = true`
//! - **live** (deliver handler): the file arrived while starting up → `create_new = false`
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Arbitration**   | Single-shot race between activation and grace timer.     | [`Arbiter`], [`ArbiterState`]               |
//! | **Rebinding**     | One registered handler at a time, capture → deliver.     | [`Rebinder`], [`ListenerRole`]              |
//! | **Delivery**      | Read the file fully, hand bytes to the importer.         | [`Delivery`], [`Importer`], [`ImporterFn`]  |
//! | **Boundaries**    | Environment source and file handles.                     | [`ActivationSource`], [`FileItem`]          |
//! | **Subscriber API**| Observe runtime events (logging, metrics, UI hints).     | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for the import flow.                        | [`ActivationError`]                         |
//! | **Configuration** | Grace period, bus capacity, strict protocol.             | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber rendering events via `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use activator::{
//!     ActivationEvent, ActivationSource, Activator, Config, Delivery, ImporterFn, LocalFile,
//!     LocalSource,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = std::env::temp_dir().join(format!("activator-doc-{}", std::process::id()));
//!     std::fs::create_dir_all(&dir)?;
//!     let path = dir.join("blink.hex");
//!     std::fs::write(&path, b":00000001FF")?;
//!
//!     let source = LocalSource::arc();
//!     let act = Activator::builder(Config::default())
//!         .with_source(source.clone() as Arc<dyn ActivationSource>)
//!         .build();
//!
//!     // Early in startup: don't lose a double-clicked file.
//!     act.capture_once()?;
//!
//!     // The platform delivers the launch activation.
//!     source.fire(ActivationEvent::file_open(LocalFile::arc(&path)));
//!
//!     // Later, once the editor is ready.
//!     let importer = ImporterFn::arc("editor", |payload: Vec<u8>, create_new: bool| async move {
//!         println!("importing {} bytes (create_new={create_new})", payload.len());
//!         Ok::<(), activator::ActivationError>(())
//!     });
//!     act.init(importer).await?;
//!     assert!(act.has_activation_project());
//!
//!     let out = act.load_if_pending().await?;
//!     assert_eq!(out, Delivery::Imported { bytes: 11 });
//!
//!     act.shutdown().await;
//!     std::fs::remove_dir_all(&dir)?;
//!     Ok(())
//! }
//! ```

mod activation;
mod core;
mod error;
mod events;
mod import;
mod source;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use activation::{ActivationEvent, ActivationKind, FileItem, FileRef, LocalFile};
pub use crate::core::{
    deliver, extract_bytes, Activator, ActivatorBuilder, Arbiter, ArbiterState, Config, Delivery,
    ListenerRole, Rebinder, ResolvedBy, DEFAULT_GRACE,
};
pub use error::ActivationError;
pub use events::{Bus, Event, EventKind};
pub use import::{Importer, ImporterFn, ImporterRef};
pub use source::{ActivationSource, Handler, ListenerId, LocalSource};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber rendering events through `tracing`.
// Enabled by default via the `logging` feature.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
