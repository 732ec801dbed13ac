//! # Activator: the activation context owned by the startup sequence.
//!
//! The [`Activator`] owns the event bus, the [`Arbiter`], the [`Rebinder`] and
//! the importer used for replay. It is created once by the host's startup code
//! (see [`ActivatorBuilder`](super::ActivatorBuilder)) and handed to whichever
//! subsystem needs the launch context.
//!
//! ## High-level flow
//! ```text
//! build()
//!   ├─► Bus + SubscriberSet listener
//!   └─► Arbiter::start(grace)              (timer running)
//!
//! capture_once()            ─► H1 registered with the source
//!   source fires            ─► H1 unregisters, arbiter.offer(event)
//!
//! init(importer)            ─► await arbiter ─► has_activation_project
//!                           └─► rebind_for_delivery(importer): H1 ─► H2
//!   source fires (late)     ─► H2 unregisters, deliver(event, create_new = false)
//!
//! load_if_pending()         ─► await arbiter (cached) ─► deliver(event, create_new = true)
//! ```
//!
//! ## Rules
//! - Single writer (the arbiter), many readers: every consumer observes the same outcome.
//! - Failures are local to the import flow and never block startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::arbiter::Arbiter;
use super::builder::ActivatorBuilder;
use super::config::Config;
use super::pipeline::{self, Delivery};
use super::rebinder::Rebinder;
use crate::activation::ActivationEvent;
use crate::error::ActivationError;
use crate::events::{Bus, Event};
use crate::import::ImporterRef;
use crate::source::ActivationSource;

/// Launch activation context.
pub struct Activator {
    cfg: Config,
    bus: Bus,
    source: Arc<dyn ActivationSource>,
    arbiter: Arc<Arbiter>,
    rebinder: Rebinder,
    importer: Mutex<Option<ImporterRef>>,
    has_activation_project: AtomicBool,
    entered: AtomicBool,
    replayed: AtomicBool,
    token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Activator {
    /// Starts building an activator with the given configuration.
    pub fn builder(cfg: Config) -> ActivatorBuilder {
        ActivatorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        source: Arc<dyn ActivationSource>,
        arbiter: Arc<Arbiter>,
        importer: Option<ImporterRef>,
        token: CancellationToken,
        listener: JoinHandle<()>,
    ) -> Self {
        let rebinder = Rebinder::new(
            Arc::clone(&source),
            Arc::clone(&arbiter),
            bus.clone(),
            cfg.strict_protocol,
        );
        Self {
            cfg,
            bus,
            source,
            arbiter,
            rebinder,
            importer: Mutex::new(importer),
            has_activation_project: AtomicBool::new(false),
            entered: AtomicBool::new(false),
            replayed: AtomicBool::new(false),
            token,
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Registers the capture handler so a launch activation is not lost
    /// while the rest of the application starts.
    pub fn capture_once(&self) -> Result<(), ActivationError> {
        self.rebinder.capture_once()
    }

    /// Swaps the capture handler for the deliver handler and remembers
    /// `importer` for [`load_if_pending`](Self::load_if_pending).
    pub fn rebind_for_delivery(&self, importer: ImporterRef) -> Result<(), ActivationError> {
        self.rebinder.rebind_for_delivery(Arc::clone(&importer))?;
        *self.importer.lock() = Some(importer);
        Ok(())
    }

    /// Startup entry point once the consumer is ready.
    ///
    /// Waits for the arbiter, records whether the launch carried a file, then
    /// rebinds for delivery. Does not import the captured file itself; call
    /// [`load_if_pending`](Self::load_if_pending) when the UI can take it.
    pub async fn init(&self, importer: ImporterRef) -> Result<(), ActivationError> {
        let result = self.arbiter.await_result().await;
        if result.as_ref().is_some_and(ActivationEvent::is_file_open) {
            self.has_activation_project.store(true, Ordering::Release);
        }
        self.rebind_for_delivery(importer)
    }

    /// Replays the captured activation, if it was a file, through the import
    /// pipeline with `create_new = true`.
    ///
    /// Safe to call after resolution (the cached value replays instantly).
    /// Never touches source registrations. The importer sees the captured
    /// file at most once; later calls report [`Delivery::AlreadyDelivered`].
    pub async fn load_if_pending(&self) -> Result<Delivery, ActivationError> {
        if self.entered.swap(true, Ordering::AcqRel) && self.cfg.strict_protocol {
            return Err(ActivationError::protocol("load_if_pending called twice"));
        }

        let Some(event) = self.arbiter.await_result().await else {
            return Ok(Delivery::NoActivation);
        };
        if !event.is_file_open() {
            return Ok(Delivery::NotFileActivation);
        }

        let importer = self
            .importer
            .lock()
            .clone()
            .ok_or(ActivationError::NoImporter)?;
        if self.replayed.swap(true, Ordering::AcqRel) {
            return Ok(Delivery::AlreadyDelivered);
        }
        pipeline::deliver(&event, &*importer, true, &self.bus).await
    }

    /// Waits for the arbiter and returns its cached outcome.
    pub async fn await_result(&self) -> Option<ActivationEvent> {
        self.arbiter.await_result().await
    }

    /// Waits for the delivery started by a live (post-rebind) activation.
    pub async fn join_live_delivery(&self) -> Option<Result<Delivery, ActivationError>> {
        self.rebinder.join_live_delivery().await
    }

    /// `true` once [`init`](Self::init) observed a file-open launch activation.
    pub fn has_activation_project(&self) -> bool {
        self.has_activation_project.load(Ordering::Acquire)
    }

    /// Receiver for runtime events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub fn arbiter(&self) -> &Arc<Arbiter> {
        &self.arbiter
    }

    pub fn rebinder(&self) -> &Rebinder {
        &self.rebinder
    }

    pub fn source(&self) -> &Arc<dyn ActivationSource> {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Stops event fan-out and waits for subscriber workers to drain.
    ///
    /// The arbiter timer is not affected.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let listener = self.listener.lock().take();
        if let Some(h) = listener {
            let _ = h.await;
        }
    }
}
