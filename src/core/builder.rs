use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{activator::Activator, arbiter::Arbiter, config::Config};
use crate::{
    events::Bus,
    import::ImporterRef,
    source::{ActivationSource, LocalSource},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing an [`Activator`].
pub struct ActivatorBuilder {
    cfg: Config,
    source: Option<Arc<dyn ActivationSource>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    importer: Option<ImporterRef>,
}

impl ActivatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            source: None,
            subscribers: Vec::new(),
            importer: None,
        }
    }

    /// Sets the activation source handlers are registered with.
    ///
    /// Defaults to a fresh [`LocalSource`] nobody fires.
    pub fn with_source(mut self, source: Arc<dyn ActivationSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the importer used by `load_if_pending` until a rebind provides another one.
    pub fn with_importer(mut self, importer: ImporterRef) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Builds the activator and starts the arbiter's grace timer.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Arc<Activator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        // Listener subscribes before the arbiter starts so an immediate
        // resolution still reaches subscribers.
        let listener = subscriber_listener(&bus, subs, token.clone());

        let arbiter = Arbiter::start(self.cfg.grace_period(), bus.clone());
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(LocalSource::new()) as Arc<dyn ActivationSource>);

        Arc::new(Activator::new_internal(
            self.cfg,
            bus,
            source,
            arbiter,
            self.importer,
            token,
            listener,
        ))
    }
}

/// Forwards bus events to the subscriber set until cancelled, then drains it.
///
/// Events already queued on the bus when the token fires are still forwarded.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        set.shutdown().await;
    })
}
