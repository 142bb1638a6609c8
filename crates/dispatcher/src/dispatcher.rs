//! EventDispatcher - fan-out of BusEvents to all configured publishers

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use contracts::{BusEvent, EventPublisher, EventSink, PublisherConfig, PublisherType};

use crate::error::DispatcherError;
use crate::handle::PublisherHandle;
use crate::metrics::MetricsSnapshot;
use crate::publishers::{FilePublisher, LogPublisher};

/// Cloneable fan-out front of all publisher workers.
///
/// Every component task holds a clone (usually wrapped in an [`EventSink`]
/// closure); events are cloned per publisher and queued with a non-blocking
/// `try_send`. Workers stop once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    channels: Arc<Vec<PublisherHandle>>,
}

impl EventDispatcher {
    /// Build a dispatcher over already-spawned publisher handles
    pub fn with_handles(channels: Vec<PublisherHandle>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Spawn a dispatcher over a single publisher (tests, embedding)
    pub fn single<P: EventPublisher + 'static>(
        publisher: P,
        queue_capacity: usize,
    ) -> (Self, DispatcherWorkers) {
        let name = publisher.name().to_string();
        let (handle, worker) = PublisherHandle::spawn(publisher, queue_capacity);
        (
            Self::with_handles(vec![handle]),
            DispatcherWorkers {
                workers: vec![(name, worker)],
            },
        )
    }

    /// Queue one event on every publisher (non-blocking)
    pub fn broadcast(&self, event: BusEvent) {
        for channel in self.channels.iter() {
            channel.try_send(event.clone());
        }
    }

    /// Wrap this dispatcher in an [`EventSink`] callback for the core tasks
    pub fn sink(&self) -> EventSink {
        let dispatcher = self.clone();
        Arc::new(move |event| dispatcher.broadcast(event))
    }

    /// Number of publishers behind this dispatcher
    pub fn publisher_count(&self) -> usize {
        self.channels.len()
    }

    /// Get metrics for all publishers
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.channels
            .iter()
            .map(|channel| (channel.name().to_string(), channel.metrics().snapshot()))
            .collect()
    }
}

/// Owner of the publisher worker tasks.
///
/// Call [`DispatcherWorkers::join`] after every [`EventDispatcher`] clone has
/// been dropped; workers drain their queues, flush and close before exiting.
pub struct DispatcherWorkers {
    workers: Vec<(String, JoinHandle<()>)>,
}

impl DispatcherWorkers {
    /// Wait for all publisher workers to drain and stop
    #[instrument(name = "dispatcher_workers_join", skip(self))]
    pub async fn join(self) {
        for (name, worker) in self.workers {
            if let Err(e) = worker.await {
                error!(publisher = %name, error = ?e, "Publisher worker panicked");
            }
            debug!(publisher = %name, "Publisher worker joined");
        }
        info!("Dispatcher shutdown complete");
    }
}

/// Create the publisher fan-out from configuration
#[instrument(
    name = "dispatcher_spawn_publishers",
    skip(configs),
    fields(publisher_count = configs.len())
)]
pub fn spawn_publishers(
    configs: &[PublisherConfig],
) -> Result<(EventDispatcher, DispatcherWorkers), DispatcherError> {
    let mut channels = Vec::with_capacity(configs.len());
    let mut workers = Vec::with_capacity(configs.len());

    for config in configs {
        let (handle, worker) = match config.publisher_type {
            PublisherType::Log => {
                let publisher = LogPublisher::new(&config.name);
                PublisherHandle::spawn(publisher, config.queue_capacity)
            }
            PublisherType::File => {
                let publisher = FilePublisher::from_params(&config.name, &config.params)
                    .map_err(|e| DispatcherError::publisher_creation(&config.name, e.to_string()))?;
                PublisherHandle::spawn(publisher, config.queue_capacity)
            }
        };
        channels.push(handle);
        workers.push((config.name.clone(), worker));
    }

    info!(publishers = channels.len(), "Dispatcher started");
    Ok((
        EventDispatcher::with_handles(channels),
        DispatcherWorkers { workers },
    ))
}
