//! PublisherHandle - sender side of one publisher's isolated queue + worker

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{BusEvent, EventPublisher};
use observability::{record_event_dropped, record_event_published};

use crate::metrics::PublisherMetrics;

/// Sender handle to a running publisher worker.
///
/// The worker task is returned separately so the dispatcher can await all
/// workers on shutdown after every sender has been dropped.
#[derive(Debug, Clone)]
pub struct PublisherHandle {
    /// Publisher name
    name: String,
    /// Channel to send events to the worker
    tx: mpsc::Sender<BusEvent>,
    /// Shared metrics
    metrics: Arc<PublisherMetrics>,
}

impl PublisherHandle {
    /// Spawn the worker task for a publisher and return its sender handle
    pub fn spawn<P: EventPublisher + 'static>(
        publisher: P,
        queue_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let name = publisher.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(PublisherMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();
        let worker = tokio::spawn(async move {
            publisher_worker(publisher, rx, worker_metrics, worker_name).await;
        });

        (Self { name, tx, metrics }, worker)
    }

    /// Get publisher name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<PublisherMetrics> {
        &self.metrics
    }

    /// Send an event to the publisher (non-blocking)
    ///
    /// Returns true if queued, false if the queue was full (event dropped)
    pub fn try_send(&self, event: BusEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.metrics.inc_dropped_count();
                record_event_dropped(&self.name);
                warn!(
                    publisher = %self.name,
                    topic = %event.topic,
                    "Queue full, event dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(publisher = %self.name, "Publisher worker closed unexpectedly");
                false
            }
        }
    }
}

/// Worker task that consumes events and hands them to the publisher
#[instrument(
    name = "publisher_worker_loop",
    skip(publisher, rx, metrics),
    fields(publisher = %name)
)]
async fn publisher_worker<P: EventPublisher>(
    mut publisher: P,
    mut rx: mpsc::Receiver<BusEvent>,
    metrics: Arc<PublisherMetrics>,
    name: String,
) {
    debug!(publisher = %name, "Publisher worker started");

    while let Some(event) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match publisher.publish(&event).await {
            Ok(()) => {
                metrics.inc_publish_count();
                record_event_published(&name, true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                record_event_published(&name, false);
                error!(
                    publisher = %name,
                    topic = %event.topic,
                    error = %e,
                    "Publish failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = publisher.flush().await {
        error!(publisher = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = publisher.close().await {
        error!(publisher = %name, error = %e, "Close failed on shutdown");
    }

    debug!(publisher = %name, "Publisher worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ComponentError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    /// Mock publisher for testing
    struct MockPublisher {
        name: String,
        publish_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl EventPublisher for MockPublisher {
        fn name(&self) -> &str {
            &self.name
        }

        async fn publish(&mut self, _event: &BusEvent) -> Result<(), ComponentError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ComponentError::publish(&self.name, "mock failure"));
            }
            self.publish_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ComponentError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    fn event(i: u64) -> BusEvent {
        BusEvent::stream(format!("t/{i}"), json!(i))
    }

    #[tokio::test]
    async fn test_publisher_handle_basic() {
        let publish_count = Arc::new(AtomicU64::new(0));
        let publisher = MockPublisher {
            name: "test".to_string(),
            publish_count: Arc::clone(&publish_count),
            should_fail: false,
            delay_ms: 0,
        };

        let (handle, worker) = PublisherHandle::spawn(publisher, 10);

        for i in 0..5 {
            assert!(handle.try_send(event(i)));
        }

        drop(handle);
        worker.await.unwrap();
        assert_eq!(publish_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_publisher_handle_queue_full() {
        let publish_count = Arc::new(AtomicU64::new(0));
        let publisher = MockPublisher {
            name: "slow".to_string(),
            publish_count: Arc::clone(&publish_count),
            should_fail: false,
            delay_ms: 100, // Slow publisher
        };

        // Small queue capacity
        let (handle, worker) = PublisherHandle::spawn(publisher, 2);

        for i in 0..10 {
            handle.try_send(event(i));
        }

        // Some should have been dropped
        assert!(handle.metrics().dropped_count() > 0);

        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_publisher_handle_failure_isolation() {
        let publisher = MockPublisher {
            name: "failing".to_string(),
            publish_count: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let (handle, worker) = PublisherHandle::spawn(publisher, 10);

        for i in 0..3 {
            handle.try_send(event(i));
        }

        // Give worker time to process
        sleep(Duration::from_millis(50)).await;

        // Should have recorded failures, and the worker must still be alive
        assert!(handle.metrics().failure_count() > 0);
        assert!(handle.try_send(event(99)));

        drop(handle);
        worker.await.unwrap();
    }
}
