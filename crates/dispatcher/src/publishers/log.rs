//! LogPublisher - logs event summaries via tracing

use contracts::{BusEvent, ComponentError, EventPublisher};
use tracing::{info, instrument};

/// Publisher that logs event summaries for debugging
pub struct LogPublisher {
    name: String,
}

impl LogPublisher {
    /// Create a new LogPublisher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl EventPublisher for LogPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_publisher_publish",
        skip(self, event),
        fields(publisher = %self.name, topic = %event.topic)
    )]
    async fn publish(&mut self, event: &BusEvent) -> Result<(), ComponentError> {
        info!(
            publisher = %self.name,
            topic = %event.topic,
            retain = event.retain,
            payload = %event.payload,
            "Event published"
        );
        Ok(())
    }

    #[instrument(name = "log_publisher_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ComponentError> {
        // Nothing to flush for log publisher
        Ok(())
    }

    #[instrument(name = "log_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ComponentError> {
        info!(publisher = %self.name, "LogPublisher closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_log_publisher_publish() {
        let mut publisher = LogPublisher::new("test_log");
        let event = BusEvent::stream("t/telemetry/cpu_percent", json!({"value": 1.0}));

        let result = publisher.publish(&event).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_publisher_name() {
        let publisher = LogPublisher::new("my_logger");
        assert_eq!(publisher.name(), "my_logger");
    }
}
