//! MemoryPublisher - captures events in memory
//!
//! Used by tests and embedders that want to inspect exactly what the
//! component emitted, without a real bus.

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{BusEvent, ComponentError, EventPublisher};

/// Publisher that records every event it receives
pub struct MemoryPublisher {
    name: String,
    events: CapturedEvents,
}

impl MemoryPublisher {
    /// Create a new MemoryPublisher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: CapturedEvents::default(),
        }
    }

    /// Handle to the captured events; keep a clone before the publisher
    /// moves into its worker task
    pub fn events(&self) -> CapturedEvents {
        self.events.clone()
    }
}

impl EventPublisher for MemoryPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, event: &BusEvent) -> Result<(), ComponentError> {
        self.events.push(event.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// Shared view of the events a [`MemoryPublisher`] captured
#[derive(Debug, Clone, Default)]
pub struct CapturedEvents {
    inner: Arc<Mutex<Vec<BusEvent>>>,
}

impl CapturedEvents {
    fn push(&self, event: BusEvent) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Number of captured events
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone out all captured events in arrival order
    pub fn snapshot(&self) -> Vec<BusEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All events published on one topic, in arrival order
    pub fn on_topic(&self, topic: &str) -> Vec<BusEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.topic == topic)
            .cloned()
            .collect()
    }

    /// The most recent event on one topic
    pub fn last_on_topic(&self, topic: &str) -> Option<BusEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|event| event.topic == topic)
            .cloned()
    }
}
