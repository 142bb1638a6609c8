//! BusEvent - the unit handed to event publishers

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::ComponentError;

/// Event emission callback
///
/// Core tasks hand finished `BusEvent`s to this callback; whatever sits
/// behind it (the dispatcher's fan-out queues, a test collector) must not
/// block the caller. Uses `Arc` so the callback is shared across tasks.
pub type EventSink = Arc<dyn Fn(BusEvent) + Send + Sync>;

/// A single event destined for the host bus
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Destination topic
    pub topic: String,

    /// JSON payload
    pub payload: Value,

    /// Retained delivery: the bus replays the last value to late subscribers
    pub retain: bool,
}

impl BusEvent {
    /// Create a streaming (non-retained) event
    pub fn stream(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            retain: false,
        }
    }

    /// Create a retained event
    pub fn retained(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            retain: true,
        }
    }

    /// Serialize a payload value into an event
    ///
    /// # Errors
    /// Returns `ComponentError::Publish` when the payload cannot be
    /// serialized to JSON.
    pub fn serialize<T: Serialize>(
        topic: &str,
        value: &T,
        retain: bool,
    ) -> Result<Self, ComponentError> {
        let payload = serde_json::to_value(value)
            .map_err(|e| ComponentError::publish(topic, format!("payload serialize: {e}")))?;
        Ok(Self {
            topic: topic.to_string(),
            payload,
            retain,
        })
    }
}
