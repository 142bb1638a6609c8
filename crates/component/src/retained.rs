//! Retained state snapshots published to the host.
//!
//! The host may poll or subscribe to these at any time, independent of the
//! streaming topics; every publish here carries the retain flag.

use std::collections::BTreeMap;

use contracts::{
    BusEvent, ComponentConfig, ComponentMetadata, ComponentStatus, EventSink, MetricState,
    TopicScheme,
};
use serde::Serialize;
use tracing::error;

/// Publishes the retained descriptors: metadata, status, state, cfg
#[derive(Clone)]
pub struct RetainedPublisher {
    events: EventSink,
    topics: TopicScheme,
}

impl RetainedPublisher {
    /// Create a retained publisher over an event sink
    pub fn new(events: EventSink, topics: TopicScheme) -> Self {
        Self { events, topics }
    }

    /// Publish the static component descriptor
    pub fn publish_metadata(&self, metadata: &ComponentMetadata) {
        self.publish(self.topics.metadata(), metadata);
    }

    /// Publish the liveness descriptor
    pub fn publish_status(&self, status: &ComponentStatus) {
        self.publish(self.topics.status(), status);
    }

    /// Publish the per-metric state snapshot
    pub fn publish_state(&self, state: &BTreeMap<String, MetricState>) {
        self.publish(self.topics.state(), state);
    }

    /// Publish the current configuration
    pub fn publish_cfg(&self, config: &ComponentConfig) {
        self.publish(self.topics.cfg(), config);
    }

    fn publish<T: Serialize>(&self, topic: String, value: &T) {
        match BusEvent::serialize(&topic, value, true) {
            Ok(event) => (self.events)(event),
            Err(e) => error!(topic = %topic, error = %e, "Retained snapshot serialize failed"),
        }
    }
}
