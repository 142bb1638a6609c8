//! Topic scheme for the unified host contract.
//!
//! Retained: `metadata`, `status`, `state`, `cfg`.
//! Streams: `telemetry/<metric>`, `logs`.
//! Commands: `cmd/<action>` in, `evt/<action>/result` out.

use std::sync::Arc;

/// Topic builder rooted at one component's topic root.
///
/// Cheap to clone; every worker task holds one.
#[derive(Debug, Clone)]
pub struct TopicScheme {
    base: Arc<str>,
}

impl TopicScheme {
    /// Create a scheme rooted at `base` (trailing slashes trimmed)
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: Arc::from(base.as_ref().trim_end_matches('/')),
        }
    }

    /// Create a scheme for a component nested under an agent topic root
    pub fn for_component(base_topic: &str, component_id: &str) -> Self {
        Self::new(format!(
            "{}/{}",
            base_topic.trim_end_matches('/'),
            component_id
        ))
    }

    /// The topic root
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Retained metadata topic
    pub fn metadata(&self) -> String {
        format!("{}/metadata", self.base)
    }

    /// Retained status topic
    pub fn status(&self) -> String {
        format!("{}/status", self.base)
    }

    /// Retained state snapshot topic
    pub fn state(&self) -> String {
        format!("{}/state", self.base)
    }

    /// Retained configuration topic
    pub fn cfg(&self) -> String {
        format!("{}/cfg", self.base)
    }

    /// Telemetry stream topic for one metric
    pub fn telemetry(&self, metric: &str) -> String {
        format!("{}/telemetry/{}", self.base, metric)
    }

    /// Log batch stream topic
    pub fn logs(&self) -> String {
        format!("{}/logs", self.base)
    }

    /// Command input topic for one action
    pub fn command(&self, action: &str) -> String {
        format!("{}/cmd/{}", self.base, action)
    }

    /// Command result topic for one action
    pub fn command_result(&self, action: &str) -> String {
        format!("{}/evt/{}/result", self.base, action)
    }
}
