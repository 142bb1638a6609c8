//! ComponentBlueprint - Config Loader output
//!
//! Describes a complete fixture deployment: identity, initial cfg, log
//! batching limits, and event publisher routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ComponentConfig, LogBatchSettings};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete component deployment blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Component identity and topic root
    pub component: ComponentIdentity,

    /// Initial host-mutable configuration (retained as `cfg`)
    #[serde(default = "ComponentConfig::fixture_cpu")]
    pub cfg: ComponentConfig,

    /// Log batching limits
    #[serde(default)]
    pub logs: LogBatchSettings,

    /// Event publisher routing
    #[serde(default)]
    pub publishers: Vec<PublisherConfig>,
}

/// Component identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentIdentity {
    /// Unique component id (e.g., "fixture_cpu")
    pub id: String,

    /// Topic root the component's topics are nested under
    #[serde(default = "default_base_topic")]
    pub base_topic: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

fn default_base_topic() -> String {
    "procsim/agents/local".to_string()
}

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Unique publisher name (used for logging/metrics)
    pub name: String,

    /// Publisher kind
    pub publisher_type: PublisherType,

    /// Worker queue capacity (events dropped with a warning beyond this)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Kind-specific parameters (e.g., `path` for file publishers)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Publisher kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherType {
    /// Log event summaries via tracing
    Log,
    /// Append events as JSON lines to a file
    File,
}
