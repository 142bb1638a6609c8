//! Retained component descriptors: metadata and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MetricId;

/// Static component descriptor (retained as `metadata`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// Component id, also the last segment of the topic root
    pub component_id: String,

    /// Human-readable description
    pub description: String,

    /// Implementation version
    pub version: String,

    /// Supported command actions
    pub capabilities: Vec<String>,

    /// Metrics this component tracks
    pub metrics: Vec<MetricId>,
}

/// Component lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Stopped,
    Error,
}

/// Liveness descriptor (retained as `status`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Current lifecycle state
    pub state: RunState,

    /// When this state was entered
    pub since: DateTime<Utc>,

    /// Error description when `state == Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentStatus {
    /// Status entering the running state now
    pub fn running() -> Self {
        Self {
            state: RunState::Running,
            since: Utc::now(),
            detail: None,
        }
    }

    /// Status entering the stopped state now
    pub fn stopped() -> Self {
        Self {
            state: RunState::Stopped,
            since: Utc::now(),
            detail: None,
        }
    }

    /// Status entering the error state now
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            state: RunState::Error,
            since: Utc::now(),
            detail: Some(detail.into()),
        }
    }
}
