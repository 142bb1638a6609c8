//! Layered error definitions
//!
//! Categorized by source: config / sampling / publish / command

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ComponentError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sampling Errors =====
    /// Sampler failed to produce a reading
    #[error("sampling error for metric '{metric}': {message}")]
    Sampling { metric: String, message: String },

    /// Metric is not known to the sampler
    #[error("unknown metric: {metric}")]
    UnknownMetric { metric: String },

    // ===== Publish Errors =====
    /// Publisher rejected or failed an event
    #[error("publish error on topic '{topic}': {message}")]
    Publish { topic: String, message: String },

    // ===== Command Errors =====
    /// Dispatcher received an unrecognized action
    #[error("unknown command action: {action}")]
    UnknownCommand { action: String },

    /// Command payload did not match the expected shape
    #[error("command payload error: {message}")]
    CommandPayload { message: String },

    // ===== General Errors =====
    /// Internal channel closed before the component shut down
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ComponentError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sampling error
    pub fn sampling(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sampling {
            metric: metric.into(),
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create command payload error
    pub fn command_payload(message: impl Into<String>) -> Self {
        Self::CommandPayload {
            message: message.into(),
        }
    }
}
