//! Dispatcher error definitions

use thiserror::Error;

/// Errors raised while building the publisher fan-out
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Publisher could not be created from its configuration
    #[error("failed to create publisher '{name}': {message}")]
    PublisherCreation { name: String, message: String },
}

impl DispatcherError {
    /// Create publisher creation error
    pub fn publisher_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublisherCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
