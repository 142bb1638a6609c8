//! Command request/result payloads for the host command surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming command from the host.
///
/// Arrives on `cmd/<action>`; the body carries an optional `request_id`
/// echoed back in the result, and an action-specific payload (for `cfg/set`
/// the patch lives under `payload.set`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Action name: `reset`, `ping`, `cfg/set`
    pub action: String,

    /// Correlation id supplied by the host; empty when absent
    #[serde(default)]
    pub request_id: String,

    /// Action-specific body
    #[serde(default)]
    pub payload: Value,
}

impl CommandRequest {
    /// Create a request with no payload
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            request_id: String::new(),
            payload: Value::Null,
        }
    }

    /// Create a request with a payload body
    pub fn with_payload(action: impl Into<String>, payload: Value) -> Self {
        Self {
            action: action.into(),
            request_id: String::new(),
            payload,
        }
    }
}

/// Outcome of one command, published once on `evt/<action>/result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Action the result belongs to
    pub action: String,

    /// Correlation id echoed from the request
    pub request_id: String,

    /// Whether the command was accepted and applied
    pub success: bool,

    /// Applied changes on success, error description on failure
    #[serde(default)]
    pub detail: Value,
}

impl CommandResult {
    /// Successful result
    pub fn ok(request: &CommandRequest, detail: Value) -> Self {
        Self {
            action: request.action.clone(),
            request_id: request.request_id.clone(),
            success: true,
            detail,
        }
    }

    /// Failed result with an error description
    pub fn failed(request: &CommandRequest, error: impl Into<String>) -> Self {
        Self {
            action: request.action.clone(),
            request_id: request.request_id.clone(),
            success: false,
            detail: Value::String(error.into()),
        }
    }
}
