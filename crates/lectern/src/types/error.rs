//! JSON-RPC error object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The `error` member of a JSON-RPC response.
///
/// Tool failures carry `data = {kind, details?}` so clients can branch on the
/// classification without parsing `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct ErrorData {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorData {
    /// Body was not JSON, or not a JSON-RPC envelope.
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    /// Unknown method, or unknown tool on `tools/call`.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Malformed params, or tool arguments that failed validation.
    pub const INVALID_PARAMS: i32 = -32602;
    /// The tool ran and failed.
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::new(code, message)
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(Self::PARSE_ERROR, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }
}
