//! Invocation dispatch
//!
//! One invocation moves through lookup, validation, execution and assembly,
//! stopping at the first state that fails. Every invocation ends in exactly one
//! success or exactly one classified [`DispatchError`].

use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use crate::handler::{ExecutionError, ToolResult};
use crate::registry::ToolRegistry;
use crate::schema::ValidationFailure;
use crate::types::jsonrpc::RequestId;
use crate::types::{Content, ErrorData};

/// One tool call as received from a caller.
#[derive(Debug, Clone)]
pub struct ToolInvocationRequest {
    pub tool_name: String,
    pub raw_arguments: Value,
    pub request_id: RequestId,
}

impl ToolInvocationRequest {
    pub fn new(
        request_id: impl Into<RequestId>,
        tool_name: impl Into<String>,
        raw_arguments: Value,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            raw_arguments,
            request_id: request_id.into(),
        }
    }
}

/// Error classification visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    ExecutionFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::ExecutionFailure => "execution_failure",
        }
    }

    pub fn json_rpc_code(&self) -> i32 {
        match self {
            ErrorKind::UnknownTool => ErrorData::METHOD_NOT_FOUND,
            ErrorKind::InvalidArguments => ErrorData::INVALID_PARAMS,
            ErrorKind::ExecutionFailure => ErrorData::INTERNAL_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl DispatchError {
    pub fn unknown_tool(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownTool,
            message: format!("Unknown tool: {}", name),
            details: Some(json!({ "tool": name })),
        }
    }

    fn panicked(tool: &str, panic: &str) -> Self {
        Self {
            kind: ErrorKind::ExecutionFailure,
            message: format!("Tool '{}' panicked: {}", tool, panic),
            details: Some(json!({ "reason": "panic" })),
        }
    }
}

impl From<ValidationFailure> for DispatchError {
    fn from(failure: ValidationFailure) -> Self {
        Self {
            kind: ErrorKind::InvalidArguments,
            message: failure.to_string(),
            details: Some(json!({ "violations": failure.violations })),
        }
    }
}

impl From<ExecutionError> for DispatchError {
    fn from(err: ExecutionError) -> Self {
        let mut details = json!({ "reason": err.reason });
        if let Some(inner) = err.details {
            details["details"] = inner;
        }
        Self {
            kind: ErrorKind::ExecutionFailure,
            message: err.message,
            details: Some(details),
        }
    }
}

impl From<DispatchError> for ErrorData {
    fn from(err: DispatchError) -> Self {
        let mut data = json!({ "kind": err.kind });
        if let Some(details) = err.details {
            data["details"] = details;
        }
        ErrorData::with_data(err.kind.json_rpc_code(), err.message, data)
    }
}

/// Outcome envelope of a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResponse {
    Success {
        #[serde(rename = "requestId")]
        request_id: RequestId,
        #[serde(rename = "structuredContent")]
        structured_content: Value,
        content: Vec<Content>,
    },
    Failure {
        #[serde(rename = "requestId")]
        request_id: RequestId,
        error: DispatchError,
    },
}

impl InvocationResponse {
    fn from_result(request_id: RequestId, result: Result<ToolResult, DispatchError>) -> Self {
        match result {
            Ok(result) => InvocationResponse::Success {
                request_id,
                structured_content: result.structured_content,
                content: result.content,
            },
            Err(error) => InvocationResponse::Failure { request_id, error },
        }
    }

    pub fn request_id(&self) -> &RequestId {
        match self {
            InvocationResponse::Success { request_id, .. }
            | InvocationResponse::Failure { request_id, .. } => request_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResponse::Success { .. })
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            InvocationResponse::Failure { error, .. } => Some(error),
            InvocationResponse::Success { .. } => None,
        }
    }
}

/// Routes invocations through the registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn dispatch(&self, request: ToolInvocationRequest) -> InvocationResponse {
        let result = self.invoke(&request.tool_name, &request.raw_arguments).await;
        InvocationResponse::from_result(request.request_id, result)
    }

    /// Run one tool call to completion.
    ///
    /// Handlers are only reached with validated arguments. A handler that
    /// panics is reported as an execution failure; the dispatcher keeps serving.
    pub async fn invoke(&self, tool_name: &str, raw_arguments: &Value) -> Result<ToolResult, DispatchError> {
        let span = tracing::info_span!(
            "mcp.tool.call",
            mcp.tool.name = %tool_name,
            error.type = tracing::field::Empty,
        );

        async {
            let result = self.invoke_inner(tool_name, raw_arguments).await;

            if let Err(ref err) = result {
                tracing::Span::current().record("error.type", err.kind.as_str());
                tracing::warn!(kind = err.kind.as_str(), error = %err, "tool call failed");
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn invoke_inner(&self, tool_name: &str, raw_arguments: &Value) -> Result<ToolResult, DispatchError> {
        let definition = self
            .registry
            .lookup(tool_name)
            .ok_or_else(|| DispatchError::unknown_tool(tool_name))?;

        let args = definition.input_schema.validate(raw_arguments)?;

        let outcome = AssertUnwindSafe(definition.handler.call(args))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => Ok(assemble(result)),
            Ok(Err(err)) => Err(err.into()),
            Err(panic) => Err(DispatchError::panicked(tool_name, &panic_message(panic.as_ref()))),
        }
    }
}

/// Guarantee at least one text block.
fn assemble(mut result: ToolResult) -> ToolResult {
    if result.content.is_empty() {
        let text = serde_json::to_string_pretty(&result.structured_content)
            .unwrap_or_else(|_| result.structured_content.to_string());
        result.content.push(Content::text(text));
    }
    result
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
