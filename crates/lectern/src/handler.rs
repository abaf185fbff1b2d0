//! Tool handlers
//!
//! A handler receives arguments that already passed schema validation and
//! produces a [`ToolResult`] or an [`ExecutionError`].

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use crate::schema::NormalizedArguments;
use crate::types::Content;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: NormalizedArguments) -> Result<ToolResult, ExecutionError>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(NormalizedArguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolResult, ExecutionError>> + Send,
{
    async fn call(&self, args: NormalizedArguments) -> Result<ToolResult, ExecutionError> {
        (self)(args).await
    }
}

/// Successful handler output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Machine-readable result, typically the upstream response body.
    pub structured_content: Value,

    /// Human-readable summary blocks. May be empty; the dispatcher fills it in.
    pub content: Vec<Content>,
}

impl ToolResult {
    pub fn new(structured_content: Value, text: impl Into<String>) -> Self {
        Self {
            structured_content,
            content: vec![Content::text(text)],
        }
    }

    /// Structured output only. The dispatcher renders a text block from it.
    pub fn structured(structured_content: Value) -> Self {
        Self {
            structured_content,
            content: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(Content::text(text));
        self
    }
}

/// Handler failure.
///
/// `reason` is a stable snake_case tag (e.g. `backend_unreachable`) callers can
/// match on; `message` is for humans.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub reason: String,
    pub message: String,
    pub details: Option<Value>,
}

impl ExecutionError {
    pub fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
