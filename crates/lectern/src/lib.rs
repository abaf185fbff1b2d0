//! lectern - schema-validated tool dispatch for MCP servers
//!
//! A small MCP (Model Context Protocol) server core built on axum. Tools are
//! declared once, with a JSON-Schema-like input schema and an async handler,
//! and that single declaration drives both discovery (`tools/list`, the
//! manifest) and live argument validation.
//!
//! # Layers
//!
//! - **Schema**: declarative argument schemas; validation collects every
//!   violation in one pass and normalizes defaults
//! - **Registry**: name → definition, built at startup, read-only afterwards
//! - **Dispatcher**: lookup → validate → execute → assemble
//! - **Protocol / Transport**: JSON-RPC routing and the axum router
//!
//! # Example
//!
//! ```rust,ignore
//! use lectern::{Dispatcher, ObjectSchema, ToolDefinition, ToolRegistry, ToolResult};
//! use serde_json::json;
//!
//! let schema = ObjectSchema::from_json_schema(&json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! }))?;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(ToolDefinition::new("hello", "Say hello", schema, |args| async move {
//!     let name = args.get_str("name").unwrap_or_default().to_string();
//!     Ok(ToolResult::new(json!({ "greeted": name }), format!("Hello, {name}!")))
//! }))?;
//!
//! let state = std::sync::Arc::new(lectern::McpState::new(
//!     std::sync::Arc::new(registry),
//!     lectern::Implementation::new("my-server", "0.1.0"),
//! ));
//! let router = lectern::router(state);
//! ```

pub mod dispatcher;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod transport;
pub mod types;

// Re-export commonly used types at crate root
pub use types::content::Content;
pub use types::error::ErrorData;
pub use types::jsonrpc::{JsonRpcMessage, JsonRpcOutcome, JsonRpcResponse, RequestId};
pub use types::protocol::{Implementation, ServerCapabilities};
pub use types::tool::{CallToolResult, ListToolsResult, Tool, ToolSchema};

pub use dispatcher::{
    DispatchError, Dispatcher, ErrorKind, InvocationResponse, ToolInvocationRequest,
};
pub use handler::{ExecutionError, ToolHandler, ToolResult};
pub use registry::{RegistryError, ToolDefinition, ToolRegistry};
pub use schema::{
    FieldKind, FieldSpec, NormalizedArguments, ObjectSchema, Presence, Problem, SchemaError,
    ValidationFailure, Violation,
};

pub use protocol::McpState;
pub use transport::router;
