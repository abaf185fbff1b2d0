//! Method routing for the MCP endpoint.
//!
//! Each message runs inside an `mcp.dispatch` span carrying the OTEL JSON-RPC
//! attributes (https://opentelemetry.io/docs/specs/semconv/rpc/json-rpc/).

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{field, Instrument};

use crate::dispatcher::Dispatcher;
use crate::registry::ToolRegistry;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::JsonRpcMessage;
use crate::types::protocol::{Implementation, InitializeParams, InitializeResult, ServerCapabilities};
use crate::types::tool::{CallToolParams, CallToolResult, ListToolsResult};

/// Shared state behind the MCP router.
#[derive(Debug, Clone)]
pub struct McpState {
    pub dispatcher: Dispatcher,
    pub server_info: Implementation,
    pub instructions: Option<String>,
}

impl McpState {
    pub fn new(registry: Arc<ToolRegistry>, server_info: Implementation) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            server_info,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Route one message and return the value for the reply's `result` member.
pub async fn dispatch(state: &McpState, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let span = tracing::info_span!(
        "mcp.dispatch",
        rpc.system = "jsonrpc",
        rpc.method = %message.method,
        rpc.jsonrpc.version = "2.0",
        rpc.jsonrpc.request_id = field::Empty,
        error.type = field::Empty,
        rpc.jsonrpc.error_code = field::Empty,
        rpc.jsonrpc.error_message = field::Empty,
    );
    if let Some(id) = &message.id {
        span.record("rpc.jsonrpc.request_id", field::display(id));
    }

    let outcome = route(state, message).instrument(span.clone()).await;
    if let Err(error) = &outcome {
        span.record("error.type", error_type(error.code));
        span.record("rpc.jsonrpc.error_code", error.code);
        span.record("rpc.jsonrpc.error_message", error.message.as_str());
    }
    outcome
}

fn error_type(code: i32) -> &'static str {
    match code {
        ErrorData::PARSE_ERROR => "parse_error",
        ErrorData::INVALID_REQUEST => "invalid_request",
        ErrorData::METHOD_NOT_FOUND => "method_not_found",
        ErrorData::INVALID_PARAMS => "invalid_params",
        ErrorData::INTERNAL_ERROR => "internal_error",
        _ => "other",
    }
}

async fn route(state: &McpState, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    match message.method.as_str() {
        "initialize" => handle_initialize(state, message),
        // The HTTP transport acknowledges notifications without routing them;
        // this arm serves direct callers of `dispatch`.
        "notifications/initialized" => Ok(Value::Null),
        "ping" => Ok(json!({})),
        "tools/list" => handle_list_tools(state),
        "tools/call" => handle_call_tool(state, message).await,
        other => Err(ErrorData::method_not_found(other)),
    }
}

fn handle_initialize(state: &McpState, request: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: InitializeParams = parse_params(request, "initialize")?;

    tracing::info!(
        client = %params.client_info.name,
        client_version = %params.client_info.version,
        protocol_version = %params.protocol_version,
        "client initialized"
    );

    let result = InitializeResult::new(state.server_info.clone(), ServerCapabilities::with_tools());
    let result = match &state.instructions {
        Some(instructions) => result.with_instructions(instructions.clone()),
        None => result,
    };

    to_result_value(&result)
}

fn handle_list_tools(state: &McpState) -> Result<Value, ErrorData> {
    let result = ListToolsResult::all(state.dispatcher.registry().manifest());
    to_result_value(&result)
}

async fn handle_call_tool(state: &McpState, request: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: CallToolParams = parse_params(request, "call")?;

    let arguments = params.arguments.unwrap_or_else(|| Value::Object(Map::new()));

    let result = state.dispatcher.invoke(&params.name, &arguments).await?;

    to_result_value(&CallToolResult {
        content: result.content,
        structured_content: Some(result.structured_content),
    })
}

fn parse_params<T: serde::de::DeserializeOwned>(message: &JsonRpcMessage, what: &str) -> Result<T, ErrorData> {
    let Some(params) = message.params.clone() else {
        return Err(ErrorData::invalid_params(format!("Missing {} params", what)));
    };
    serde_json::from_value(params).map_err(|e| ErrorData::invalid_params(format!("Invalid {} params: {}", what, e)))
}

fn to_result_value<T: serde::Serialize>(result: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(result).map_err(|e| ErrorData::internal_error(format!("Unserializable result: {}", e)))
}
