//! HTTP Transport
//!
//! A single JSON-RPC endpoint:
//! - POST / - send a JSON-RPC request and receive the response as JSON
//! - notifications are acknowledged with 202 and no body
//!
//! The router is meant to be nested under a path such as `/mcp`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::protocol::McpState;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcResponse, RequestId};

/// Build the MCP router.
pub fn router(state: Arc<McpState>) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .with_state(state)
}

#[tracing::instrument(skip(state, body))]
async fn rpc_handler(State(state): State<Arc<McpState>>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return parse_error(None, format!("Invalid JSON: {}", e));
        }
    };

    // Salvage the id, if any, so the error can be correlated
    let request_id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    let message: JsonRpcMessage = match serde_json::from_value(value) {
        Ok(m) => m,
        Err(e) => {
            return parse_error(request_id, format!("Invalid JSON-RPC: {}", e));
        }
    };

    let Some(request_id) = message.id.clone() else {
        tracing::debug!(method = %message.method, "notification received");
        return StatusCode::ACCEPTED.into_response();
    };

    tracing::info!(
        method = %message.method,
        request_id = %request_id,
        "processing MCP request"
    );

    let reply = match crate::protocol::dispatch(&state, &message).await {
        Ok(result) => JsonRpcResponse::success(request_id, result),
        Err(error) => JsonRpcResponse::failure(Some(request_id), error),
    };
    Json(reply).into_response()
}

fn parse_error(id: Option<RequestId>, message: String) -> Response {
    let body = JsonRpcResponse::failure(id, ErrorData::parse_error(message));
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
