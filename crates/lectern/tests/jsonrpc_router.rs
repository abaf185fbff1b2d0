//! Integration tests for the JSON-RPC router
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lectern::{
    ExecutionError, Implementation, McpState, NormalizedArguments, ToolDefinition, ToolRegistry,
    ToolResult,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let mut registry = ToolRegistry::new();
    registry
        .register(
            ToolDefinition::from_declaration(
                "echo",
                "Echo the normalized arguments",
                &json!({
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "repeat": { "type": "integer", "default": 1 }
                    },
                    "required": ["message"]
                }),
                |args: NormalizedArguments| async move {
                    Ok::<_, ExecutionError>(ToolResult::structured(args.into_value()))
                },
            )
            .unwrap(),
        )
        .unwrap();

    let state = McpState::new(Arc::new(registry), Implementation::new("lectern-test", "0.0.0"));
    Router::new().nest("/mcp", lectern::router(Arc::new(state)))
}

async fn post(body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::post("/mcp")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_tools_call_round_trip() {
    let (status, body) = post(
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "echo", "arguments": { "message": "hi" } }
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["structuredContent"], json!({ "message": "hi", "repeat": 1 }));
    assert!(body["result"]["content"][0]["text"].as_str().unwrap().contains("\"hi\""));
}

#[tokio::test]
async fn test_invalid_arguments_error_envelope() {
    let (status, body) = post(
        json!({
            "jsonrpc": "2.0",
            "id": "a1",
            "method": "tools/call",
            "params": { "name": "echo", "arguments": { "repeat": 1.5 } }
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "a1");
    assert_eq!(body["error"]["code"], -32602);
    assert_eq!(body["error"]["data"]["kind"], "invalid_arguments");

    let fields: Vec<&str> = body["error"]["data"]["details"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["message", "repeat"]);
}

#[tokio::test]
async fn test_notification_is_accepted_without_body() {
    let (status, body) = post(
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let (status, body) = post("{ not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn test_invalid_envelope_keeps_request_id() {
    let (status, body) = post(json!({ "jsonrpc": "1.0", "id": 9, "method": "ping" }).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["id"], 9);
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_tools_list_matches_registry() {
    let (_, body) = post(json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }).to_string()).await;

    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "echo");
    assert_eq!(tools[0]["inputSchema"]["properties"]["repeat"]["default"], 1);
}
