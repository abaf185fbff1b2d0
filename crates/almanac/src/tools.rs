//! Tool catalogue
//!
//! Three relay tools forward their validated arguments to the backend; one
//! local tool reports on the server itself. Registration order is the order
//! clients see in `tools/list`.

use async_trait::async_trait;
use lectern::{
    ExecutionError, NormalizedArguments, RegistryError, ToolDefinition, ToolHandler, ToolRegistry,
    ToolResult,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::backend::BackendGateway;
use crate::schemas;

pub const INGEST_CONTENT: &str = "ingest_content";
pub const SEARCH_CONTENT: &str = "search_content";
pub const LOG_COMPLETION_RESULT: &str = "log_completion_result";
pub const SERVICE_INFO: &str = "service_info";

pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

type Summarize = fn(&NormalizedArguments, &Value) -> String;

/// Forwards normalized arguments to one backend path.
struct RelayHandler {
    path: &'static str,
    gateway: Arc<BackendGateway>,
    summarize: Summarize,
}

#[async_trait]
impl ToolHandler for RelayHandler {
    async fn call(&self, args: NormalizedArguments) -> Result<ToolResult, ExecutionError> {
        let payload = Value::Object(args.as_map().clone());
        let response = self.gateway.call(self.path, &payload).await?;
        let text = (self.summarize)(&args, &response);
        Ok(ToolResult::new(response, text))
    }
}

/// Reports server identity and backend status without any network I/O.
struct ServiceInfoHandler {
    tools: Vec<String>,
    backend_configured: bool,
}

#[async_trait]
impl ToolHandler for ServiceInfoHandler {
    async fn call(&self, _args: NormalizedArguments) -> Result<ToolResult, ExecutionError> {
        let text = format!(
            "{} {}: {} tools, backend {}",
            SERVER_NAME,
            SERVER_VERSION,
            self.tools.len(),
            if self.backend_configured {
                "configured"
            } else {
                "not configured"
            }
        );

        Ok(ToolResult::new(
            json!({
                "name": SERVER_NAME,
                "version": SERVER_VERSION,
                "tools": self.tools,
                "backend_configured": self.backend_configured,
            }),
            text,
        ))
    }
}

/// Build the almanac registry. Called once at startup.
pub fn build_registry(gateway: Arc<BackendGateway>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    registry.register(relay(
        INGEST_CONTENT,
        "Store a document in the knowledge base",
        schemas::ingest_content(),
        &gateway,
        summarize_ingest,
    )?)?;

    registry.register(relay(
        SEARCH_CONTENT,
        "Search stored content",
        schemas::search_content(),
        &gateway,
        summarize_search,
    )?)?;

    registry.register(relay(
        LOG_COMPLETION_RESULT,
        "Record the outcome of a learning attempt against stored content",
        schemas::log_completion_result(),
        &gateway,
        summarize_completion,
    )?)?;

    let mut tools: Vec<String> = registry.names().into_iter().map(String::from).collect();
    tools.push(SERVICE_INFO.to_string());

    registry.register(ToolDefinition::from_declaration(
        SERVICE_INFO,
        "Report server name, version, registered tools and backend status",
        &schemas::service_info(),
        ServiceInfoHandler {
            tools,
            backend_configured: gateway.is_configured(),
        },
    )?)?;

    Ok(registry)
}

fn relay(
    path: &'static str,
    description: &str,
    declaration: Value,
    gateway: &Arc<BackendGateway>,
    summarize: Summarize,
) -> Result<ToolDefinition, RegistryError> {
    ToolDefinition::from_declaration(
        path,
        description,
        &declaration,
        RelayHandler {
            path,
            gateway: Arc::clone(gateway),
            summarize,
        },
    )
}

fn summarize_ingest(_args: &NormalizedArguments, response: &Value) -> String {
    match response.get("id") {
        Some(Value::String(id)) => format!("Ingested content (id: {})", id),
        Some(Value::Number(id)) => format!("Ingested content (id: {})", id),
        _ => "Content ingested".to_string(),
    }
}

fn summarize_search(args: &NormalizedArguments, response: &Value) -> String {
    let query = args.get_str("query").unwrap_or_default();
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .or_else(|| response.as_array());

    match results {
        Some(results) => format!("Found {} result(s) for \"{}\"", results.len(), query),
        None => format!("Search for \"{}\" completed", query),
    }
}

fn summarize_completion(args: &NormalizedArguments, _response: &Value) -> String {
    format!(
        "Logged {} for {}",
        args.get_str("outcome").unwrap_or_default(),
        args.get_str("content_id").unwrap_or_default()
    )
}
