//! HTTP server
//!
//! Uses lectern for MCP protocol handling; tool calls are relayed to the
//! knowledge-base backend.

use almanacconf::AlmanacConfig;
use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use lectern::{Implementation, ListToolsResult, McpState, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::BackendGateway;
use crate::tools::{self, SERVER_NAME, SERVER_VERSION};

const INSTRUCTIONS: &str = "Knowledge-base tools. Use search_content before ingesting \
duplicates, and log_completion_result after each learning attempt.";

/// Shared state for the non-MCP routes.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub backend_configured: bool,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>, backend_configured: bool) -> Self {
        Self {
            registry,
            backend_configured,
            start_time: Instant::now(),
        }
    }
}

/// Liveness plus enough state to spot a missing backend URL.
#[tracing::instrument(skip(state))]
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": SERVER_VERSION,
        "backend_configured": state.backend_configured,
        "tools": state.registry.len(),
    }))
}

/// Tool manifest, generated from the live registry.
#[tracing::instrument(skip(state))]
pub async fn handle_manifest(State(state): State<AppState>) -> Json<ListToolsResult> {
    Json(ListToolsResult::all(state.registry.manifest()))
}

pub async fn handle_root() -> Json<Value> {
    Json(json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "endpoints": {
            "mcp": "POST /mcp",
            "manifest": "GET /manifest",
            "health": "GET /health",
        }
    }))
}

/// Assemble the full application router.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let mcp_state = McpState::new(
        Arc::clone(&state.registry),
        Implementation::new(SERVER_NAME, SERVER_VERSION),
    )
    .with_instructions(INSTRUCTIONS);

    let routes = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/manifest", get(handle_manifest))
        .with_state(state);

    Router::new()
        .nest("/mcp", lectern::router(Arc::new(mcp_state)))
        .merge(routes)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server until SIGINT/SIGTERM.
pub async fn run(config: AlmanacConfig) -> Result<()> {
    info!("📚 almanac {} starting", SERVER_VERSION);

    let gateway = Arc::new(BackendGateway::new(&config.backend.base_url));
    match gateway.base_url() {
        Some(url) => info!("   Backend: {}", url),
        None => tracing::warn!("   ⚠️  No backend configured, relay tools will fail until ALMANAC_BACKEND_URL is set"),
    }

    let registry = Arc::new(tools::build_registry(Arc::clone(&gateway)).context("Failed to build tool registry")?);
    info!("   Tools: {}", registry.names().join(", "));

    let state = AppState::new(registry, gateway.is_configured());
    let app = build_app(state, Duration::from_secs(config.server.request_timeout_secs));

    let addr = config.bind.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("📚 almanac listening on http://{} (MCP at /mcp)", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_stop())
        .await
        .context("HTTP server failed")?;

    info!("almanac stopped");
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM. In-flight requests then drain.
async fn wait_for_stop() {
    let signal = tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate() => "SIGTERM",
    };
    info!(signal, "stopping, draining in-flight requests");
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, only SIGINT will stop the server");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
