//! CLI command implementations

use almanacconf::AlmanacConfig;
use anyhow::{bail, Context, Result};
use lectern::{Dispatcher, ListToolsResult, ToolInvocationRequest};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::backend::BackendGateway;
use crate::tools;

/// Print the tool manifest. Needs no backend.
pub fn manifest(pretty: bool) -> Result<()> {
    let registry = tools::build_registry(Arc::new(BackendGateway::unconfigured()))
        .context("Failed to build tool registry")?;

    let listing = ListToolsResult::all(registry.manifest());
    let output = if pretty {
        serde_json::to_string_pretty(&listing)?
    } else {
        serde_json::to_string(&listing)?
    };
    println!("{}", output);
    Ok(())
}

/// Dispatch a single tool call locally and print the response envelope.
pub async fn call(tool: &str, args: Option<&str>, backend_url: &str) -> Result<()> {
    let raw_arguments: Value = match args {
        Some(json) => serde_json::from_str(json).context("Failed to parse arguments as JSON")?,
        None => Value::Object(Default::default()),
    };

    let registry = tools::build_registry(Arc::new(BackendGateway::new(backend_url)))
        .context("Failed to build tool registry")?;
    let dispatcher = Dispatcher::new(Arc::new(registry));

    let request_id = uuid::Uuid::new_v4().to_string();
    let response = dispatcher
        .dispatch(ToolInvocationRequest::new(request_id, tool, raw_arguments))
        .await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(error) = response.error() {
        bail!("{} failed ({}): {}", tool, error.kind.as_str(), error.message);
    }
    Ok(())
}

/// Print the effective configuration and where it came from.
pub fn show_config(config_path: Option<&Path>) -> Result<()> {
    let (config, sources) =
        AlmanacConfig::load_with_sources_from(config_path).context("Failed to load configuration")?;

    print!("{}", config.to_toml().context("Failed to render configuration")?);

    println!();
    if sources.files.is_empty() {
        println!("# No config files found, using defaults");
    } else {
        println!("# Loaded from:");
        for file in &sources.files {
            println!("#   {}", file.display());
        }
    }
    if !sources.env_overrides.is_empty() {
        println!("# Environment overrides: {}", sources.env_overrides.join(", "));
    }
    Ok(())
}
