//! almanac - MCP tool server for a knowledge-base backend
//!
//! Subcommands:
//! - `almanac serve` - Run the MCP server
//! - `almanac manifest` - Print the tool manifest
//! - `almanac call <tool> [json]` - Dispatch one tool call locally
//! - `almanac config` - Show the effective configuration

use almanac::{commands, serve, telemetry};
use almanacconf::AlmanacConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "MCP tool server for a knowledge-base backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server
    Serve {
        /// Config file (replaces ./almanac.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HTTP port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Backend base URL (e.g., http://127.0.0.1:9000)
        #[arg(long)]
        backend_url: Option<String>,

        /// OTLP gRPC endpoint for OpenTelemetry (e.g., "localhost:4317")
        #[arg(long)]
        otlp_endpoint: Option<String>,
    },

    /// Print the tool manifest as JSON
    Manifest {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Dispatch a single tool call and print the response envelope
    Call {
        /// Tool name
        tool: String,

        /// JSON arguments object (default: {})
        args: Option<String>,

        /// Config file (replaces ./almanac.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend base URL, overriding the configured one
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Show the effective configuration and its sources
    Config {
        /// Config file (replaces ./almanac.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            backend_url,
            otlp_endpoint,
        } => {
            let mut config =
                AlmanacConfig::load_from(config.as_deref()).context("Failed to load configuration")?;
            if let Some(port) = port {
                config.bind.port = port;
            }
            if let Some(url) = backend_url {
                config.backend.base_url = url;
            }
            if otlp_endpoint.is_some() {
                config.telemetry.otlp_endpoint = otlp_endpoint;
            }

            telemetry::init(
                &config.telemetry.log_level,
                config.telemetry.otlp_endpoint.as_deref(),
            )?;

            let result = serve::run(config).await;
            telemetry::shutdown();
            result?;
        }
        Commands::Manifest { pretty } => {
            telemetry::init_cli("warn")?;
            commands::manifest(pretty)?;
        }
        Commands::Call {
            tool,
            args,
            config,
            backend_url,
        } => {
            let config =
                AlmanacConfig::load_from(config.as_deref()).context("Failed to load configuration")?;
            telemetry::init_cli(&config.telemetry.log_level)?;

            let backend_url = backend_url.unwrap_or(config.backend.base_url);
            commands::call(&tool, args.as_deref(), &backend_url).await?;
        }
        Commands::Config { config } => {
            commands::show_config(config.as_deref())?;
        }
    }

    Ok(())
}
