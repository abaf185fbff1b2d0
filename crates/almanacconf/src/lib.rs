//! Layered configuration loading for almanac.
//!
//! Sources, later ones overriding earlier ones key by key:
//!
//! - `/etc/almanac/config.toml`
//! - `$XDG_CONFIG_HOME/almanac/config.toml`
//! - `./almanac.toml`, or the file given with `--config`
//! - `ALMANAC_*` variables and `OTEL_EXPORTER_OTLP_ENDPOINT`
//!
//! Every section and key is optional:
//!
//! ```toml
//! [bind]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [backend]
//! base_url = "http://127.0.0.1:9000"
//!
//! [server]
//! request_timeout_secs = 30
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = "http://127.0.0.1:4317"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files, ConfigSources};
pub use settings::{BackendConfig, BindConfig, ServerConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot render config as TOML: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Effective configuration after all layers are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlmanacConfig {
    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AlmanacConfig {
    /// Defaults, overlaid with every discovered file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// As [`load`](Self::load), with `config_path` standing in for `./almanac.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_sources_from(config_path).map(|(config, _)| config)
    }

    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let files = loader::discover_config_files(config_path);
        let mut config = loader::load_layers(&files)?;

        let mut sources = ConfigSources {
            files,
            ..Default::default()
        };
        loader::apply_env_overrides(&mut config, &mut sources);
        Ok((config, sources))
    }

    /// Render the effective config. An unset OTLP endpoint is omitted.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlmanacConfig::default();
        assert_eq!(config.bind.port, 8080);
        assert_eq!(config.bind.host, "0.0.0.0");
        assert!(!config.backend.is_configured());
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = AlmanacConfig::default();
        config.backend.base_url = "http://kb:9000".to_string();
        config.telemetry.otlp_endpoint = Some("http://otel:4317".to_string());

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[backend]"));

        let parsed: AlmanacConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_toml_without_otlp() {
        let rendered = AlmanacConfig::default().to_toml().unwrap();
        assert!(!rendered.contains("otlp_endpoint"));
        let parsed: AlmanacConfig = toml::from_str(&rendered).unwrap();
        assert!(parsed.telemetry.otlp_endpoint.is_none());
    }
}
