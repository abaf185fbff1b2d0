//! Config file discovery, layered loading, and environment variable overlay.

use crate::{AlmanacConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG: &str = "/etc/almanac/config.toml";
const USER_CONFIG: &str = "almanac/config.toml";
const LOCAL_CONFIG: &str = "almanac.toml";

/// Where the effective configuration came from, for `almanac config`.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Files merged, lowest precedence first.
    pub files: Vec<PathBuf>,
    /// Variables that changed a value.
    pub env_overrides: Vec<String>,
}

/// Config files to merge, lowest precedence first.
///
/// System and user files are skipped when absent. `cli_path` takes the place
/// of `./almanac.toml` and is kept even when missing, so a mistyped
/// `--config` fails loudly instead of being ignored.
pub fn discover_config_files(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let user = directories::BaseDirs::new().map(|dirs| dirs.config_dir().join(USER_CONFIG));
    let layered = [Some(PathBuf::from(SYSTEM_CONFIG)), user];

    let mut files: Vec<PathBuf> = layered.into_iter().flatten().filter(|p| p.is_file()).collect();
    match cli_path {
        Some(explicit) => files.push(explicit.to_path_buf()),
        None => files.extend(Some(PathBuf::from(LOCAL_CONFIG)).filter(|p| p.is_file())),
    }
    files
}

/// Load and merge config files in order, then apply compiled defaults for
/// anything no file set.
pub fn load_layers(files: &[PathBuf]) -> Result<AlmanacConfig, ConfigError> {
    let mut merged = toml::Table::new();

    for path in files {
        let table = load_table(path)?;
        // Reject a bad file by name rather than blaming the merged result
        table_to_config(table.clone(), path)?;
        merge_tables(&mut merged, table);
    }

    let blame = files.last().map(PathBuf::as_path).unwrap_or(Path::new("<defaults>"));
    table_to_config(merged, blame)
}

/// Read one TOML file as a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn table_to_config(table: toml::Table, path: &Path) -> Result<AlmanacConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut AlmanacConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Values that fail to parse are ignored and not recorded as overrides.
pub fn apply_overrides_from<F>(config: &mut AlmanacConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut record = |key: &str| sources.env_overrides.push(key.to_string());

    if let Some(v) = lookup("ALMANAC_HOST") {
        config.bind.host = v;
        record("ALMANAC_HOST");
    }
    if let Some(port) = lookup("ALMANAC_PORT").and_then(|v| v.parse().ok()) {
        config.bind.port = port;
        record("ALMANAC_PORT");
    }

    if let Some(v) = lookup("ALMANAC_BACKEND_URL") {
        config.backend.base_url = v;
        record("ALMANAC_BACKEND_URL");
    }

    // Zero would time out every request, so it is ignored like any bad value
    let timeout = lookup("ALMANAC_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok());
    if let Some(secs) = timeout.filter(|secs| *secs > 0) {
        config.server.request_timeout_secs = secs;
        record("ALMANAC_REQUEST_TIMEOUT_SECS");
    }

    if let Some(v) = lookup("ALMANAC_LOG_LEVEL") {
        config.telemetry.log_level = v;
        record("ALMANAC_LOG_LEVEL");
    }

    // Standard OTEL variable first so the almanac-specific one wins
    for key in ["OTEL_EXPORTER_OTLP_ENDPOINT", "ALMANAC_OTLP_ENDPOINT"] {
        if let Some(v) = lookup(key) {
            config.telemetry.otlp_endpoint = Some(v).filter(|s| !s.trim().is_empty());
            record(key);
        }
    }
}
