use std::env;
use std::path::{Path, PathBuf};

use super::model::CheckConfig;
use crate::error::ConfigError;

pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "oxycheck.yml";

pub const CONCURRENCY_ENV: &str = "OXYCHECK_CONCURRENCY";
pub const TIMEOUT_MS_ENV: &str = "OXYCHECK_TIMEOUT_MS";
pub const USER_AGENT_ENV: &str = "OXYCHECK_USER_AGENT";

/// Load the configuration from an optional YAML file and the environment.
///
/// The file is taken from `explicit`, then from the `CONFIG_FILE` environment
/// variable. A file named that way must exist. Without either, `oxycheck.yml`
/// in the working directory is used when present, and the built-in defaults
/// otherwise. Environment variables are applied on top of the file.
pub fn load_config(explicit: Option<&Path>) -> Result<CheckConfig, ConfigError> {
    load_config_with(explicit, Path::new(DEFAULT_CONFIG_FILE), |key| env::var(key).ok())
}

/// `load_config` with the fallback file and the environment supplied by the
/// caller.
pub fn load_config_with<F>(
    explicit: Option<&Path>,
    fallback: &Path,
    lookup: F,
) -> Result<CheckConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| lookup(CONFIG_FILE_ENV).map(PathBuf::from));

    let mut config = match named {
        Some(path) => read_config_file(&path)?,
        None if fallback.exists() => read_config_file(fallback)?,
        None => CheckConfig::default(),
    };

    apply_env(&mut config, &lookup)?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<CheckConfig, ConfigError> {
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: CheckConfig =
        serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Override `config` with the `OXYCHECK_*` variables returned by `lookup`.
pub fn apply_env<F>(config: &mut CheckConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(CONCURRENCY_ENV) {
        config.concurrency = parse_env(CONCURRENCY_ENV, &value)?;
    }
    if let Some(value) = lookup(TIMEOUT_MS_ENV) {
        config.timeout_ms = parse_env(TIMEOUT_MS_ENV, &value)?;
    }
    if let Some(value) = lookup(USER_AGENT_ENV) {
        config.user_agent = value;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
