// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable that points at a config file when `--config` is not
/// given.
pub const CONFIG_ENV_VAR: &str = "TART_EXECUTOR_CONFIG";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it and expand `~` in its
/// paths.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for this invocation.
///
/// - An explicit path (`--config`, then `TART_EXECUTOR_CONFIG`) must exist.
/// - Otherwise [`default_config_path`] is used if present, and built-in
///   defaults if not.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return load_and_validate(path);
    }

    let default = default_config_path();
    if default.is_file() {
        debug!(path = %default.display(), "loading default config");
        return load_and_validate(default);
    }

    debug!("no config file; using built-in defaults");
    ConfigFile::try_from(RawConfigFile::default())
}

/// `tart-executor.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("tart-executor.toml")
}
