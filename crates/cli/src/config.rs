//! Configuration management for the CLI

use anyhow::{Context, Result};
use relocator_lib::SessionConfig;
use std::path::PathBuf;

/// Build the session configuration
///
/// Precedence, lowest first: config file, `RELOCATOR_*` environment
/// variables, command-line flags.
pub fn session_config(
    config_file: Option<&str>,
    master: Option<&str>,
    kubeconfig: Option<&str>,
) -> Result<SessionConfig> {
    let path = match config_file {
        Some(path) => Some(PathBuf::from(path)),
        None => default_config_path(),
    };

    let mut config = SessionConfig::load(path.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = master.filter(|url| !url.is_empty()) {
        config = config.with_master_url(url);
    }
    if let Some(path) = kubeconfig.filter(|path| !path.is_empty()) {
        config = config.with_kubeconfig(path);
    }

    config.validate()?;
    Ok(config)
}

/// Get the default configuration file path
fn default_config_path() -> Option<PathBuf> {
    let home = dirs_next::home_dir()?;
    Some(home.join(".config").join("relocator").join("config.toml"))
}
