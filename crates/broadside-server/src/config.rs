//! Configuration loading: TOML file plus command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use broadside::ServerConfig;
use tracing::info;

use crate::cli::Args;

/// Reads `path` as a [`ServerConfig`], or returns the defaults if it does
/// not exist.
pub async fn load_from_file(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        info!(path = %path.display(), "no configuration file, using defaults");
        return Ok(ServerConfig::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Applies command-line overrides on top of a loaded configuration.
pub fn apply_args(mut config: ServerConfig, args: &Args) -> ServerConfig {
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.clone();
    }
    config
}
