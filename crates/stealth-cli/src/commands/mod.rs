//! CLI command implementations and shared config loading.

pub mod seal;
pub mod serve;
pub mod status;
pub mod verify;

use std::path::{Path, PathBuf};

use stealth_types::config::Config;
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STEALTH_CONFIG";

/// Locate the config file.
///
/// Search order:
/// 1. `STEALTH_CONFIG` env var (returned even if the file is missing)
/// 2. `~/.stealth/config.json` (only if it exists)
pub fn discover_config_path(env_value: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let candidate = home?.join(".stealth").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Discover using the real environment and home directory.
pub fn default_config_path() -> Option<PathBuf> {
    discover_config_path(std::env::var(CONFIG_ENV).ok(), dirs::home_dir())
}

/// Load configuration.
///
/// `--config` wins over discovery. With no file anywhere, returns
/// [`Config::default`].
pub async fn load_config(config_override: Option<&str>) -> anyhow::Result<Config> {
    let path = match config_override {
        Some(p) => {
            let path = PathBuf::from(p);
            if !path.exists() {
                anyhow::bail!("config file not found: {p}");
            }
            Some(path)
        }
        None => default_config_path(),
    };

    match path {
        Some(path) => read_config(&path).await,
        None => {
            debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}

async fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let config = parse_config(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Parse a JSON config document.
pub fn parse_config(contents: &str) -> Result<Config, serde_json::Error> {
    serde_json::from_str(contents)
}
