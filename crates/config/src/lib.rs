pub mod schema;
pub mod watcher;

pub use schema::{DashboardConfig, DisplayElementConfig, DisplayKind, GlobalConfig};
pub use watcher::ConfigWatcher;

use netdash_core::{Result, StatsError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `DashboardConfig::default()`
/// if the file doesn't exist so the dashboard always has something to show.
pub fn load(path: impl AsRef<Path>) -> Result<DashboardConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(DashboardConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| StatsError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<DashboardConfig> {
    toml::from_str(raw).map_err(|e| StatsError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("netdash").join("netdash.toml")
}
