//! netdash: headless live network-stats dashboard.
//!
//! Run with:  `RUST_LOG=info netdash [path/to/netdash.toml]`

mod app;

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("netdash v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(netdash_config::default_path);

    app::run(config_path).await
}
