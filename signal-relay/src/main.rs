//! signal-relay binary entry point.
//!
//! Usage:
//! ```bash
//! signal-relay --config relay.toml
//! ```

use anyhow::Context;
use filedrop_signal_relay::config::Config;
use filedrop_signal_relay::http;
use filedrop_signal_relay::server::SignalRelay;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = get_config_path();
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        tracing::info!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    http::health::init_start_time();

    let relay = Arc::new(SignalRelay::new(config));
    relay.serve().await.context("relay server failed")?;
    Ok(())
}

fn get_config_path() -> PathBuf {
    std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("relay.toml"))
}
