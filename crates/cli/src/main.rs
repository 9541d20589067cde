use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use giftrun_core::{
    load_config, validate_config, HttpTransport, Runner, SanitizedConfig, SystemClock, Transport,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional config file; the environment alone is enough
    let config_path = std::env::var("GIFTRUN_CONFIG").ok().map(PathBuf::from);
    if let Some(ref path) = config_path {
        info!("Loading configuration from {:?}", path);
    }

    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    validate_config(&config).context("SECRET, CURRENT_CODE, and IDS_CSV must be set")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new().context("Failed to create HTTP client")?);
    let runner = Runner::from_config(&config, transport, Arc::new(SystemClock));

    let summary = runner.run(&config.fids()).await;
    info!(ok = summary.ok, fail = summary.fail, "Run complete");

    Ok(())
}
