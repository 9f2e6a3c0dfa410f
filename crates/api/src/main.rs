//! Vehicle Failure Prediction - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Vehicle Failure Prediction v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model.artifact_path.display());

    run_server(config).await
}
