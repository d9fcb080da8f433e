use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use artifacts::{ForestModel, TransformerSet};
use config::ServiceConfig;
use pipeline::SalesPipeline;

mod artifacts;
mod config;
mod models;
mod pipeline;
mod server;

const SERVICE_CONFIG_PATH: &str = "src/configs/service.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config =
        ServiceConfig::load(SERVICE_CONFIG_PATH).context("Failed to load service configuration")?;

    // The fitted transformers and the trained model are loaded once and
    // stay read-only for the rest of the process lifetime.
    let transformers = TransformerSet::load(&config.artifacts.parameter_dir)
        .context("Failed to load fitted transformers")?;
    info!(
        "Loaded fitted transformers from {}",
        config.artifacts.parameter_dir.display()
    );

    let model =
        ForestModel::load(&config.artifacts.model_path).context("Failed to load trained model")?;
    info!(
        "Loaded trained model from {}",
        config.artifacts.model_path.display()
    );

    let pipeline = Arc::new(SalesPipeline::new(Arc::new(transformers), Arc::new(model)));
    let app = server::build_router(pipeline);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!(
        "sales-predictor v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr()
    );
    axum::serve(listener, app).await.context("Server exited")?;

    Ok(())
}
