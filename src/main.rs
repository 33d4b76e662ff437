//! Fraud Detection App - scoring page entry point
//!
//! Loads the trained artifacts once, then serves the form that scores
//! single transactions.

use anyhow::Result;
use fraud_detection_demo::{
    config::{init_logging, AppConfig},
    models::inference::InferenceEngine,
    web::{self, AppState},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Fraud Detection App");
    config.log_summary();

    // Startup fails here if any artifact is missing or corrupt
    let engine = Arc::new(InferenceEngine::load(&config.artifacts)?);
    info!(known_types = ?engine.known_types(), "Model ready");

    let state = Arc::new(AppState::new(engine));
    web::serve(&config.server, state).await
}
