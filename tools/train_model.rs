//! Model Trainer
//!
//! Trains the fraud classifier on a PaySim CSV export, prints the held-out
//! classification report and writes the model, scaler and label encoder.
//!
//! Usage: train_model [path/to/paysim.csv]

use anyhow::Result;
use fraud_detection_demo::config::{init_logging, AppConfig};
use fraud_detection_demo::training;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let csv_override = std::env::args().nth(1).map(PathBuf::from);
    config.log_summary();

    let outcome = training::run(&config, csv_override.as_deref())?;

    println!("{}", outcome.report);
    info!(
        dir = %config.artifacts.dir.display(),
        trees = outcome.artifacts.model.n_trees(),
        "Model, scaler, and encoder saved successfully"
    );
    Ok(())
}
