//! PaySim fraud detection demo
//!
//! Offline training of a boosted-tree fraud classifier on PaySim-format
//! transactions, and a small web page that scores one transaction at a time
//! with the saved model, scaler and label encoder.

pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod split;
pub mod training;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::PipelineError;
pub use feature_extractor::FeatureExtractor;
pub use models::inference::InferenceEngine;
pub use types::{prediction::Prediction, transaction::TransactionRecord};
