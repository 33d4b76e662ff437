//! Offline training: dataset -> encoder, scaler, booster, held-out report

use crate::config::{AppConfig, TrainingConfig};
use crate::dataset::LabeledDataset;
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::ClassificationReport;
use crate::models::artifacts::ModelArtifacts;
use crate::models::booster::{BoosterParams, GradientBoostedClassifier};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::split::{stratified_split, SplitIndices};
use anyhow::{Context, Result};
use ndarray::Axis;
use std::path::Path;
use tracing::info;

/// Fitted artifacts plus what was learned about them on the test split
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ModelArtifacts,
    pub report: ClassificationReport,
    pub split: SplitIndices,
    /// Negative / positive ratio of the training split actually used
    pub scale_pos_weight: f64,
}

/// Negative-to-positive ratio of `labels`; 1.0 when either class is absent
pub fn class_balance_weight(labels: &[u8]) -> f64 {
    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        1.0
    } else {
        negatives as f64 / positives as f64
    }
}

/// Fit encoder, scaler and booster on `dataset` and evaluate on a held-out split.
///
/// The encoder and scaler are fitted on every row before the split; the
/// booster only sees the training side.
pub fn train(dataset: &LabeledDataset, settings: &TrainingConfig) -> Result<TrainingOutcome> {
    let encoder = LabelEncoder::fit(dataset.records.iter().map(|r| r.tx_type.as_str()))
        .context("Failed to fit label encoder")?;
    info!(classes = ?encoder.classes(), "Label encoder fitted");

    let raw = FeatureExtractor::new(&encoder)
        .extract_matrix(&dataset.records)
        .context("Failed to build feature matrix")?;
    let (scaler, scaled) = StandardScaler::fit_transform(&raw).context("Failed to fit scaler")?;

    let split = stratified_split(&dataset.labels, settings.test_size, settings.random_state)
        .context("Failed to split dataset")?;

    let x_train = scaled.select(Axis(0), &split.train);
    let x_test = scaled.select(Axis(0), &split.test);
    let y_train: Vec<u8> = split.train.iter().map(|&i| dataset.labels[i]).collect();
    let y_test: Vec<u8> = split.test.iter().map(|&i| dataset.labels[i]).collect();

    let scale_pos_weight = if settings.balance_classes {
        class_balance_weight(&y_train)
    } else {
        settings.booster.scale_pos_weight
    };
    info!(
        train_rows = y_train.len(),
        test_rows = y_test.len(),
        scale_pos_weight = scale_pos_weight,
        "Split prepared"
    );

    let params = BoosterParams {
        scale_pos_weight,
        ..settings.booster.clone()
    };
    let model = GradientBoostedClassifier::fit(&x_train, &y_train, params)
        .context("Failed to fit booster")?;

    let scores = model.predict_proba_matrix(&x_test)?;
    let predictions: Vec<u8> = scores.iter().map(|&p| u8::from(p > 0.5)).collect();
    let report = ClassificationReport::new(&y_test, &predictions).with_scores(&y_test, &scores);
    report.log_summary();

    Ok(TrainingOutcome {
        artifacts: ModelArtifacts {
            model,
            scaler,
            encoder,
        },
        report,
        split,
        scale_pos_weight,
    })
}

/// Load the CSV, train, and write the artifacts.
///
/// `csv_override` replaces `data.csv_path` when given.
pub fn run(config: &AppConfig, csv_override: Option<&Path>) -> Result<TrainingOutcome> {
    let csv_path = csv_override.unwrap_or(config.data.csv_path.as_path());
    let dataset = LabeledDataset::from_csv_path(csv_path)?;

    let outcome = train(&dataset, &config.training)?;
    outcome.artifacts.save(&config.artifacts)?;

    Ok(outcome)
}
