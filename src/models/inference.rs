//! Single-transaction scoring on top of the loaded artifacts

use crate::config::ArtifactsConfig;
use crate::error::{PipelineError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::artifacts::ModelArtifacts;
use crate::types::prediction::Prediction;
use crate::types::transaction::{TransactionRecord, NUMERIC_FIELDS};
use tracing::{debug, info};

/// Encoder -> scaler -> booster, frozen for the life of the process.
///
/// Holds no mutable state, so one instance can be shared across requests.
pub struct InferenceEngine {
    artifacts: ModelArtifacts,
}

impl InferenceEngine {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts }
    }

    /// Load the artifacts from disk and build the engine
    pub fn load(paths: &ArtifactsConfig) -> anyhow::Result<Self> {
        let artifacts = ModelArtifacts::load(paths)?;
        info!(
            types = artifacts.encoder.classes().len(),
            trees = artifacts.model.n_trees(),
            "Inference engine initialized"
        );
        Ok(Self::new(artifacts))
    }

    /// Transaction types the encoder was fitted on, in code order
    pub fn known_types(&self) -> &[String] {
        self.artifacts.encoder.classes()
    }

    /// Reject numeric inputs outside the form bounds
    pub fn validate(&self, tx: &TransactionRecord) -> Result<()> {
        for (field, value) in NUMERIC_FIELDS.iter().zip(tx.numeric_values()) {
            if !field.contains(value) {
                return Err(PipelineError::OutOfRange {
                    field: field.name,
                    value,
                    min: field.min,
                    max: field.max,
                });
            }
        }
        Ok(())
    }

    /// Validate, encode, scale and score one transaction
    pub fn predict(&self, tx: &TransactionRecord) -> Result<Prediction> {
        self.validate(tx)?;
        let raw = FeatureExtractor::new(&self.artifacts.encoder).extract(tx)?;
        let scaled = self.artifacts.scaler.transform_row(&raw)?;

        let fraud_probability = self.artifacts.model.predict_proba(&scaled)?;
        let label = self.artifacts.model.predict(&scaled)?;

        debug!(
            tx_type = %tx.tx_type,
            amount = tx.amount,
            fraud_probability = fraud_probability,
            label = label,
            "Transaction scored"
        );

        Ok(Prediction::new(label, fraud_probability))
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }
}
