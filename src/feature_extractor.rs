//! Feature extraction for fraud model training and inference.
//!
//! Turns transaction records into the raw (unscaled) feature rows the scaler
//! and the booster consume. Training and scoring both go through here so the
//! column order cannot drift between them.

use crate::error::Result;
use crate::preprocessing::LabelEncoder;
use crate::types::transaction::{TransactionRecord, FEATURE_NAMES};
use ndarray::Array2;

/// Number of model input columns
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Replace NaN and +/- infinity with zero
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Feature extractor that transforms transactions into model input rows.
pub struct FeatureExtractor<'a> {
    encoder: &'a LabelEncoder,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(encoder: &'a LabelEncoder) -> Self {
        Self { encoder }
    }

    /// Extract one raw feature row: encoded type followed by the five
    /// sanitised numeric columns.
    pub fn extract(&self, tx: &TransactionRecord) -> Result<[f64; FEATURE_COUNT]> {
        let mut features = [0.0; FEATURE_COUNT];
        features[0] = self.encoder.transform(&tx.tx_type)? as f64;
        for (slot, value) in features[1..].iter_mut().zip(tx.numeric_values()) {
            *slot = sanitize(value);
        }
        Ok(features)
    }

    /// Extract a full feature matrix, one row per record
    pub fn extract_matrix(&self, records: &[TransactionRecord]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((records.len(), FEATURE_COUNT));
        for (mut row, tx) in matrix.rows_mut().into_iter().zip(records) {
            let features = self.extract(tx)?;
            for (slot, value) in row.iter_mut().zip(features) {
                *slot = value;
            }
        }
        Ok(matrix)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn encoder() -> LabelEncoder {
        LabelEncoder::fit(["CASH_IN", "CASH_OUT", "DEBIT", "PAYMENT", "TRANSFER"]).unwrap()
    }

    #[test]
    fn test_feature_extraction() {
        let encoder = encoder();
        let extractor = FeatureExtractor::new(&encoder);
        let tx = TransactionRecord::new("TRANSFER", 181.0).with_sender_balances(181.0, 0.0);

        let features = extractor.extract(&tx).unwrap();

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features, [4.0, 181.0, 181.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_non_finite_values_become_zero() {
        let encoder = encoder();
        let extractor = FeatureExtractor::new(&encoder);
        let tx = TransactionRecord::new("PAYMENT", f64::NAN)
            .with_sender_balances(f64::INFINITY, 10.0)
            .with_receiver_balances(f64::NEG_INFINITY, 5.0);

        let features = extractor.extract(&tx).unwrap();
        assert_eq!(features, [3.0, 0.0, 0.0, 10.0, 0.0, 5.0]);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let encoder = encoder();
        let extractor = FeatureExtractor::new(&encoder);
        let tx = TransactionRecord::new("WIRE", 1.0);

        assert!(matches!(
            extractor.extract(&tx),
            Err(PipelineError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_extract_matrix_shape() {
        let encoder = encoder();
        let extractor = FeatureExtractor::new(&encoder);
        let records = vec![
            TransactionRecord::new("CASH_IN", 1.0),
            TransactionRecord::new("DEBIT", 2.0),
        ];

        let matrix = extractor.extract_matrix(&records).unwrap();
        assert_eq!(matrix.dim(), (2, 6));
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[1, 1]], 2.0);
        assert_eq!(extractor.feature_names()[0], "type");
    }
}
