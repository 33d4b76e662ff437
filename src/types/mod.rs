//! Type definitions for the fraud detection demo

pub mod prediction;
pub mod transaction;

pub use prediction::{Prediction, Verdict};
pub use transaction::{NumericField, TransactionRecord, FEATURE_NAMES, NUMERIC_FIELDS};
