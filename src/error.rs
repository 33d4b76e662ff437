//! Domain errors raised by the preprocessing, dataset and model layers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("unknown transaction type {value:?} (known types: {known:?})")]
    UnknownCategory { value: String, known: Vec<String> },

    #[error("unknown transaction type code {0}")]
    UnknownCode(usize),

    #[error("feature width mismatch: expected {expected} columns, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("dataset is missing required column {0:?}")]
    MissingColumn(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("label column contains a single class ({0}); both fraud and legitimate rows are required")]
    SingleClass(u8),

    #[error("invalid label {0}; expected 0 or 1")]
    InvalidLabel(i64),

    #[error("test size {0} must lie strictly between 0 and 1")]
    InvalidTestSize(f64),

    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
