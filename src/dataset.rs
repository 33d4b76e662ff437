//! PaySim CSV loading

use crate::error::PipelineError;
use crate::types::transaction::{TransactionRecord, FEATURE_NAMES, LABEL_COLUMN};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One CSV row, projected onto the columns the model uses.
///
/// Numeric cells are optional so blank cells survive parsing and are zeroed
/// like any other invalid value.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    tx_type: String,
    amount: Option<f64>,
    #[serde(rename = "oldbalanceOrg")]
    old_balance_orig: Option<f64>,
    #[serde(rename = "newbalanceOrig")]
    new_balance_orig: Option<f64>,
    #[serde(rename = "oldbalanceDest")]
    old_balance_dest: Option<f64>,
    #[serde(rename = "newbalanceDest")]
    new_balance_dest: Option<f64>,
    #[serde(rename = "isFraud")]
    is_fraud: i64,
}

impl CsvRow {
    fn into_labeled(self) -> Result<(TransactionRecord, u8), PipelineError> {
        let label = match self.is_fraud {
            0 => 0,
            1 => 1,
            other => return Err(PipelineError::InvalidLabel(other)),
        };

        let record = TransactionRecord {
            tx_type: self.tx_type,
            amount: self.amount.unwrap_or(0.0),
            old_balance_orig: self.old_balance_orig.unwrap_or(0.0),
            new_balance_orig: self.new_balance_orig.unwrap_or(0.0),
            old_balance_dest: self.old_balance_dest.unwrap_or(0.0),
            new_balance_dest: self.new_balance_dest.unwrap_or(0.0),
        };

        Ok((record, label))
    }
}

/// Transactions with their fraud labels, in file order
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub records: Vec<TransactionRecord>,
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    /// Load and validate a PaySim-format CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading dataset");

        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset {}", path.display()))?;
        let dataset = Self::from_reader(file)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;

        let (legitimate, fraud) = dataset.class_counts();
        info!(
            rows = dataset.len(),
            legitimate = legitimate,
            fraud = fraud,
            fraud_rate = format!("{:.4}%", 100.0 * fraud as f64 / dataset.len() as f64),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// Parse CSV from any reader. The header row must name every feature
    /// column and the label column; other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        for column in FEATURE_NAMES.iter().chain(std::iter::once(&LABEL_COLUMN)) {
            if !headers.iter().any(|h| h == *column) {
                return Err(PipelineError::MissingColumn(column.to_string()).into());
            }
        }

        let mut dataset = Self::default();
        let mut blank_cells = 0usize;

        for (index, row) in rdr.deserialize::<CsvRow>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = index + 2;
            let row = row.with_context(|| format!("Malformed row at line {}", line))?;
            blank_cells += [
                row.amount,
                row.old_balance_orig,
                row.new_balance_orig,
                row.old_balance_dest,
                row.new_balance_dest,
            ]
            .iter()
            .filter(|v| v.is_none())
            .count();

            let (record, label) = row
                .into_labeled()
                .with_context(|| format!("Invalid row at line {}", line))?;
            dataset.records.push(record);
            dataset.labels.push(label);
        }

        if blank_cells > 0 {
            warn!(blank_cells = blank_cells, "Blank numeric cells replaced with zero");
        }

        dataset.validate()?;
        Ok(dataset)
    }

    /// Build a dataset from in-memory rows
    pub fn from_parts(records: Vec<TransactionRecord>, labels: Vec<u8>) -> Result<Self> {
        anyhow::ensure!(
            records.len() == labels.len(),
            "{} records but {} labels",
            records.len(),
            labels.len()
        );
        let dataset = Self { records, labels };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Rejects empty or single-class data, which cannot train a classifier
    fn validate(&self) -> Result<(), PipelineError> {
        if self.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }
        match self.class_counts() {
            (0, _) => Err(PipelineError::SingleClass(1)),
            (_, 0) => Err(PipelineError::SingleClass(0)),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (legitimate, fraud) row counts
    pub fn class_counts(&self) -> (usize, usize) {
        let fraud = self.labels.iter().filter(|&&l| l == 1).count();
        (self.labels.len() - fraud, fraud)
    }
}
