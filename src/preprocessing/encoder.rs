//! Label encoder for the categorical `type` column

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maps category strings to dense integer codes.
///
/// Classes are kept sorted and deduplicated, so the code of a category is
/// its rank among all categories seen during fitting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the set of classes from training values
    pub fn fit<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        Ok(Self {
            classes: classes.into_iter().collect(),
        })
    }

    /// Fit on `values` and return their codes in one pass
    pub fn fit_transform<S: AsRef<str>>(values: &[S]) -> Result<(Self, Vec<usize>)> {
        let encoder = Self::fit(values.iter().map(|v| AsRef::<str>::as_ref(v)))?;
        let codes = encoder.transform_all(values)?;
        Ok((encoder, codes))
    }

    pub fn transform(&self, value: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| PipelineError::UnknownCategory {
                value: value.to_string(),
                known: self.classes.clone(),
            })
    }

    pub fn transform_all<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<usize>> {
        values
            .iter()
            .map(|v| self.transform(AsRef::<str>::as_ref(v)))
            .collect()
    }

    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(PipelineError::UnknownCode(code))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, value: &str) -> bool {
        self.transform(value).is_ok()
    }
}
