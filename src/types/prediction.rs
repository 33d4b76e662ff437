//! Scoring outcome data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome class reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Fraudulent,
}

impl Verdict {
    /// Map the classifier's 0/1 label to a verdict
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Verdict::Fraudulent
        } else {
            Verdict::Legitimate
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Verdict::Fraudulent)
    }
}

/// Result of scoring one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class (1 = fraud)
    pub label: u8,

    /// Probability of the fraud class (0.0 - 1.0)
    pub fraud_probability: f64,

    pub verdict: Verdict,

    pub scored_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(label: u8, fraud_probability: f64) -> Self {
        Self {
            label,
            fraud_probability,
            verdict: Verdict::from_label(label),
            scored_at: Utc::now(),
        }
    }

    /// Headline shown on the scoring page
    pub fn message(&self) -> String {
        match self.verdict {
            Verdict::Fraudulent => format!(
                "Fraudulent Transaction Detected! (Probability: {:.2})",
                self.fraud_probability
            ),
            Verdict::Legitimate => format!(
                "Legitimate Transaction (Probability of Fraud: {:.2})",
                self.fraud_probability
            ),
        }
    }
}
