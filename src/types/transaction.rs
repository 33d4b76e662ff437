//! Transaction data structures shared by the trainer and the scoring page

use serde::{Deserialize, Serialize};

/// Model input columns, in the order the scaler and the booster were fitted on.
pub const FEATURE_NAMES: [&str; 6] = [
    "type",
    "amount",
    "oldbalanceOrg",
    "newbalanceOrig",
    "oldbalanceDest",
    "newbalanceDest",
];

/// Label column in the PaySim CSV.
pub const LABEL_COLUMN: &str = "isFraud";

/// A single mobile-money transaction as seen by the model.
///
/// Serde names follow the PaySim column headers so the same struct is
/// decoded from CSV rows and from the scoring form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction type (CASH_IN, CASH_OUT, DEBIT, PAYMENT, TRANSFER)
    #[serde(rename = "type")]
    pub tx_type: String,

    /// Amount moved
    pub amount: f64,

    /// Sender balance before the transaction
    #[serde(rename = "oldbalanceOrg")]
    pub old_balance_orig: f64,

    /// Sender balance after the transaction
    #[serde(rename = "newbalanceOrig")]
    pub new_balance_orig: f64,

    /// Receiver balance before the transaction
    #[serde(rename = "oldbalanceDest")]
    pub old_balance_dest: f64,

    /// Receiver balance after the transaction
    #[serde(rename = "newbalanceDest")]
    pub new_balance_dest: f64,
}

impl TransactionRecord {
    pub fn new(tx_type: impl Into<String>, amount: f64) -> Self {
        Self {
            tx_type: tx_type.into(),
            amount,
            old_balance_orig: 0.0,
            new_balance_orig: 0.0,
            old_balance_dest: 0.0,
            new_balance_dest: 0.0,
        }
    }

    pub fn with_sender_balances(mut self, old: f64, new: f64) -> Self {
        self.old_balance_orig = old;
        self.new_balance_orig = new;
        self
    }

    pub fn with_receiver_balances(mut self, old: f64, new: f64) -> Self {
        self.old_balance_dest = old;
        self.new_balance_dest = new;
        self
    }

    /// The five numeric columns, in feature order.
    pub fn numeric_values(&self) -> [f64; 5] {
        [
            self.amount,
            self.old_balance_orig,
            self.new_balance_orig,
            self.old_balance_dest,
            self.new_balance_dest,
        ]
    }
}

/// Bounds and default of one numeric input on the scoring form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericField {
    /// Form / CSV column name
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl NumericField {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Numeric inputs in feature order.
pub const NUMERIC_FIELDS: [NumericField; 5] = [
    NumericField {
        name: "amount",
        label: "Transaction Amount ($)",
        min: 0.0,
        max: 100_000.0,
        default: 2_500.0,
        step: 100.0,
    },
    NumericField {
        name: "oldbalanceOrg",
        label: "Sender's Old Balance",
        min: 0.0,
        max: 1_000_000.0,
        default: 5_000.0,
        step: 100.0,
    },
    NumericField {
        name: "newbalanceOrig",
        label: "Sender's New Balance",
        min: 0.0,
        max: 1_000_000.0,
        default: 2_500.0,
        step: 100.0,
    },
    NumericField {
        name: "oldbalanceDest",
        label: "Receiver's Old Balance",
        min: 0.0,
        max: 1_000_000.0,
        default: 10_000.0,
        step: 100.0,
    },
    NumericField {
        name: "newbalanceDest",
        label: "Receiver's New Balance",
        min: 0.0,
        max: 1_000_000.0,
        default: 12_500.0,
        step: 100.0,
    },
];
