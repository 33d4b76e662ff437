//! Evaluation metrics for the held-out split.

use serde::Serialize;
use std::fmt;
use tracing::info;

/// Precision / recall / F1 for one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Binary confusion matrix, fraud = positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (1, 1) => cm.true_positive += 1,
                (1, _) => cm.false_negative += 1,
                (_, 1) => cm.false_positive += 1,
                _ => cm.true_negative += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Metrics for class 0 (legitimate) and class 1 (fraud)
    fn per_class(&self) -> [ClassMetrics; 2] {
        let legit = class_metrics(
            self.true_negative,
            self.false_negative,
            self.false_positive,
        );
        let fraud = class_metrics(
            self.true_positive,
            self.false_positive,
            self.false_negative,
        );
        [legit, fraud]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    // undefined ratios report 0.0
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_metrics(hits: usize, false_alarms: usize, misses: usize) -> ClassMetrics {
    let precision = ratio(hits, hits + false_alarms);
    let recall = ratio(hits, hits + misses);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: hits + misses,
    }
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
/// `None` when only one class is present.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = y_true.iter().filter(|&&y| y == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // 1-based average rank of the tie group
        let rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = order[start..=end].iter().filter(|&&i| y_true[i] == 1).count();
        positive_rank_sum += rank * tied_positives as f64;
        start = end + 1;
    }

    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

/// Precision / recall / F1 report for the binary fraud classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Index 0 = legitimate, 1 = fraud
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
    pub roc_auc: Option<f64>,
}

impl ClassificationReport {
    pub fn new(y_true: &[u8], y_pred: &[u8]) -> Self {
        let confusion = ConfusionMatrix::from_labels(y_true, y_pred);
        let classes = confusion.per_class();
        let total = confusion.total();

        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes
                    .iter()
                    .map(|c| f(c) * c.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Self {
            classes,
            accuracy: ratio(confusion.true_positive + confusion.true_negative, total),
            macro_avg,
            weighted_avg,
            confusion,
            roc_auc: None,
        }
    }

    /// Attach ROC AUC computed from fraud probabilities
    pub fn with_scores(mut self, y_true: &[u8], scores: &[f64]) -> Self {
        self.roc_auc = roc_auc(y_true, scores);
        self
    }

    pub fn fraud(&self) -> &ClassMetrics {
        &self.classes[1]
    }

    /// Log headline numbers
    pub fn log_summary(&self) {
        let fraud = self.fraud();
        info!(
            accuracy = self.accuracy,
            fraud_precision = fraud.precision,
            fraud_recall = fraud.recall,
            fraud_f1 = fraud.f1,
            roc_auc = ?self.roc_auc,
            "Evaluation complete"
        );
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.confusion.total();
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, c) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
                label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, total
        )?;
        for (name, c) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
                name, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = actual, columns = predicted):")?;
        writeln!(f, "{:>12} {:>10} {:>10}", "", "0", "1")?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10}",
            "0", self.confusion.true_negative, self.confusion.false_positive
        )?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10}",
            "1", self.confusion.false_negative, self.confusion.true_positive
        )?;
        if let Some(auc) = self.roc_auc {
            writeln!(f)?;
            writeln!(f, "ROC AUC: {:.4}", auc)?;
        }
        Ok(())
    }
}
