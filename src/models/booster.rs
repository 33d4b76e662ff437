//! Gradient-boosted tree classifier with a binary logistic objective
//!
//! Second-order boosting: each round fits a depth-limited tree to the
//! gradients and hessians of the weighted log-loss, on a seeded row and
//! column subsample, and adds its shrunken leaf values to the margin.

use crate::error::{PipelineError, Result};
use crate::models::tree::{BinMapper, Tree, TreeBuilder, TreeParams};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Rounds between info-level progress lines
const LOG_EVERY: usize = 50;

/// Hyper-parameters of the booster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf value
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Fraction of rows sampled for each tree
    pub subsample: f64,
    /// Fraction of columns sampled for each tree
    pub colsample_bytree: f64,
    /// L2 penalty on leaf values
    pub reg_lambda: f64,
    /// Minimum loss reduction to keep a split
    pub gamma: f64,
    /// Minimum hessian mass in each child
    pub min_child_weight: f64,
    /// Weight of positive rows relative to negatives
    pub scale_pos_weight: f64,
    /// Histogram resolution per feature (2..=256)
    pub max_bins: usize,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            learning_rate: 0.05,
            max_depth: 5,
            subsample: 0.8,
            colsample_bytree: 0.8,
            reg_lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            scale_pos_weight: 1.0,
            max_bins: 256,
            seed: 42,
        }
    }
}

impl BoosterParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            reg_lambda: self.reg_lambda,
            gamma: self.gamma,
            min_child_weight: self.min_child_weight,
            learning_rate: self.learning_rate,
        }
    }
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Mean binary log-loss of probabilities against 0/1 labels
pub fn log_loss(labels: &[u8], probabilities: &[f64]) -> f64 {
    const EPS: f64 = 1e-15;
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = labels
        .iter()
        .zip(probabilities)
        .map(|(&y, &p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            if y == 1 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / labels.len() as f64
}

/// Fitted boosted-tree ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    params: BoosterParams,
    n_features: usize,
    /// Margin every prediction starts from (0.0 = probability 0.5)
    base_margin: f64,
    trees: Vec<Tree>,
}

impl GradientBoostedClassifier {
    /// Fit on a (rows x features) matrix and 0/1 labels
    pub fn fit(x: &Array2<f64>, y: &[u8], params: BoosterParams) -> Result<Self> {
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if y.len() != n_rows {
            return Err(PipelineError::FeatureWidth {
                expected: n_rows,
                actual: y.len(),
            });
        }
        if let Some(&bad) = y.iter().find(|&&l| l > 1) {
            return Err(PipelineError::InvalidLabel(bad as i64));
        }

        let mapper = BinMapper::fit(x.axis_iter(Axis(1)).map(|col| col.to_vec()), params.max_bins);
        let mut bins = Vec::with_capacity(n_rows * n_features);
        for row in x.rows() {
            bins.extend(row.iter().enumerate().map(|(f, &v)| mapper.bin(f, v)));
        }

        let weights: Vec<f64> = y
            .iter()
            .map(|&l| if l == 1 { params.scale_pos_weight } else { 1.0 })
            .collect();

        let row_sample =
            ((params.subsample.clamp(0.0, 1.0) * n_rows as f64) as usize).clamp(1, n_rows);
        let col_sample = ((params.colsample_bytree.clamp(0.0, 1.0) * n_features as f64) as usize)
            .clamp(1, n_features.max(1));

        info!(
            rows = n_rows,
            features = n_features,
            rounds = params.n_estimators,
            rows_per_tree = row_sample,
            features_per_tree = col_sample,
            scale_pos_weight = params.scale_pos_weight,
            "Fitting gradient-boosted trees"
        );

        let base_margin = 0.0;
        let mut margins = vec![base_margin; n_rows];
        let mut grad = vec![0.0; n_rows];
        let mut hess = vec![0.0; n_rows];
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);
        let tree_params = params.tree_params();

        for round in 0..params.n_estimators {
            for i in 0..n_rows {
                let p = sigmoid(margins[i]);
                let target = f64::from(y[i]);
                grad[i] = weights[i] * (p - target);
                hess[i] = (weights[i] * p * (1.0 - p)).max(1e-16);
            }

            let mut rows = if row_sample < n_rows {
                index::sample(&mut rng, n_rows, row_sample).into_vec()
            } else {
                (0..n_rows).collect()
            };
            rows.sort_unstable();

            let mut features = if col_sample < n_features {
                index::sample(&mut rng, n_features, col_sample).into_vec()
            } else {
                (0..n_features).collect()
            };
            features.sort_unstable();

            let tree = TreeBuilder::new(tree_params, &mapper, &bins, &grad, &hess, &features)
                .build(rows);

            for (i, margin) in margins.iter_mut().enumerate() {
                *margin += tree.predict_binned(&bins[i * n_features..(i + 1) * n_features]);
            }
            trees.push(tree);

            let round = round + 1;
            let probabilities: Vec<f64> = margins.iter().map(|&m| sigmoid(m)).collect();
            let train_logloss = log_loss(y, &probabilities);
            if round % LOG_EVERY == 0 || round == params.n_estimators {
                info!(round = round, train_logloss = train_logloss, "Boosting progress");
            } else {
                debug!(round = round, train_logloss = train_logloss, "Boosting round complete");
            }
        }

        Ok(Self {
            params,
            n_features,
            base_margin,
            trees,
        })
    }

    /// Raw additive score before the sigmoid
    pub fn margin(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(PipelineError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        Ok(self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>())
    }

    /// Probability of the positive (fraud) class
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        self.margin(row).map(sigmoid)
    }

    /// Predicted class: 1 when the fraud probability exceeds 0.5
    pub fn predict(&self, row: &[f64]) -> Result<u8> {
        Ok(u8::from(self.predict_proba(row)? > 0.5))
    }

    /// Fraud probabilities for every row of a matrix
    pub fn predict_proba_matrix(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_proba(&row.to_vec()))
            .collect()
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::Rng;

    fn small_params() -> BoosterParams {
        BoosterParams {
            n_estimators: 40,
            learning_rate: 0.3,
            max_depth: 3,
            subsample: 1.0,
            colsample_bytree: 1.0,
            ..BoosterParams::default()
        }
    }

    /// Label is 1 when the first feature is above 0.7
    fn threshold_data(n: usize, seed: u64) -> (Array2<f64>, Vec<u8>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = Array2::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a: f64 = rng.gen();
            let b: f64 = rng.gen();
            x[[i, 0]] = a;
            x[[i, 1]] = b;
            y.push(u8::from(a > 0.7));
        }
        (x, y)
    }

    #[test]
    fn test_learns_threshold_rule() {
        let (x, y) = threshold_data(500, 7);
        let model = GradientBoostedClassifier::fit(&x, &y, small_params()).unwrap();

        assert_eq!(model.n_trees(), 40);
        assert!(model.predict_proba(&[0.95, 0.5]).unwrap() > 0.9);
        assert!(model.predict_proba(&[0.10, 0.5]).unwrap() < 0.1);
        assert_eq!(model.predict(&[0.95, 0.1]).unwrap(), 1);
        assert_eq!(model.predict(&[0.20, 0.9]).unwrap(), 0);
    }

    #[test]
    fn test_training_loss_decreases() {
        let (x, y) = threshold_data(300, 11);
        let short = GradientBoostedClassifier::fit(
            &x,
            &y,
            BoosterParams {
                n_estimators: 2,
                ..small_params()
            },
        )
        .unwrap();
        let long = GradientBoostedClassifier::fit(&x, &y, small_params()).unwrap();

        let loss_short = log_loss(&y, &short.predict_proba_matrix(&x).unwrap());
        let loss_long = log_loss(&y, &long.predict_proba_matrix(&x).unwrap());
        assert!(loss_long < loss_short);
    }

    #[test]
    fn test_fit_is_deterministic_with_subsampling() {
        let (x, y) = threshold_data(400, 3);
        let params = BoosterParams {
            n_estimators: 20,
            subsample: 0.8,
            colsample_bytree: 0.5,
            ..BoosterParams::default()
        };

        let a = GradientBoostedClassifier::fit(&x, &y, params.clone()).unwrap();
        let b = GradientBoostedClassifier::fit(&x, &y, params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_pos_weight_raises_positive_probability() {
        let (x, y) = threshold_data(400, 5);
        let params = BoosterParams {
            n_estimators: 5,
            learning_rate: 0.1,
            ..small_params()
        };
        let plain = GradientBoostedClassifier::fit(&x, &y, params.clone()).unwrap();
        let weighted = GradientBoostedClassifier::fit(
            &x,
            &y,
            BoosterParams {
                scale_pos_weight: 10.0,
                ..params
            },
        )
        .unwrap();

        let row = [0.9, 0.5];
        assert!(weighted.predict_proba(&row).unwrap() > plain.predict_proba(&row).unwrap());
    }

    #[test]
    fn test_width_mismatch_fails() {
        let (x, y) = threshold_data(50, 1);
        let model = GradientBoostedClassifier::fit(&x, &y, small_params()).unwrap();
        assert_eq!(
            model.predict(&[0.5]),
            Err(PipelineError::FeatureWidth { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let x = array![[1.0], [2.0]];
        assert_eq!(
            GradientBoostedClassifier::fit(&x, &[0, 2], small_params()),
            Err(PipelineError::InvalidLabel(2))
        );
        assert!(GradientBoostedClassifier::fit(&x, &[0], small_params()).is_err());

        let empty = Array2::<f64>::zeros((0, 1));
        assert_eq!(
            GradientBoostedClassifier::fit(&empty, &[], small_params()),
            Err(PipelineError::EmptyDataset)
        );
    }

    #[test]
    fn test_log_loss() {
        assert!(log_loss(&[1, 0], &[1.0, 0.0]) < 1e-10);
        assert!((log_loss(&[1], &[0.5]) - std::f64::consts::LN_2).abs() < 1e-12);
    }
}
