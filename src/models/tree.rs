//! Regression trees fitted on gradient statistics, histogram split search

use serde::{Deserialize, Serialize};

/// Tree node. Children are indices into the owning tree's node vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        /// Bin index equivalent of `threshold` on the training grid
        bin: u8,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value for a raw feature row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    /// Leaf value for a row already mapped onto training bins
    pub(crate) fn predict_binned(&self, bins: &[u8]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => idx = if bins[feature] <= bin { left } else { right },
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Quantile cut points per feature, used to bucket training rows.
#[derive(Debug, Clone)]
pub(crate) struct BinMapper {
    cuts: Vec<Vec<f64>>,
}

impl BinMapper {
    /// `columns` yields each feature's training values
    pub(crate) fn fit<I>(columns: I, max_bins: usize) -> Self
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        let max_bins = max_bins.clamp(2, 256);
        let cuts = columns
            .into_iter()
            .map(|mut values| {
                values.sort_by(|a, b| a.total_cmp(b));
                let mut distinct = values.clone();
                distinct.dedup();

                if distinct.len() <= max_bins {
                    // every distinct value but the largest becomes a boundary
                    distinct.pop();
                    return distinct;
                }

                let n = values.len();
                let mut cuts: Vec<f64> = (1..max_bins).map(|i| values[i * n / max_bins]).collect();
                cuts.dedup();
                if cuts.last() == distinct.last() {
                    cuts.pop();
                }
                cuts
            })
            .collect();

        Self { cuts }
    }

    pub(crate) fn n_features(&self) -> usize {
        self.cuts.len()
    }

    pub(crate) fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }

    pub(crate) fn bin(&self, feature: usize, value: f64) -> u8 {
        self.cuts[feature].partition_point(|&c| c < value) as u8
    }

    /// Raw threshold equivalent to "bin <= `bin`"
    pub(crate) fn threshold(&self, feature: usize, bin: u8) -> f64 {
        self.cuts[feature][bin as usize]
    }
}

/// Split-search settings for one tree
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub reg_lambda: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: u8,
    gain: f64,
}

/// Grows one tree depth-first from per-row gradients and hessians.
pub(crate) struct TreeBuilder<'a> {
    params: TreeParams,
    mapper: &'a BinMapper,
    /// Row-major binned matrix, `n_features` bytes per row
    bins: &'a [u8],
    grad: &'a [f64],
    hess: &'a [f64],
    features: &'a [usize],
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        params: TreeParams,
        mapper: &'a BinMapper,
        bins: &'a [u8],
        grad: &'a [f64],
        hess: &'a [f64],
        features: &'a [usize],
    ) -> Self {
        Self {
            params,
            mapper,
            bins,
            grad,
            hess,
            features,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn build(mut self, rows: Vec<usize>) -> Tree {
        self.grow(rows, 0);
        Tree { nodes: self.nodes }
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let (g, h) = rows
            .iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]));

        let split = if depth < self.params.max_depth && rows.len() >= 2 {
            self.best_split(&rows, g, h)
        } else {
            None
        };

        let Some(split) = split else {
            let value = -g / (h + self.params.reg_lambda) * self.params.learning_rate;
            self.nodes.push(Node::Leaf { value });
            return self.nodes.len() - 1;
        };

        let n_features = self.mapper.n_features();
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.bins[r * n_features + split.feature] <= split.bin);

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: self.mapper.threshold(split.feature, split.bin),
            bin: split.bin,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let lambda = self.params.reg_lambda;
        let mcw = self.params.min_child_weight;
        let parent_score = g * g / (h + lambda);
        let n_features = self.mapper.n_features();

        let mut best: Option<SplitCandidate> = None;

        for &feature in self.features {
            let n_bins = self.mapper.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            let mut hist = vec![(0.0f64, 0.0f64); n_bins];
            for &r in rows {
                let slot = &mut hist[self.bins[r * n_features + feature] as usize];
                slot.0 += self.grad[r];
                slot.1 += self.hess[r];
            }

            let (mut gl, mut hl) = (0.0, 0.0);
            // the last bin has no cut above it
            for (bin, &(bg, bh)) in hist[..n_bins - 1].iter().enumerate() {
                gl += bg;
                hl += bh;
                let (gr, hr) = (g - gl, h - hl);
                if hl < mcw || hr < mcw {
                    continue;
                }

                let gain = 0.5 * (gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent_score)
                    - self.params.gamma;
                if gain > 1e-12 && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        bin: bin as u8,
                        gain,
                    });
                }
            }
        }

        best
    }
}
