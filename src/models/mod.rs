//! Boosted-tree classifier, artifact persistence and inference

pub mod artifacts;
pub mod booster;
pub mod inference;
pub mod tree;

pub use artifacts::ModelArtifacts;
pub use booster::{BoosterParams, GradientBoostedClassifier};
pub use inference::InferenceEngine;
