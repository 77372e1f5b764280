//! Model adapters for pre-trained prediction artifacts
//!
//! - `linear`: linear and logistic regression
//! - `forest`: random forest regressor/classifier over flat decision trees
//! - `artifact`: JSON artifact format and validation
//! - `adapter`: availability-aware wrapper used by the pipelines
//! - `registry`: the three service models, loaded once at startup
//!
//! Pipelines only see the `Predictor` trait, so the technique backing a model
//! can change without touching pipeline code.

pub mod adapter;
pub mod artifact;
pub mod forest;
pub mod linear;
pub mod registry;

use smallvec::SmallVec;

pub use adapter::{AdapterStatus, ModelAdapter};
pub use artifact::{ArtifactFile, Estimator, ModelArtifact};
pub use forest::{DecisionTree, Forest, RandomForestClassifier, RandomForestRegressor, TreeNode};
pub use linear::{LinearModel, LinearRegression, LogisticRegression};
pub use registry::ModelRegistry;

/// Fixed-order feature vector (inputs are 2-3 wide in practice)
pub type Features = SmallVec<[f64; 4]>;

/// Whether a predictor produces numeric outputs or a class code
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    Regression,
    Classification,
}

/// Raw model output before any decoding
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Values(Features),
    Class(i64),
}

/// A fitted estimator. Inference is synchronous and local.
///
/// Callers guarantee `features.len() == self.n_features()`; the adapter checks
/// this before dispatching.
pub trait Predictor: Send + Sync + std::fmt::Debug {
    fn technique(&self) -> &'static str;

    fn kind(&self) -> PredictorKind;

    fn n_features(&self) -> usize;

    /// Number of regression outputs, or number of classes
    fn n_outputs(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Prediction;
}

/// Index of the largest score; ties go to the lowest index.
pub(crate) fn argmax(scores: &[f64]) -> i64 {
    let mut best = 0usize;
    for (idx, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = idx;
        }
    }
    best as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_lowest_on_tie() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[1.0]), 0);
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), 1);
    }
}
