//! Random forest estimators over flat decision trees
//!
//! Trees are stored as node arrays in depth-first order (root at index 0).
//! Internal nodes send `x[feature] <= threshold` to `left`, everything else to
//! `right`. Leaves hold a value vector: regression outputs for a regressor,
//! per-class scores for a classifier.

use super::{argmax, Features, Prediction, Predictor, PredictorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must come after their parent, which also rules out cycles.
    fn validate(&self, n_features: usize, n_outputs: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if value.len() != n_outputs {
                        return Err(format!(
                            "leaf {} has {} values, expected {}",
                            idx,
                            value.len(),
                            n_outputs
                        ));
                    }
                }
                TreeNode::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on missing feature {}", idx, feature));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if features[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Tree ensemble parameters shared by both forest heads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    pub n_outputs: usize,
    pub trees: Vec<DecisionTree>,
}

impl Forest {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.n_outputs == 0 {
            return Err("forest has no outputs".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features, self.n_outputs)
                .map_err(|e| format!("tree {}: {}", t, e))?;
        }
        Ok(())
    }

    fn mean_leaf(&self, features: &[f64]) -> Features {
        let mut acc: Features = smallvec::smallvec![0.0; self.n_outputs];
        for tree in &self.trees {
            for (sum, v) in acc.iter_mut().zip(tree.leaf(features)) {
                *sum += v;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|v| *v /= n);
        acc
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    forest: Forest,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(forest: Forest, n_features: usize) -> Result<Self, String> {
        forest.validate(n_features)?;
        Ok(Self { forest, n_features })
    }
}

impl Predictor for RandomForestRegressor {
    fn technique(&self) -> &'static str {
        "random_forest_regressor"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Regression
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        self.forest.n_outputs
    }

    fn predict(&self, features: &[f64]) -> Prediction {
        Prediction::Values(self.forest.mean_leaf(features))
    }
}

/// Soft-voting classifier: class scores are averaged across trees.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    forest: Forest,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(forest: Forest, n_features: usize) -> Result<Self, String> {
        forest.validate(n_features)?;
        Ok(Self { forest, n_features })
    }
}

impl Predictor for RandomForestClassifier {
    fn technique(&self) -> &'static str {
        "random_forest_classifier"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Classification
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        self.forest.n_outputs
    }

    fn predict(&self, features: &[f64]) -> Prediction {
        Prediction::Class(argmax(&self.forest.mean_leaf(features)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split { feature, threshold, left: 1, right: 2 },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn test_regressor_averages_trees() {
        let forest = Forest {
            n_outputs: 2,
            trees: vec![
                stump(0, 1.5, vec![2.0, 10.0], vec![4.0, 20.0]),
                stump(1, 0.5, vec![3.0, 30.0], vec![5.0, 40.0]),
            ],
        };
        let reg = RandomForestRegressor::new(forest, 2).unwrap();

        let Prediction::Values(v) = reg.predict(&[1.0, 1.0]) else { panic!("expected values") };
        // tree 1 -> left (2, 10), tree 2 -> right (5, 40)
        assert_relative_eq!(v[0], 3.5);
        assert_relative_eq!(v[1], 25.0);
    }

    #[test]
    fn test_threshold_is_inclusive_on_left() {
        let forest = Forest { n_outputs: 1, trees: vec![stump(0, 1.0, vec![1.0], vec![2.0])] };
        let reg = RandomForestRegressor::new(forest, 1).unwrap();
        assert_eq!(reg.predict(&[1.0]), Prediction::Values(smallvec::smallvec![1.0]));
        assert_eq!(reg.predict(&[1.0001]), Prediction::Values(smallvec::smallvec![2.0]));
    }

    #[test]
    fn test_classifier_soft_vote() {
        let forest = Forest {
            n_outputs: 3,
            trees: vec![
                stump(0, 0.5, vec![1.0, 0.0, 0.0], vec![0.0, 0.6, 0.4]),
                stump(0, 0.5, vec![1.0, 0.0, 0.0], vec![0.0, 0.3, 0.7]),
            ],
        };
        let clf = RandomForestClassifier::new(forest, 1).unwrap();
        assert_eq!(clf.predict(&[0.0]), Prediction::Class(0));
        // mean scores: [0, 0.45, 0.55]
        assert_eq!(clf.predict(&[1.0]), Prediction::Class(2));
    }

    #[test]
    fn test_validation() {
        let bad_child = Forest {
            n_outputs: 1,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 5 }],
            }],
        };
        assert!(RandomForestRegressor::new(bad_child, 1).is_err());

        let bad_feature = Forest { n_outputs: 1, trees: vec![stump(3, 0.0, vec![1.0], vec![2.0])] };
        assert!(RandomForestRegressor::new(bad_feature, 2).is_err());

        let bad_leaf = Forest { n_outputs: 2, trees: vec![stump(0, 0.0, vec![1.0], vec![2.0, 3.0])] };
        assert!(RandomForestClassifier::new(bad_leaf, 1).is_err());

        let empty = Forest { n_outputs: 1, trees: vec![] };
        assert!(RandomForestClassifier::new(empty, 1).is_err());
    }

    #[test]
    fn test_nodes_deserialize_untagged() {
        let tree: DecisionTree = serde_json::from_str(
            r#"{"nodes": [
                {"feature": 0, "threshold": 2.5, "left": 1, "right": 2},
                {"value": [1.0]},
                {"value": [2.0]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(tree, stump(0, 2.5, vec![1.0], vec![2.0]));
    }
}
