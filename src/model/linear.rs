//! Linear estimators
//!
//! Coefficients are stored row-per-output: `coefficients[j][i]` weights
//! feature `i` for output (or class) `j`.

use super::{argmax, Features, Prediction, Predictor, PredictorKind};
use serde::{Deserialize, Serialize};

/// Shared parameters for linear and logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("linear model has no outputs".to_string());
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(format!(
                "{} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            ));
        }
        for (j, row) in self.coefficients.iter().enumerate() {
            if row.len() != n_features {
                return Err(format!(
                    "coefficient row {} has {} weights, expected {}",
                    j,
                    row.len(),
                    n_features
                ));
            }
        }
        Ok(())
    }

    fn n_features(&self) -> usize {
        self.coefficients.first().map(|row| row.len()).unwrap_or(0)
    }

    fn scores(&self, features: &[f64]) -> Features {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                intercept + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
            })
            .collect()
    }
}

/// Multi-output ordinary least squares
#[derive(Debug, Clone)]
pub struct LinearRegression {
    model: LinearModel,
}

impl LinearRegression {
    pub fn new(model: LinearModel, n_features: usize) -> Result<Self, String> {
        model.validate(n_features)?;
        Ok(Self { model })
    }
}

impl Predictor for LinearRegression {
    fn technique(&self) -> &'static str {
        "linear_regression"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Regression
    }

    fn n_features(&self) -> usize {
        self.model.n_features()
    }

    fn n_outputs(&self) -> usize {
        self.model.intercepts.len()
    }

    fn predict(&self, features: &[f64]) -> Prediction {
        Prediction::Values(self.model.scores(features))
    }
}

/// Multinomial logistic regression. The softmax is monotonic, so the class
/// with the highest linear score is the predicted class.
///
/// A single coefficient row is a binary model: class 1 when its score is
/// positive, class 0 otherwise.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    model: LinearModel,
}

impl LogisticRegression {
    pub fn new(model: LinearModel, n_features: usize) -> Result<Self, String> {
        model.validate(n_features)?;
        Ok(Self { model })
    }
}

impl Predictor for LogisticRegression {
    fn technique(&self) -> &'static str {
        "logistic_regression"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Classification
    }

    fn n_features(&self) -> usize {
        self.model.n_features()
    }

    fn n_outputs(&self) -> usize {
        self.model.intercepts.len().max(2)
    }

    fn predict(&self, features: &[f64]) -> Prediction {
        let scores = self.model.scores(features);
        match scores.as_slice() {
            [score] => Prediction::Class(i64::from(*score > 0.0)),
            _ => Prediction::Class(argmax(&scores)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_output_model() -> LinearModel {
        LinearModel {
            coefficients: vec![vec![0.5, 0.1, 0.01], vec![0.0, 2.0, -0.5]],
            intercepts: vec![1.0, 40.0],
        }
    }

    #[test]
    fn test_linear_regression_outputs() {
        let reg = LinearRegression::new(two_output_model(), 3).unwrap();
        let Prediction::Values(values) = reg.predict(&[2.0, 1.0, 100.0]) else {
            panic!("expected values");
        };
        assert_eq!(values.len(), 2);
        // 1.0 + 0.5*2 + 0.1*1 + 0.01*100
        assert_relative_eq!(values[0], 3.1, epsilon = 1e-12);
        // 40 + 2*1 - 0.5*100
        assert_relative_eq!(values[1], -8.0, epsilon = 1e-12);
        assert_eq!(reg.n_features(), 3);
        assert_eq!(reg.n_outputs(), 2);
    }

    #[test]
    fn test_logistic_regression_picks_highest_score() {
        let model = LinearModel {
            coefficients: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercepts: vec![0.0, 0.0, 5.0],
        };
        let clf = LogisticRegression::new(model, 2).unwrap();
        assert_eq!(clf.predict(&[3.0, 1.0]), Prediction::Class(0));
        assert_eq!(clf.predict(&[1.0, 3.0]), Prediction::Class(1));
        assert_eq!(clf.predict(&[0.0, 0.0]), Prediction::Class(2));
    }

    #[test]
    fn test_binary_logistic_single_row() {
        let model = LinearModel {
            coefficients: vec![vec![2.0, -1.0]],
            intercepts: vec![-0.5],
        };
        let clf = LogisticRegression::new(model, 2).unwrap();
        assert_eq!(clf.n_outputs(), 2);
        assert_eq!(clf.predict(&[1.0, 0.0]), Prediction::Class(1));
        assert_eq!(clf.predict(&[0.0, 1.0]), Prediction::Class(0));
        // Zero score falls to the negative class
        assert_eq!(clf.predict(&[0.25, 0.0]), Prediction::Class(0));
    }

    #[test]
    fn test_validation_rejects_wrong_width() {
        assert!(LinearRegression::new(two_output_model(), 2).is_err());

        let mismatched = LinearModel {
            coefficients: vec![vec![1.0]],
            intercepts: vec![0.0, 1.0],
        };
        assert!(LinearRegression::new(mismatched, 1).is_err());

        let empty = LinearModel { coefficients: vec![], intercepts: vec![] };
        assert!(LogisticRegression::new(empty, 0).is_err());
    }
}
