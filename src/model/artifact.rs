//! Model artifact files
//!
//! An artifact bundles a fitted estimator with the category tables used to
//! encode its inputs and, for classifiers, decode its output. Artifacts are
//! JSON documents produced by the training side:
//!
//! ```json
//! {
//!   "name": "best_time",
//!   "features": ["Crop", "State"],
//!   "outputs": ["Best_time"],
//!   "input_categories": { "Crop": ["Rice", "Wheat"], "State": ["Punjab"] },
//!   "output_categories": { "Best_time": ["Kharif", "Rabi"] },
//!   "estimator": { "kind": "logistic_regression", "coefficients": [[..], [..]], "intercepts": [..] }
//! }
//! ```
//!
//! Classifiers must carry an output table for their single output. A binary
//! logistic model may be exported with one coefficient row (scikit-learn's
//! layout); it then needs a two-label output table.

use super::forest::{Forest, RandomForestClassifier, RandomForestRegressor};
use super::linear::{LinearModel, LinearRegression, LogisticRegression};
use super::{Predictor, PredictorKind};
use crate::codec::CategoryTables;
use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Serialized estimator parameters, one variant per technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LinearRegression(LinearModel),
    LogisticRegression(LinearModel),
    RandomForestRegressor(Forest),
    RandomForestClassifier(Forest),
}

impl Estimator {
    /// Validate parameters against the declared feature width and build the predictor
    pub fn into_predictor(self, n_features: usize) -> Result<Arc<dyn Predictor>, String> {
        Ok(match self {
            Estimator::LinearRegression(m) => Arc::new(LinearRegression::new(m, n_features)?),
            Estimator::LogisticRegression(m) => Arc::new(LogisticRegression::new(m, n_features)?),
            Estimator::RandomForestRegressor(f) => Arc::new(RandomForestRegressor::new(f, n_features)?),
            Estimator::RandomForestClassifier(f) => Arc::new(RandomForestClassifier::new(f, n_features)?),
        })
    }
}

/// On-disk artifact layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub name: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub input_categories: CategoryTables,
    #[serde(default)]
    pub output_categories: CategoryTables,
    pub estimator: Estimator,
}

/// A loaded, validated artifact. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub name: String,
    pub features: Vec<String>,
    pub outputs: Vec<String>,
    pub input_categories: CategoryTables,
    pub output_categories: CategoryTables,
    pub predictor: Arc<dyn Predictor>,
}

impl ModelArtifact {
    /// Wrap an already-built predictor (used for stubs and tooling)
    pub fn new(
        name: &str,
        features: Vec<String>,
        outputs: Vec<String>,
        input_categories: CategoryTables,
        output_categories: CategoryTables,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            name: name.to_string(),
            features,
            outputs,
            input_categories,
            output_categories,
            predictor,
        }
    }

    /// Read and validate an artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: ArtifactFile = serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_file(file)
    }

    pub fn from_file(file: ArtifactFile) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            name: file.name.clone(),
            reason,
        };

        if file.features.is_empty() {
            return Err(invalid("artifact declares no features".to_string()));
        }

        let predictor = file
            .estimator
            .into_predictor(file.features.len())
            .map_err(invalid)?;

        match predictor.kind() {
            PredictorKind::Regression => {
                if !file.outputs.is_empty() && file.outputs.len() != predictor.n_outputs() {
                    return Err(invalid(format!(
                        "{} output names for {} regression outputs",
                        file.outputs.len(),
                        predictor.n_outputs()
                    )));
                }
            }
            PredictorKind::Classification => {
                if file.outputs.len() != 1 {
                    return Err(invalid("classifier must declare exactly one output".to_string()));
                }
                let table = file.output_categories.column(&file.outputs[0]).ok_or_else(|| {
                    invalid(format!("classifier has no output table for '{}'", file.outputs[0]))
                })?;
                if table.len() != predictor.n_outputs() {
                    return Err(invalid(format!(
                        "output table '{}' has {} labels for {} classes",
                        file.outputs[0],
                        table.len(),
                        predictor.n_outputs()
                    )));
                }
            }
        }

        Ok(Self {
            name: file.name,
            features: file.features,
            outputs: file.outputs,
            input_categories: file.input_categories,
            output_categories: file.output_categories,
            predictor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Prediction;

    const BEST_TIME: &str = r#"{
        "name": "best_time",
        "features": ["Crop", "State"],
        "outputs": ["Best_time"],
        "input_categories": {"Crop": ["Rice", "Wheat"], "State": ["Punjab", "Bihar"]},
        "output_categories": {"Best_time": ["Kharif", "Rabi"]},
        "estimator": {
            "kind": "logistic_regression",
            "coefficients": [[-1.0, 0.0], [1.0, 0.0]],
            "intercepts": [0.5, 0.0]
        }
    }"#;

    #[test]
    fn test_parse_classifier_artifact() {
        let file: ArtifactFile = serde_json::from_str(BEST_TIME).unwrap();
        let artifact = ModelArtifact::from_file(file).unwrap();
        assert_eq!(artifact.predictor.technique(), "logistic_regression");
        assert_eq!(artifact.predictor.kind(), PredictorKind::Classification);
        assert_eq!(artifact.predictor.predict(&[0.0, 0.0]), Prediction::Class(0));
        assert_eq!(artifact.predictor.predict(&[1.0, 0.0]), Prediction::Class(1));
        assert_eq!(artifact.input_categories.encode("Wheat", "Crop").unwrap(), 1);
    }

    #[test]
    fn test_output_table_must_match_class_count() {
        let mut file: ArtifactFile = serde_json::from_str(BEST_TIME).unwrap();
        file.output_categories = CategoryTables::new()
            .with_column("Best_time", vec!["Kharif", "Rabi", "Zaid"])
            .unwrap();
        let err = ModelArtifact::from_file(file).unwrap_err();
        assert!(err.to_string().contains("3 labels for 2 classes"));
    }

    #[test]
    fn test_classifier_requires_output_table() {
        let mut file: ArtifactFile = serde_json::from_str(BEST_TIME).unwrap();
        file.output_categories = CategoryTables::new();
        let err = ModelArtifact::from_file(file).unwrap_err();
        assert!(err.to_string().contains("no output table for 'Best_time'"));

        let mut file: ArtifactFile = serde_json::from_str(BEST_TIME).unwrap();
        file.outputs = vec!["Season".to_string()];
        assert!(ModelArtifact::from_file(file).is_err());
    }

    #[test]
    fn test_regression_output_names_checked() {
        let json = r#"{
            "name": "soil",
            "features": ["Soil_Type", "State"],
            "outputs": ["N", "P"],
            "estimator": {"kind": "linear_regression", "coefficients": [[1, 0], [0, 1], [1, 1]], "intercepts": [0, 0, 0]}
        }"#;
        let file: ArtifactFile = serde_json::from_str(json).unwrap();
        assert!(ModelArtifact::from_file(file).is_err());
    }

    #[test]
    fn test_unknown_estimator_kind_is_parse_error() {
        let json = r#"{"name": "x", "features": ["a"], "estimator": {"kind": "svm"}}"#;
        assert!(serde_json::from_str::<ArtifactFile>(json).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelArtifact::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
