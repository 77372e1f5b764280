//! Model Adapter - availability-aware wrapper around one artifact
//!
//! Loading never fails the process. A missing or broken artifact leaves the
//! adapter in an unavailable state; every request against it then fails with
//! `ModelUnavailable` while the rest of the service keeps working.

use super::{Features, ModelArtifact, Prediction, PredictorKind};
use crate::error::{PredictionError, PredictionResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum AdapterState {
    Ready(ModelArtifact),
    Unavailable(String),
}

/// Availability report for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AdapterStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PredictorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
pub struct ModelAdapter {
    name: String,
    source: Option<PathBuf>,
    state: AdapterState,
}

impl ModelAdapter {
    /// Load an artifact from disk, downgrading any failure to the unavailable state
    pub fn load(name: &str, path: &Path) -> Self {
        let state = match ModelArtifact::load(path) {
            Ok(artifact) => {
                tracing::info!(
                    "Loaded {} model from {:?} ({}, {} features)",
                    name,
                    path,
                    artifact.predictor.technique(),
                    artifact.features.len()
                );
                AdapterState::Ready(artifact)
            }
            Err(e) => {
                tracing::warn!("{} model unavailable, predictions will fail: {}", name, e);
                AdapterState::Unavailable(e.to_string())
            }
        };

        Self {
            name: name.to_string(),
            source: Some(path.to_path_buf()),
            state,
        }
    }

    /// Downgrade to unavailable unless the artifact's first output is `column`
    pub fn require_output(self, column: &str) -> Self {
        let mismatch = match &self.state {
            AdapterState::Ready(artifact) if artifact.outputs.first().map(String::as_str) != Some(column) => Some(
                format!("artifact '{}' does not predict '{}' (outputs: {:?})", artifact.name, column, artifact.outputs),
            ),
            _ => None,
        };
        let Some(reason) = mismatch else {
            return self;
        };
        tracing::warn!("{} model unavailable, predictions will fail: {}", self.name, reason);
        Self {
            state: AdapterState::Unavailable(reason),
            ..self
        }
    }

    pub fn ready(name: &str, artifact: ModelArtifact) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            state: AdapterState::Ready(artifact),
        }
    }

    pub fn unavailable(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            state: AdapterState::Unavailable(reason.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, AdapterState::Ready(_))
    }

    pub fn status(&self) -> AdapterStatus {
        let (technique, kind, reason) = match &self.state {
            AdapterState::Ready(a) => (Some(a.predictor.technique()), Some(a.predictor.kind()), None),
            AdapterState::Unavailable(r) => (None, None, Some(r.clone())),
        };
        AdapterStatus {
            name: self.name.clone(),
            available: self.is_available(),
            source: self.source.as_ref().map(|p| p.display().to_string()),
            technique,
            kind,
            reason,
        }
    }

    pub fn artifact(&self) -> PredictionResult<&ModelArtifact> {
        match &self.state {
            AdapterState::Ready(artifact) => Ok(artifact),
            AdapterState::Unavailable(reason) => Err(PredictionError::ModelUnavailable {
                model: self.name.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// Encode an input label with this artifact's own tables
    pub fn encode(&self, label: &str, column: &str) -> PredictionResult<usize> {
        self.artifact()?.input_categories.encode(label, column)
    }

    /// Decode a class code with this artifact's output tables
    pub fn decode(&self, code: i64, column: &str) -> PredictionResult<String> {
        self.artifact()?
            .output_categories
            .decode(code, column)
            .map(str::to_string)
    }

    pub fn predict(&self, features: &[f64]) -> PredictionResult<Prediction> {
        let artifact = self.artifact()?;
        let expected = artifact.predictor.n_features();
        if features.len() != expected {
            return Err(PredictionError::model_output(
                &self.name,
                format!("expected {} features, got {}", expected, features.len()),
            ));
        }
        Ok(artifact.predictor.predict(features))
    }

    /// Regression output with at least `min_len` values
    pub fn predict_values(&self, features: &[f64], min_len: usize) -> PredictionResult<Features> {
        match self.predict(features)? {
            Prediction::Values(values) if values.len() >= min_len => Ok(values),
            Prediction::Values(values) => Err(PredictionError::model_output(
                &self.name,
                format!("expected {} outputs, got {}", min_len, values.len()),
            )),
            Prediction::Class(_) => Err(PredictionError::model_output(
                &self.name,
                "expected regression outputs, got a class code",
            )),
        }
    }

    pub fn predict_class(&self, features: &[f64]) -> PredictionResult<i64> {
        match self.predict(features)? {
            Prediction::Class(code) => Ok(code),
            Prediction::Values(_) => Err(PredictionError::model_output(
                &self.name,
                "expected a class code, got regression outputs",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CategoryTables;
    use crate::model::{LinearModel, LinearRegression, LogisticRegression};
    use std::sync::Arc;

    fn linear_adapter() -> ModelAdapter {
        let predictor = LinearRegression::new(
            LinearModel {
                coefficients: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                intercepts: vec![0.0, 0.0],
            },
            2,
        )
        .unwrap();
        let tables = CategoryTables::new().with_column("Crop", vec!["Rice"]).unwrap();
        let artifact = ModelArtifact::new(
            "test",
            vec!["Crop".into(), "Fertilizer".into()],
            vec![],
            tables,
            CategoryTables::new(),
            Arc::new(predictor),
        );
        ModelAdapter::ready("Test", artifact)
    }

    #[test]
    fn test_unavailable_adapter_fails_every_call() {
        let adapter = ModelAdapter::unavailable("Yield", "file not found");
        assert!(!adapter.is_available());
        assert!(matches!(
            adapter.predict(&[1.0]),
            Err(PredictionError::ModelUnavailable { .. })
        ));
        assert!(matches!(
            adapter.encode("Rice", "Crop"),
            Err(PredictionError::ModelUnavailable { .. })
        ));
        let status = adapter.status();
        assert!(!status.available);
        assert_eq!(status.reason.as_deref(), Some("file not found"));
    }

    #[test]
    fn test_load_missing_file_is_not_fatal() {
        let adapter = ModelAdapter::load("Soil", Path::new("/nonexistent/soil_model.json"));
        assert!(!adapter.is_available());
        assert_eq!(adapter.status().source.as_deref(), Some("/nonexistent/soil_model.json"));
    }

    #[test]
    fn test_require_output_column() {
        let adapter = linear_adapter();
        assert!(!adapter.require_output("Best_time").is_available());

        let tables = CategoryTables::new().with_column("Best_time", vec!["Kharif", "Rabi"]).unwrap();
        let artifact = ModelArtifact::new(
            "best_time",
            vec!["Crop".into(), "State".into()],
            vec!["Best_time".into()],
            CategoryTables::new(),
            tables,
            Arc::new(
                LogisticRegression::new(
                    LinearModel {
                        coefficients: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                        intercepts: vec![0.0, 0.0],
                    },
                    2,
                )
                .unwrap(),
            ),
        );
        let adapter = ModelAdapter::ready("Best time", artifact).require_output("Best_time");
        assert!(adapter.is_available());

        let unavailable = ModelAdapter::unavailable("Best time", "file not found").require_output("Best_time");
        assert_eq!(unavailable.status().reason.as_deref(), Some("file not found"));
    }

    #[test]
    fn test_feature_width_checked() {
        let adapter = linear_adapter();
        assert!(matches!(
            adapter.predict(&[1.0]),
            Err(PredictionError::ModelOutput { .. })
        ));
        assert_eq!(adapter.predict_values(&[3.0, 4.0], 2).unwrap().as_slice(), &[3.0, 4.0]);
    }

    #[test]
    fn test_output_shape_checked() {
        let adapter = linear_adapter();
        assert!(adapter.predict_values(&[1.0, 1.0], 3).is_err());
        assert!(adapter.predict_class(&[1.0, 1.0]).is_err());
    }
}
