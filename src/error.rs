//! Error types shared by the codec, model adapters and pipelines.
//!
//! Every variant is request-scoped: a failed prediction never poisons shared
//! state, and nothing here is retried.

use thiserror::Error;

/// Failure of a single prediction request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    /// Label not present in the column's category table
    #[error("Unknown category '{label}' for column '{column}'")]
    UnknownCategory { label: String, column: String },

    /// Class code outside `[0, len)` of the output table
    #[error("Unknown category code '{code}' for column '{column}'")]
    InvalidCode { code: i64, column: String },

    /// Artifact failed to load at startup
    #[error("{model} prediction model not loaded: {reason}")]
    ModelUnavailable { model: String, reason: String },

    /// Required caller-supplied fields missing or out of range
    #[error("{0}")]
    MalformedRequest(String),

    /// Artifact produced an output of the wrong shape
    #[error("{model} model returned unexpected output: {detail}")]
    ModelOutput { model: String, detail: String },

    /// Reverse geocoding service failed or refused the request
    #[error("Failed to fetch location: {0}")]
    GeocodeFailed(String),
}

impl PredictionError {
    pub fn unknown_category(label: &str, column: &str) -> Self {
        Self::UnknownCategory {
            label: label.to_string(),
            column: column.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest(message.into())
    }

    pub fn model_output(model: &str, detail: impl Into<String>) -> Self {
        Self::ModelOutput {
            model: model.to_string(),
            detail: detail.into(),
        }
    }
}

/// Failure while reading or validating a model artifact file
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

pub type PredictionResult<T> = Result<T, PredictionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = PredictionError::unknown_category("Mango", "Crop");
        assert_eq!(err.to_string(), "Unknown category 'Mango' for column 'Crop'");

        let err = PredictionError::InvalidCode { code: 7, column: "Best_time".into() };
        assert_eq!(err.to_string(), "Unknown category code '7' for column 'Best_time'");

        let err = PredictionError::ModelUnavailable {
            model: "Yield".into(),
            reason: "file not found".into(),
        };
        assert!(err.to_string().starts_with("Yield prediction model not loaded"));
    }
}
