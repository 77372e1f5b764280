//! AgroSense prediction backend
//!
//! Agricultural prediction service built on pre-trained model artifacts:
//! - `codec`: category label <-> code tables
//! - `model/`: predictor trait, estimator implementations, artifact loading
//! - `pipelines/`: yield, best time, soil health and market calculations
//! - `geocode`: GPS reverse geocoding
//! - `api_server`: Axum HTTP surface (feature `api`)

pub mod codec;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod pipelines;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use codec::{CategoryTable, CategoryTables};
pub use config::{ModelPaths, ServerConfig};
pub use error::{ArtifactError, PredictionError, PredictionResult};
pub use model::{ModelAdapter, ModelArtifact, ModelRegistry, Prediction, Predictor, PredictorKind};
pub use pipelines::{
    BestTimePipeline, SoilHealthPipeline, SoilReport, SoilRequest, YieldPipeline, YieldPrediction,
    YieldRequest,
};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
