//! The three service models, loaded once at process start
//!
//! The registry is built from explicit paths and handed to the pipelines; no
//! pipeline reaches for global model state.

use super::ModelAdapter;
use crate::config::ModelPaths;
use crate::pipelines::best_time::BEST_TIME_COLUMN;
use std::sync::Arc;

pub const YIELD_MODEL: &str = "Yield";
pub const BEST_TIME_MODEL: &str = "Best time";
pub const SOIL_MODEL: &str = "Soil";

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    pub yield_model: Arc<ModelAdapter>,
    pub best_time: Arc<ModelAdapter>,
    pub soil: Arc<ModelAdapter>,
}

impl ModelRegistry {
    pub fn load(paths: &ModelPaths) -> Self {
        tracing::info!("Loading model artifacts...");
        let registry = Self {
            yield_model: Arc::new(ModelAdapter::load(YIELD_MODEL, &paths.yield_model)),
            best_time: Arc::new(
                ModelAdapter::load(BEST_TIME_MODEL, &paths.best_time_model).require_output(BEST_TIME_COLUMN),
            ),
            soil: Arc::new(ModelAdapter::load(SOIL_MODEL, &paths.soil_model)),
        };
        let available = registry.adapters().iter().filter(|a| a.is_available()).count();
        tracing::info!("{}/3 models available", available);
        registry
    }

    pub fn new(yield_model: ModelAdapter, best_time: ModelAdapter, soil: ModelAdapter) -> Self {
        Self {
            yield_model: Arc::new(yield_model),
            best_time: Arc::new(best_time),
            soil: Arc::new(soil),
        }
    }

    pub fn adapters(&self) -> [&ModelAdapter; 3] {
        [self.yield_model.as_ref(), self.best_time.as_ref(), self.soil.as_ref()]
    }
}
