//! Best-Time Pipeline - planting window classification
//!
//! Uses the best-time artifact's own category tables; its codes are not
//! interchangeable with the yield artifact's.

use super::normalize::{capitalize, title_case};
use crate::error::PredictionResult;
use crate::model::ModelAdapter;
use serde::Deserialize;
use std::sync::Arc;

pub const CROP_COLUMN: &str = "Crop";
pub const STATE_COLUMN: &str = "State";
pub const BEST_TIME_COLUMN: &str = "Best_time";

#[derive(Debug, Clone, Deserialize)]
pub struct BestTimeRequest {
    pub crop: String,
    pub state: String,
}

#[derive(Debug, Clone)]
pub struct BestTimePipeline {
    model: Arc<ModelAdapter>,
}

impl BestTimePipeline {
    pub fn new(model: Arc<ModelAdapter>) -> Self {
        Self { model }
    }

    /// Classify already-normalized crop/state labels into a planting window
    pub fn predict(&self, crop: &str, state: &str) -> PredictionResult<String> {
        let crop_code = self.model.encode(crop, CROP_COLUMN)?;
        let state_code = self.model.encode(state, STATE_COLUMN)?;
        let code = self.model.predict_class(&[crop_code as f64, state_code as f64])?;
        let label = self.model.decode(code, BEST_TIME_COLUMN)?;
        tracing::debug!("Best time for {} in {}: {}", crop, state, label);
        Ok(label)
    }

    /// Normalize raw caller labels, then classify
    pub fn run(&self, request: &BestTimeRequest) -> PredictionResult<String> {
        self.predict(&capitalize(&request.crop), &title_case(&request.state))
    }
}
