//! Yield Pipeline
//!
//! normalize -> encode (yield tables) -> regress (yield/ha, optimum fertilizer)
//! -> area scaling and fertilizer gap -> best-time lookup -> round.

use super::best_time::{BestTimePipeline, CROP_COLUMN, STATE_COLUMN};
use super::normalize::{capitalize, title_case};
use super::round2;
use crate::error::{PredictionError, PredictionResult};
use crate::model::ModelAdapter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Yield multiplier applied when no fertilizer is used
pub const UNFERTILIZED_PENALTY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRequest {
    pub crop: String,
    pub state: String,
    /// Hectares
    pub area: f64,
    /// kg/hectare
    pub fertilizer_used: f64,
}

impl YieldRequest {
    pub fn validate(&self) -> PredictionResult<()> {
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(PredictionError::malformed("area must be a positive number of hectares"));
        }
        if !self.fertilizer_used.is_finite() || self.fertilizer_used < 0.0 {
            return Err(PredictionError::malformed("fertilizer_used must be zero or positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldPrediction {
    /// Normalized labels the models were queried with
    pub crop: String,
    pub state: String,
    pub yield_tons: f64,
    pub extra_fertilizer_per_ha: f64,
    pub best_time: String,
}

/// Total yield for the area, with the unfertilized penalty
pub fn scaled_yield(yield_per_ha: f64, area: f64, fertilizer_used: f64) -> f64 {
    if fertilizer_used == 0.0 {
        UNFERTILIZED_PENALTY * yield_per_ha * area
    } else {
        yield_per_ha * area
    }
}

/// Fertilizer still needed per hectare; never negative
pub fn extra_fertilizer(optimum_fertilizer: f64, fertilizer_used: f64) -> f64 {
    (optimum_fertilizer - fertilizer_used).max(0.0)
}

#[derive(Debug, Clone)]
pub struct YieldPipeline {
    model: Arc<ModelAdapter>,
    best_time: BestTimePipeline,
}

impl YieldPipeline {
    pub fn new(model: Arc<ModelAdapter>, best_time: BestTimePipeline) -> Self {
        Self { model, best_time }
    }

    pub fn run(&self, request: &YieldRequest) -> PredictionResult<YieldPrediction> {
        request.validate()?;

        let crop = capitalize(&request.crop);
        let state = title_case(&request.state);

        let crop_code = self.model.encode(&crop, CROP_COLUMN)?;
        let state_code = self.model.encode(&state, STATE_COLUMN)?;
        let outputs = self
            .model
            .predict_values(&[crop_code as f64, state_code as f64, request.fertilizer_used], 2)?;
        let (yield_per_ha, optimum_fertilizer) = (outputs[0], outputs[1]);

        let yield_tons = scaled_yield(yield_per_ha, request.area, request.fertilizer_used);
        let extra = extra_fertilizer(optimum_fertilizer, request.fertilizer_used);
        if !yield_tons.is_finite() || !extra.is_finite() {
            return Err(PredictionError::model_output(
                self.model.name(),
                format!("non-finite result (yield {}, extra fertilizer {})", yield_tons, extra),
            ));
        }

        let best_time = self.best_time.predict(&crop, &state)?;

        tracing::debug!(
            "Yield for {} in {}: {:.2} t over {} ha (extra fertilizer {:.2} kg/ha)",
            crop,
            state,
            yield_tons,
            request.area,
            extra
        );

        Ok(YieldPrediction {
            crop,
            state,
            yield_tons: round2(yield_tons),
            extra_fertilizer_per_ha: round2(extra),
            best_time,
        })
    }
}
