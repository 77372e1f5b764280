//! Prediction pipelines
//!
//! Each pipeline is a pure function of its request and the read-only model
//! adapters injected at construction:
//! - `crop_yield`: yield + fertilizer gap + planting window
//! - `best_time`: planting window classification
//! - `soil_health`: N/P/K resolution, Soil Health Index, fertilizer deficits
//! - `market`: profit and supply status (no model)

pub mod best_time;
pub mod crop_yield;
pub mod market;
pub mod normalize;
pub mod soil_health;

pub use best_time::{BestTimePipeline, BestTimeRequest};
pub use crop_yield::{YieldPipeline, YieldPrediction, YieldRequest};
pub use market::{calc_market, MarketOutcome, MarketRequest, SupplyStatus};
pub use normalize::{capitalize, title_case};
pub use soil_health::{calculate_soil_requirements, SoilHealthPipeline, SoilReport, SoilRequest, SoilRequirements};

/// Round to 2 decimal places (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
