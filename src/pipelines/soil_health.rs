//! Soil Health Pipeline
//!
//! N/P/K (ppm) come either from the caller or from the soil regression model.
//! Deficits and the Soil Health Index are then pure arithmetic against fixed
//! agronomic references.

use super::best_time::STATE_COLUMN;
use super::round2;
use crate::error::{PredictionError, PredictionResult};
use crate::model::ModelAdapter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SOIL_TYPE_COLUMN: &str = "Soil_Type";

/// ppm -> kg/ha conversion factor
pub const PPM_TO_KG_HA: f64 = 1.95;

/// Reference values for one nutrient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientReference {
    /// Target concentration (ppm)
    pub target: f64,
    /// Fraction of applied fertilizer taken up by the crop
    pub efficiency: f64,
    /// Normalization baseline and range for the health index
    pub baseline: f64,
    pub range: f64,
}

impl NutrientReference {
    /// Fertilizer (kg/ha) needed to lift `ppm` to the target
    pub fn needed(&self, ppm: f64) -> f64 {
        (self.target - ppm).max(0.0) * PPM_TO_KG_HA / self.efficiency
    }

    pub fn normalized(&self, ppm: f64) -> f64 {
        (ppm - self.baseline) / self.range
    }
}

pub const NITROGEN: NutrientReference = NutrientReference { target: 150.0, efficiency: 0.50, baseline: 50.0, range: 150.0 };
pub const PHOSPHORUS: NutrientReference = NutrientReference { target: 15.0, efficiency: 0.30, baseline: 5.0, range: 15.0 };
pub const POTASSIUM: NutrientReference = NutrientReference { target: 200.0, efficiency: 0.60, baseline: 50.0, range: 200.0 };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilRequest {
    pub soil_type: String,
    pub location: String,
    pub has_npk: bool,
    #[serde(default, alias = "N_ppm", alias = "N")]
    pub n_ppm: Option<f64>,
    #[serde(default, alias = "P_ppm", alias = "P")]
    pub p_ppm: Option<f64>,
    #[serde(default, alias = "K_ppm", alias = "K")]
    pub k_ppm: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilRequirements {
    pub shi: f64,
    pub needed_n: f64,
    pub needed_p: f64,
    pub needed_k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilReport {
    pub used_from_caller: bool,
    pub n_ppm: f64,
    pub p_ppm: f64,
    pub k_ppm: f64,
    pub requirements: SoilRequirements,
}

/// Soil Health Index and per-nutrient deficits, rounded to 2 decimals
pub fn calculate_soil_requirements(n_ppm: f64, p_ppm: f64, k_ppm: f64) -> SoilRequirements {
    let average = (NITROGEN.normalized(n_ppm) + PHOSPHORUS.normalized(p_ppm) + POTASSIUM.normalized(k_ppm)) / 3.0;

    SoilRequirements {
        shi: round2(average * 100.0),
        needed_n: round2(NITROGEN.needed(n_ppm)),
        needed_p: round2(PHOSPHORUS.needed(p_ppm)),
        needed_k: round2(POTASSIUM.needed(k_ppm)),
    }
}

#[derive(Debug, Clone)]
pub struct SoilHealthPipeline {
    model: Arc<ModelAdapter>,
}

impl SoilHealthPipeline {
    pub fn new(model: Arc<ModelAdapter>) -> Self {
        Self { model }
    }

    /// Predict (N, P, K) ppm for a soil type and location.
    ///
    /// Labels are matched exactly as sent (surrounding whitespace aside);
    /// casing is the caller's concern.
    pub fn predict_nutrients(&self, soil_type: &str, location: &str) -> PredictionResult<(f64, f64, f64)> {
        let soil_code = self.model.encode(soil_type.trim(), SOIL_TYPE_COLUMN)?;
        let state_code = self.model.encode(location.trim(), STATE_COLUMN)?;
        let npk = self.model.predict_values(&[soil_code as f64, state_code as f64], 3)?;
        Ok((npk[0], npk[1], npk[2]))
    }

    pub fn run(&self, request: &SoilRequest) -> PredictionResult<SoilReport> {
        let (n, p, k, used_from_caller) = if request.has_npk {
            match (request.n_ppm, request.p_ppm, request.k_ppm) {
                (Some(n), Some(p), Some(k)) => {
                    if ![n, p, k].iter().all(|v| v.is_finite()) {
                        return Err(PredictionError::malformed("N, P, K values must be finite numbers"));
                    }
                    (n, p, k, true)
                }
                _ => {
                    return Err(PredictionError::malformed(
                        "N, P, K values must be provided when has_npk=true",
                    ))
                }
            }
        } else {
            let (n, p, k) = self.predict_nutrients(&request.soil_type, &request.location)?;
            (n, p, k, false)
        };

        let requirements = calculate_soil_requirements(n, p, k);
        tracing::debug!(
            "Soil health for {} in {}: SHI {} (caller NPK: {})",
            request.soil_type,
            request.location,
            requirements.shi,
            used_from_caller
        );

        Ok(SoilReport {
            used_from_caller,
            n_ppm: round2(n),
            p_ppm: round2(p),
            k_ppm: round2(k),
            requirements,
        })
    }
}
