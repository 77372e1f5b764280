//! Market profit calculation

use crate::error::{PredictionError, PredictionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRequest {
    pub supply: f64,
    pub demand: f64,
    pub cost: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyStatus {
    Excess,
    Shortage,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketOutcome {
    pub profit: f64,
    pub supply_status: SupplyStatus,
}

/// Profit on the quantity that actually sells, `min(supply, demand)`
pub fn calc_market(request: &MarketRequest) -> PredictionResult<MarketOutcome> {
    let MarketRequest { supply, demand, cost, price } = *request;
    if ![supply, demand, cost, price].iter().all(|v| v.is_finite()) {
        return Err(PredictionError::malformed("market values must be finite numbers"));
    }
    if supply < 0.0 || demand < 0.0 {
        return Err(PredictionError::malformed("supply and demand must not be negative"));
    }

    let profit = (price - cost) * supply.min(demand);
    let supply_status = if supply > demand {
        SupplyStatus::Excess
    } else if supply < demand {
        SupplyStatus::Shortage
    } else {
        SupplyStatus::Balanced
    };

    tracing::info!(
        "Market calculation: profit={} status={:?} (supply={}, demand={}, cost={}, price={})",
        profit,
        supply_status,
        supply,
        demand,
        cost,
        price
    );

    Ok(MarketOutcome { profit, supply_status })
}
