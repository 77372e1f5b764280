// Axum API Server Module
//
// Purpose: HTTP surface over the prediction pipelines (yield, best time, soil
// health), market profit and GPS reverse geocoding.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use rayon::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::error::PredictionError;
use crate::geocode::{GpsRequest, NominatimGeocoder, ReverseGeocoder};
use crate::model::ModelRegistry;
use crate::pipelines::{
    calc_market, BestTimePipeline, BestTimeRequest, MarketRequest, SoilHealthPipeline, SoilReport,
    SoilRequest, YieldPipeline, YieldPrediction, YieldRequest,
};

/// Upper bound on requests per batch call
const MAX_BATCH_SIZE: usize = 1_000;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub models: ModelRegistry,
    pub yield_pipeline: YieldPipeline,
    pub best_time: BestTimePipeline,
    pub soil: SoilHealthPipeline,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub cache: Cache<String, Value>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let models = ModelRegistry::load(&config.models);

        tracing::info!("Initializing geocoder ({})...", config.nominatim_url);
        let geocoder = Arc::new(NominatimGeocoder::new(&config.nominatim_url)?);

        Ok(Self::from_parts(
            models,
            geocoder,
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        ))
    }

    /// Wire pipelines over already-loaded models
    pub fn from_parts(
        models: ModelRegistry,
        geocoder: Arc<dyn ReverseGeocoder>,
        cache_capacity: u64,
        cache_ttl: Duration,
    ) -> Self {
        let best_time = BestTimePipeline::new(models.best_time.clone());
        let yield_pipeline = YieldPipeline::new(models.yield_model.clone(), best_time.clone());
        let soil = SoilHealthPipeline::new(models.soil.clone());

        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Self {
            models,
            yield_pipeline,
            best_time,
            soil,
            geocoder,
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))

        // Prediction endpoints
        .route("/predict-yield/batch", post(predict_yield_batch))
        .route("/predict-yield", post(predict_yield))
        .route("/best-time", post(predict_best_time))
        .route("/soil-health", post(soil_health))

        // GPS to state
        .route("/get-state", post(get_state_from_gps))

        // Market
        .route("/api/v1/market/profit", post(market_profit))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "AgroSense Unified Backend is running" }))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let models: Vec<_> = state.models.adapters().iter().map(|a| a.status()).collect();
    let status = if models.iter().all(|m| m.available) { "healthy" } else { "degraded" };

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "models": models,
    }))
}

async fn predict_yield(
    State(state): State<AppState>,
    Json(payload): Json<YieldRequest>,
) -> Result<Json<Value>, AppError> {
    let cache_key = format!("yield:{:?}", payload);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for yield prediction");
        return Ok(Json(cached));
    }

    let prediction = state.yield_pipeline.run(&payload)?;
    let response = yield_response(&payload, &prediction);

    state.cache.insert(cache_key, response.clone()).await;
    Ok(Json(response))
}

/// Batch yield prediction. Items fail independently: a bad row yields an
/// `{"error": ...}` entry instead of failing the batch.
async fn predict_yield_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchYieldRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.requests.len() > MAX_BATCH_SIZE {
        return Err(PredictionError::malformed(format!(
            "batch size {} exceeds limit of {}",
            payload.requests.len(),
            MAX_BATCH_SIZE
        ))
        .into());
    }

    tracing::info!("Predicting yield for batch of {} requests", payload.requests.len());

    // CPU-bound work: run in blocking thread pool
    let pipeline = state.yield_pipeline.clone();
    let data = tokio::task::spawn_blocking(move || {
        payload
            .requests
            .par_iter()
            .map(|request| match pipeline.run(request) {
                Ok(prediction) => yield_response(request, &prediction),
                Err(e) => json!({ "error": e.to_string() }),
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

    Ok(Json(json!({
        "rows": data.len(),
        "data": data,
    })))
}

async fn predict_best_time(
    State(state): State<AppState>,
    Json(payload): Json<BestTimeRequest>,
) -> Result<Json<Value>, AppError> {
    let best_time = state.best_time.run(&payload)?;
    Ok(Json(json!({
        "crop": payload.crop,
        "state": payload.state,
        "best_time": best_time,
    })))
}

async fn soil_health(
    State(state): State<AppState>,
    Json(payload): Json<SoilRequest>,
) -> Result<Json<Value>, AppError> {
    let report = state.soil.run(&payload)?;
    Ok(Json(soil_response(&payload, &report)))
}

async fn get_state_from_gps(
    State(state): State<AppState>,
    Json(payload): Json<GpsRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    // Cache the place name only; nearby coordinates share an entry
    let cache_key = payload.cache_key();
    let place = match state.cache.get(&cache_key).await {
        Some(Value::String(cached)) => {
            tracing::debug!("Cache hit for reverse geocoding");
            cached
        }
        _ => {
            let place = state.geocoder.reverse(payload.lat, payload.lon).await?;
            state.cache.insert(cache_key, Value::String(place.clone())).await;
            place
        }
    };

    Ok(Json(json!({
        "lat": payload.lat,
        "lon": payload.lon,
        "state": place,
    })))
}

async fn market_profit(Json(payload): Json<MarketRequest>) -> Result<Json<Value>, AppError> {
    let outcome = calc_market(&payload)?;
    Ok(Json(json!(outcome)))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Deserialize, Debug)]
struct BatchYieldRequest {
    requests: Vec<YieldRequest>,
}

fn yield_response(request: &YieldRequest, prediction: &YieldPrediction) -> Value {
    json!({
        "crop": request.crop,
        "state": request.state,
        "area_ha": request.area,
        "fertilizer_used_kg_per_ha": request.fertilizer_used,
        "yield_metric_tons": prediction.yield_tons,
        "extra_needed_fertilizer_kg_per_ha": prediction.extra_fertilizer_per_ha,
        "best_time": prediction.best_time,
    })
}

fn soil_response(request: &SoilRequest, report: &SoilReport) -> Value {
    json!({
        "soil_type": request.soil_type,
        "location": request.location,
        "used_NPK_from_farmer": report.used_from_caller,
        "N_ppm": report.n_ppm,
        "P_ppm": report.p_ppm,
        "K_ppm": report.k_ppm,
        "SHI": report.requirements.shi,
        "Needed_N_Fertilizer": report.requirements.needed_n,
        "Needed_P_Fertilizer": report.requirements.needed_p,
        "Needed_K_Fertilizer": report.requirements.needed_k,
    })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Prediction(PredictionError),
    Internal(String),
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        AppError::Prediction(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Prediction(err) => {
                let status = match &err {
                    PredictionError::UnknownCategory { .. } | PredictionError::MalformedRequest(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    PredictionError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    PredictionError::GeocodeFailed(_) => StatusCode::BAD_GATEWAY,
                    PredictionError::InvalidCode { .. } | PredictionError::ModelOutput { .. } => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    tracing::warn!("Prediction failed: {}", err);
                }
                (status, err.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
