//! GPS reverse geocoding (coordinates -> state name)
//!
//! Backed by an OpenStreetMap Nominatim service. The HTTP client only exists
//! with the `api` feature; coordinate validation and response parsing are
//! plain functions.

use crate::error::{PredictionError, PredictionResult};
use serde::Deserialize;

/// Returned when the service has no state for the coordinates
pub const UNKNOWN_STATE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
pub struct GpsRequest {
    pub lat: f64,
    pub lon: f64,
}

impl GpsRequest {
    pub fn validate(&self) -> PredictionResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(PredictionError::malformed("lat must be between -90 and 90"));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(PredictionError::malformed("lon must be between -180 and 180"));
        }
        Ok(())
    }

    /// Cache key at ~11 m resolution
    pub fn cache_key(&self) -> String {
        format!("geocode:{:.4}:{:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimResponse {
    #[serde(default)]
    pub address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    #[serde(default)]
    pub state: Option<String>,
}

impl NominatimResponse {
    pub fn state(&self) -> String {
        self.address
            .as_ref()
            .and_then(|a| a.state.clone())
            .unwrap_or_else(|| UNKNOWN_STATE.to_string())
    }
}

#[cfg(feature = "api")]
pub use client::{NominatimGeocoder, ReverseGeocoder};

#[cfg(feature = "api")]
mod client {
    use super::NominatimResponse;
    use crate::error::{PredictionError, PredictionResult};
    use async_trait::async_trait;
    use std::time::Duration;

    const USER_AGENT: &str = "agrosense-app";

    #[async_trait]
    pub trait ReverseGeocoder: Send + Sync {
        async fn reverse(&self, lat: f64, lon: f64) -> PredictionResult<String>;
    }

    pub struct NominatimGeocoder {
        client: reqwest::Client,
        base_url: String,
    }

    impl NominatimGeocoder {
        pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(10))
                .build()?;
            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }
    }

    #[async_trait]
    impl ReverseGeocoder for NominatimGeocoder {
        async fn reverse(&self, lat: f64, lon: f64) -> PredictionResult<String> {
            let url = format!("{}/reverse", self.base_url);
            let response = self
                .client
                .get(&url)
                .query(&[("lat", lat.to_string()), ("lon", lon.to_string()), ("format", "json".to_string())])
                .send()
                .await
                .map_err(|e| PredictionError::GeocodeFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(PredictionError::GeocodeFailed(format!(
                    "geocoding service returned {}",
                    response.status()
                )));
            }

            let body: NominatimResponse = response
                .json()
                .await
                .map_err(|e| PredictionError::GeocodeFailed(e.to_string()))?;
            Ok(body.state())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(GpsRequest { lat: 19.07, lon: 72.87 }.validate().is_ok());
        assert!(GpsRequest { lat: 90.0, lon: -180.0 }.validate().is_ok());
        assert!(GpsRequest { lat: 91.0, lon: 0.0 }.validate().is_err());
        assert!(GpsRequest { lat: 0.0, lon: 180.5 }.validate().is_err());
        assert!(GpsRequest { lat: f64::NAN, lon: 0.0 }.validate().is_err());
    }

    #[test]
    fn test_state_from_response() {
        let body: NominatimResponse =
            serde_json::from_str(r#"{"address": {"state": "Maharashtra", "country": "India"}}"#).unwrap();
        assert_eq!(body.state(), "Maharashtra");

        let ocean: NominatimResponse = serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(ocean.state(), UNKNOWN_STATE);
    }

    #[test]
    fn test_cache_key_rounds() {
        let a = GpsRequest { lat: 19.076_01, lon: 72.877_71 };
        let b = GpsRequest { lat: 19.076_04, lon: 72.877_74 };
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
