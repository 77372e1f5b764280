//! Service configuration from environment variables
//!
//! Read once at startup. Unset or unparsable values fall back to defaults so
//! a bare `cargo run` works from the repository root.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Artifact locations for the three service models
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub yield_model: PathBuf,
    pub best_time_model: PathBuf,
    pub soil_model: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            yield_model: PathBuf::from("models/yield_model.json"),
            best_time_model: PathBuf::from("models/best_time_model.json"),
            soil_model: PathBuf::from("models/soil_model.json"),
        }
    }
}

impl ModelPaths {
    /// All three artifacts under one directory with the default file names
    pub fn in_dir(dir: &std::path::Path) -> Self {
        Self {
            yield_model: dir.join("yield_model.json"),
            best_time_model: dir.join("best_time_model.json"),
            soil_model: dir.join("soil_model.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub models: ModelPaths,
    pub nominatim_url: String,
    pub cache_capacity: u64,
    pub cache_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            models: ModelPaths::default(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            cache_capacity: 10_000,
            cache_ttl_secs: 300,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Self {
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(defaults.port),
            models: ModelPaths {
                yield_model: path("YIELD_MODEL", defaults.models.yield_model),
                best_time_model: path("BEST_TIME_MODEL", defaults.models.best_time_model),
                soil_model: path("SOIL_MODEL", defaults.models.soil_model),
            },
            nominatim_url: lookup("NOMINATIM_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.nominatim_url),
            cache_capacity: lookup("CACHE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            cache_ttl_secs: lookup("CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
        }
    }
}
