//! Geocoding of stage names.
//!
//! The [`Geocoder`] trait abstracts the lookup service. Providers answer in
//! `(longitude, latitude)` order; the enricher flips that into the
//! `(lat, lon)` order used everywhere else.
//!
//! # Configuration
//!
//! - `WANDER_GEOCODER_API_KEY` (optional): enables geocoding when set
//! - `WANDER_GEOCODER_BASE_URL` (optional): service URL
//! - `WANDER_GEOCODER_RATE_LIMIT_MS` (optional): delay between requests in ms

mod enrich;
mod http;
mod mock;

pub use enrich::{enrich_stages, geocode_stage, GeocodingStats};
pub use http::{parse_geocoder_response, YandexGeocoder};
pub use mock::{MockGeocoder, MockPlace};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::{env_var, parse_env_var, ConfigError};

/// Default geocoder endpoint.
pub const DEFAULT_GEOCODER_URL: &str = "https://geocode-maps.yandex.ru/1.x";

/// Default delay between geocoder requests in milliseconds.
pub const DEFAULT_GEOCODER_RATE_LIMIT_MS: u64 = 200;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoder request failed: {0}")]
    Request(String),

    #[error("Geocoder rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Geocoder returned error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse geocoder response: {0}")]
    InvalidResponse(String),
}

/// Trait for geocoding services.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up a place by free-text query.
    ///
    /// Returns `Ok(None)` when nothing matched. A found point is in provider
    /// order: `(longitude, latitude)`.
    async fn lookup(&self, query: &str) -> Result<Option<(f64, f64)>, GeocodeError>;
}

/// Geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub base_url: String,
    pub rate_limit_ms: u64,
    pub timeout: Duration,
}

impl GeocoderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            rate_limit_ms: DEFAULT_GEOCODER_RATE_LIMIT_MS,
            timeout: Duration::from_secs(10),
        }
    }

    /// Load from the environment. `Ok(None)` means geocoding is not configured.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = env_var("WANDER_GEOCODER_API_KEY") else {
            return Ok(None);
        };

        let mut config = Self::new(api_key);
        if let Some(base_url) = env_var("WANDER_GEOCODER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(ms) = parse_env_var("WANDER_GEOCODER_RATE_LIMIT_MS")? {
            config.rate_limit_ms = ms;
        }

        Ok(Some(config))
    }
}
