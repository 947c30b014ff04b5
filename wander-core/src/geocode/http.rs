//! HTTP geocoder speaking the Yandex Geocoder JSON format.

use super::{GeocodeError, Geocoder, GeocoderConfig};
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    response: GeocoderBody,
}

#[derive(Debug, Deserialize)]
struct GeocoderBody {
    #[serde(rename = "GeoObjectCollection")]
    collection: FeatureCollection,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "featureMember", default)]
    members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "Point")]
    point: Point,
}

/// `pos` is "longitude latitude", space separated.
#[derive(Debug, Deserialize)]
struct Point {
    pos: String,
}

/// Parse a geocoder response body into the first match, `(lon, lat)`.
pub fn parse_geocoder_response(body: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
    let response: GeocoderResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let Some(first) = response.response.collection.members.into_iter().next() else {
        return Ok(None);
    };

    let pos = first.geo_object.point.pos;
    let mut parts = pos.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(lon)), Some(Ok(lat)), None) => Ok(Some((lon, lat))),
        _ => Err(GeocodeError::InvalidResponse(format!(
            "Malformed point: {:?}",
            pos
        ))),
    }
}

/// Map a non-success status to an error, passing successful bodies through.
fn check_status(status: StatusCode, body: String) -> Result<String, GeocodeError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GeocodeError::Unauthorized(body));
    }

    if !status.is_success() {
        return Err(GeocodeError::Http {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(body)
}

/// Production geocoder with per-host rate limiting.
pub struct YandexGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
    rate_limiter: RateLimiter,
    host: Option<String>,
}

impl YandexGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let host = url::Url::parse(&config.base_url)
            .map_err(|e| GeocodeError::Request(format!("Invalid geocoder URL: {}", e)))?
            .host_str()
            .map(str::to_string);

        let rate_limiter = RateLimiter::from_millis(config.rate_limit_ms);

        Ok(Self {
            client,
            config,
            rate_limiter,
            host,
        })
    }
}

#[async_trait]
impl Geocoder for YandexGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
        if let Some(host) = &self.host {
            self.rate_limiter.wait(host).await;
        }

        tracing::debug!(query, "geocoder: looking up place");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("apikey", self.config.api_key.as_str()),
                ("geocode", query),
                ("format", "json"),
                ("results", "1"),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let body = check_status(status, body)?;
        parse_geocoder_response(&body)
    }
}
