use std::time::Duration;

use crate::config::{env_var, parse_env_var, ConfigError};
use crate::extract::ResponseFormat;
use crate::retry::RetryPolicy;
use crate::types::{Coordinates, FALLBACK_COORDINATES};

/// Sampling temperature per whole-pipeline attempt, highest first.
pub const DEFAULT_TEMPERATURES: [f32; 3] = [0.7, 0.5, 0.3];

pub const DEFAULT_CITY: &str = "Moscow";

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(180);

pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Pipeline settings. One whole-pipeline attempt is made per temperature.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub temperatures: Vec<f32>,
    /// Retry policy for a single provider call (and the credential probe).
    pub provider_retry: RetryPolicy,
    pub format: ResponseFormat,
    /// Qualifier prepended to geocoder queries and shown to the model.
    pub city: String,
    pub fallback: Coordinates,
    /// Probe the credential before each JSON-format attempt.
    pub probe_credential: bool,
    /// Wall-clock limit for a whole request. None disables it.
    pub deadline: Option<Duration>,
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temperatures: DEFAULT_TEMPERATURES.to_vec(),
            provider_retry: RetryPolicy::default(),
            format: ResponseFormat::default(),
            city: DEFAULT_CITY.to_string(),
            fallback: FALLBACK_COORDINATES,
            probe_credential: true,
            deadline: Some(DEFAULT_DEADLINE),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `WANDER_CITY`: City the routes are planned in (default: "Moscow")
    /// - `WANDER_RESPONSE_FORMAT`: "json" or "tagged" (default: "json")
    /// - `WANDER_DEADLINE_SECS`: Request deadline, "0" disables it (default: 180)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(city) = env_var("WANDER_CITY") {
            config.city = city;
        }
        if let Some(format) = parse_env_var("WANDER_RESPONSE_FORMAT")? {
            config.format = format;
        }
        if let Some(secs) = parse_env_var::<u64>("WANDER_DEADLINE_SECS")? {
            config.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Temperatures to use, falling back to the default schedule when empty.
    pub fn temperature_schedule(&self) -> &[f32] {
        if self.temperatures.is_empty() {
            &DEFAULT_TEMPERATURES
        } else {
            &self.temperatures
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.temperature_schedule(), &[0.7, 0.5, 0.3]);
        assert_eq!(config.provider_retry.max_attempts, 3);
        assert_eq!(config.provider_retry.initial_delay, Duration::from_secs(1));
        assert_eq!(config.format, ResponseFormat::Json);
        assert_eq!(config.fallback, FALLBACK_COORDINATES);
        assert_eq!(config.deadline, Some(Duration::from_secs(180)));
    }

    #[test]
    fn test_empty_schedule_uses_default() {
        let config = PipelineConfig {
            temperatures: vec![],
            ..Default::default()
        };
        assert_eq!(config.temperature_schedule().len(), 3);
    }
}
