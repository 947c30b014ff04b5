//! Environment variable helpers shared by the `from_env` constructors.

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// A set, non-empty variable.
pub(crate) fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn require_env_var(name: &str) -> Result<String, ConfigError> {
    env_var(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Parse a variable if it is set.
pub(crate) fn parse_env_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    env_var(name)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            })
        })
        .transpose()
}

/// "true" or "1" (any case for "true") enables a flag.
pub(crate) fn env_flag(name: &str) -> bool {
    env_var(name).is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
