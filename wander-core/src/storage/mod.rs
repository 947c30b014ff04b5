//! Key-value storage of generated routes.
//!
//! Values are plain JSON so a store can hold anything; typed helpers save and
//! load [`Itinerary`] records. Keys are sanitized so they are safe file names.

mod disk;
mod memory;

pub use disk::DiskRouteStore;
pub use memory::MemoryRouteStore;

use serde_json::Value;
use thiserror::Error;

use crate::error::SchemaViolation;
use crate::normalize::normalize_itinerary;
use crate::types::Itinerary;

/// Longest key kept after sanitizing.
const MAX_KEY_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid route key: {0:?}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize route: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored route is not a valid itinerary: {0}")]
    InvalidRoute(#[from] SchemaViolation),
}

/// Storage backend for routes.
pub trait RouteStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// All keys, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn save_itinerary(&self, key: &str, itinerary: &Itinerary) -> Result<(), StoreError> {
        let value = serde_json::to_value(itinerary)?;
        self.set(key, &value)
    }

    /// Load a route, normalizing it so older or hand-edited records still
    /// come back complete.
    fn load_itinerary(&self, key: &str) -> Result<Option<Itinerary>, StoreError> {
        match self.get(key)? {
            Some(value) => Ok(Some(normalize_itinerary(&value)?)),
            None => Ok(None),
        }
    }
}

/// Make a key safe to use as a file name.
pub fn sanitize_key(key: &str) -> Result<String, StoreError> {
    let sanitized: String = key
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else if c == '.' || c == '/' {
                '-'
            } else {
                '_'
            }
        })
        .take(MAX_KEY_LEN)
        .collect();

    if sanitized.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("red-square_walk").unwrap(), "red-square_walk");
        assert_eq!(sanitize_key("../etc/passwd").unwrap(), "---etc-passwd");
        assert_eq!(sanitize_key("my walk!").unwrap(), "my_walk_");
        assert_eq!(sanitize_key("прогулка").unwrap(), "прогулка");
        assert!(matches!(
            sanitize_key("   "),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_long_keys_are_truncated() {
        let key = "a".repeat(500);
        assert_eq!(sanitize_key(&key).unwrap().chars().count(), MAX_KEY_LEN);
    }
}
