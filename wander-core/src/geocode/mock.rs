//! In-memory geocoder for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{GeocodeError, Geocoder};

#[derive(Debug, Clone)]
pub enum MockPlace {
    /// Provider order: (lon, lat).
    Found(f64, f64),
    Error(String),
}

/// Geocoder answering from a fixed table. Unknown queries are "not found".
#[derive(Debug, Default)]
pub struct MockGeocoder {
    places: HashMap<String, MockPlace>,
    queries: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with a point given as (lon, lat).
    pub fn with_place(mut self, query: &str, lon: f64, lat: f64) -> Self {
        self.places
            .insert(query.to_string(), MockPlace::Found(lon, lat));
        self
    }

    pub fn with_error(mut self, query: &str, error: &str) -> Self {
        self.places
            .insert(query.to_string(), MockPlace::Error(error.to_string()));
        self
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        match self.places.get(query) {
            Some(MockPlace::Found(lon, lat)) => Ok(Some((*lon, *lat))),
            Some(MockPlace::Error(e)) => Err(GeocodeError::Request(e.clone())),
            None => Ok(None),
        }
    }
}
