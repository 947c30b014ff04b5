use dashmap::DashMap;
use serde_json::Value;

use super::{sanitize_key, RouteStore, StoreError};

/// In-process route store.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    routes: DashMap<String, Value>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteStore for MemoryRouteStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let key = sanitize_key(key)?;
        Ok(self.routes.get(&key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let key = sanitize_key(key)?;
        self.routes.insert(key, value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let key = sanitize_key(key)?;
        Ok(self.routes.remove(&key).is_some())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
