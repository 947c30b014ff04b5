use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{sanitize_key, RouteStore, StoreError};
use crate::config::env_var;

/// Route store keeping one pretty-printed JSON file per key:
/// `routes_dir/{key}.json`.
#[derive(Debug, Clone)]
pub struct DiskRouteStore {
    routes_dir: PathBuf,
}

impl DiskRouteStore {
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes_dir: routes_dir.into(),
        }
    }

    /// Directory from `WANDER_ROUTES_DIR`, or `~/.wander/routes`.
    pub fn default_dir() -> PathBuf {
        match env_var("WANDER_ROUTES_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|h| h.join(".wander").join("routes"))
                .unwrap_or_else(|| PathBuf::from("data/routes")),
        }
    }

    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }

    fn route_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.routes_dir.join(format!("{}.json", sanitize_key(key)?)))
    }
}

impl RouteStore for DiskRouteStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.route_path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.route_path(key)?;
        fs::create_dir_all(&self.routes_dir)?;

        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.route_path(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.routes_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_itinerary;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskRouteStore::new(temp_dir.path().join("routes"));

        assert_eq!(store.list().unwrap(), Vec::<String>::new());
        assert_eq!(store.get("evening").unwrap(), None);

        let evening = json!({"stages": [{"name": "Patriarch Ponds"}]});
        let morning = json!({"stages": [{"name": "Gorky Park"}]});
        store.set("evening", &evening).unwrap();
        store.set("morning", &morning).unwrap();
        fs::write(temp_dir.path().join("routes").join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["evening", "morning"]);
        let content =
            fs::read_to_string(temp_dir.path().join("routes").join("evening.json")).unwrap();
        assert!(content.contains("\n  \"stages\""));

        assert!(store.delete("evening").unwrap());
        assert!(!store.delete("evening").unwrap());
        assert_eq!(store.list().unwrap(), vec!["morning"]);
    }

    #[test]
    fn test_itinerary_survives_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskRouteStore::new(temp_dir.path());
        let itinerary = normalize_itinerary(&json!({
            "stages": [{"name": "Red Square", "coordinates": [55.7539, 37.6208]}]
        }))
        .unwrap();

        store.save_itinerary("red/square", &itinerary).unwrap();
        assert!(temp_dir.path().join("red-square.json").exists());
        assert_eq!(store.load_itinerary("red/square").unwrap(), Some(itinerary));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{not json").unwrap();

        let store = DiskRouteStore::new(temp_dir.path());
        assert!(matches!(
            store.get("bad"),
            Err(StoreError::Serialization(_))
        ));
    }
}
