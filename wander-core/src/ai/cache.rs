//! On-disk cache of provider responses.
//!
//! Layout: `{cache_dir}/{prompt_name}/{model}/{hash}.json`, where the model
//! has `/` replaced by `--` and the hash is the SHA-256 of the serialized
//! [`ChatRequest`]. Since the temperature is part of the request, each
//! whole-pipeline attempt gets its own entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::types::{ChatRequest, ChatResponse, Usage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub prompt_name: String,
    pub model: String,
    pub request_hash: String,
}

impl CacheKey {
    pub fn new(prompt_name: &str, model: &str, request: &ChatRequest) -> Self {
        let serialized = serde_json::to_vec(request).unwrap_or_default();

        Self {
            prompt_name: prompt_name.to_string(),
            model: model.to_string(),
            request_hash: hex::encode(Sha256::digest(&serialized)),
        }
    }

    /// Path relative to the cache directory.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.prompt_name)
            .join(self.model.replace('/', "--"))
            .join(format!("{}.json", self.request_hash))
    }
}

/// A cache file's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAiResponse {
    pub content: String,
    pub usage: Usage,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub cached_at: DateTime<Utc>,
}

impl From<CachedAiResponse> for ChatResponse {
    fn from(entry: CachedAiResponse) -> Self {
        Self {
            content: entry.content,
            usage: entry.usage,
            cached: true,
        }
    }
}

/// Number of cached responses, per prompt name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cached_responses: usize,
    pub by_prompt: BTreeMap<String, usize>,
}

pub struct AiCache {
    cache_dir: PathBuf,
}

impl AiCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// A cached response, if present and readable. Unreadable entries count as
    /// misses and are overwritten by the next `put`.
    pub fn get(&self, key: &CacheKey) -> Option<CachedAiResponse> {
        let path = self.cache_dir.join(key.relative_path());
        let bytes = fs::read(&path).ok()?;

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring corrupt AI cache entry"
                );
                None
            }
        }
    }

    pub fn put(
        &self,
        key: &CacheKey,
        request: &ChatRequest,
        response: &ChatResponse,
    ) -> io::Result<()> {
        let path = self.cache_dir.join(key.relative_path());
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let entry = CachedAiResponse {
            content: response.content.clone(),
            usage: response.usage,
            model: key.model.clone(),
            temperature: request.temperature,
            cached_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&entry).map_err(io::Error::other)?;

        fs::write(path, json)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        let Ok(prompts) = fs::read_dir(&self.cache_dir) else {
            return stats;
        };

        for prompt_dir in prompts.flatten().filter(|e| e.path().is_dir()) {
            let prompt_name = prompt_dir.file_name().to_string_lossy().into_owned();
            let Ok(models) = fs::read_dir(prompt_dir.path()) else {
                continue;
            };

            let count = models
                .flatten()
                .filter_map(|model_dir| fs::read_dir(model_dir.path()).ok())
                .flat_map(|entries| entries.flatten())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count();

            stats.cached_responses += count;
            stats.by_prompt.insert(prompt_name, count);
        }

        stats
    }

    /// Remove every cached response.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.cache_dir) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;
    use tempfile::TempDir;

    fn request(temperature: f32) -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user("Plan a walk")]).with_temperature(temperature)
    }

    fn response(content: &str) -> ChatResponse {
        ChatResponse {
            content: content.to_string(),
            usage: Usage::default(),
            cached: false,
        }
    }

    #[test]
    fn test_key_path_layout() {
        let key = CacheKey::new("itinerary_json", "openai/gpt-4o-mini", &request(0.7));

        let path = key.relative_path();
        assert!(path.starts_with("itinerary_json/openai--gpt-4o-mini"));
        assert_eq!(key.request_hash.len(), 64);
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn test_temperature_changes_key() {
        let hot = CacheKey::new("itinerary_json", "m", &request(0.7));
        let cold = CacheKey::new("itinerary_json", "m", &request(0.3));
        assert_ne!(hot, cold);
        assert_eq!(hot, CacheKey::new("itinerary_json", "m", &request(0.7)));
    }

    #[test]
    fn test_put_get_stats_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = AiCache::new(temp_dir.path().join("ai-cache"));
        assert_eq!(cache.stats(), CacheStats::default());

        let req = request(0.5);
        let key = CacheKey::new("itinerary_json", "m", &req);
        assert!(cache.get(&key).is_none());

        let body = r#"{"stages":[]}"#;
        cache.put(&key, &req, &response(body)).unwrap();
        let probe = request(0.0);
        let probe_key = CacheKey::new("credential_probe", "m", &probe);
        cache.put(&probe_key, &probe, &response("ok")).unwrap();

        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.temperature, Some(0.5));
        let cached: ChatResponse = entry.into();
        assert_eq!(cached.content, body);
        assert!(cached.cached);

        let stats = cache.stats();
        assert_eq!(stats.cached_responses, 2);
        assert_eq!(stats.by_prompt.get("itinerary_json"), Some(&1));

        cache.clear().unwrap();
        assert_eq!(cache.stats().cached_responses, 0);
        cache.clear().unwrap();
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = AiCache::new(temp_dir.path().to_path_buf());
        let key = CacheKey::new("itinerary_json", "m", &request(0.7));

        let path = temp_dir.path().join(key.relative_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(cache.get(&key).is_none());
    }
}
