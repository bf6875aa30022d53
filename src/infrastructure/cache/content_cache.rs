//! Content-addressed result cache
//!
//! Bounded, TTL-bounded LRU keyed by the input content hash. Lookups
//! and insertions are synchronous; eviction happens lazily at access
//! time, never from a background sweep. Eviction order is exact: the
//! least-recently-touched entry goes first, which the tests rely on.

use std::sync::Mutex;
use std::time::Duration;

use indexmap::IndexMap;

use crate::domain::AiAnalysisResult;

/// Configuration for the content cache
#[derive(Debug, Clone)]
pub struct ContentCacheConfig {
    /// Maximum number of entries held at once
    pub max_entries: usize,
    /// Age after which an entry reads as a miss and is dropped
    pub ttl: Duration,
}

impl Default for ContentCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 500,
            ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl ContentCacheConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AiAnalysisResult,
    inserted_at_ms: u64,
}

/// Insertion-ordered map where the front is always the next eviction
/// candidate: hits reinsert at the back, so order tracks recency.
#[derive(Debug)]
pub struct ContentCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
    config: ContentCacheConfig,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::with_config(ContentCacheConfig::default())
    }

    pub fn with_config(config: ContentCacheConfig) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            config,
        }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let age = Self::current_time_millis().saturating_sub(entry.inserted_at_ms);
        age > self.config.ttl.as_millis() as u64
    }

    /// Returns the cached result and refreshes its recency, or evicts
    /// it and reports a miss when its age exceeds the TTL.
    pub fn get(&self, key: &str) -> Option<AiAnalysisResult> {
        let mut entries = self.entries.lock().unwrap();

        let entry = entries.shift_remove(key)?;
        if self.is_expired(&entry) {
            return None;
        }

        let result = entry.result.clone();
        entries.insert(key.to_string(), entry);
        Some(result)
    }

    /// Inserts at the most-recently-used position, evicting the single
    /// least-recently-touched entry when at capacity.
    pub fn insert(&self, key: &str, result: AiAnalysisResult) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.lock().unwrap();

        entries.shift_remove(key);
        if entries.len() >= self.config.max_entries {
            entries.shift_remove_index(0);
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                result,
                inserted_at_ms: Self::current_time_millis(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::result::{AnalysisMethod, SizeEstimate};
    use crate::domain::{AiAnalysisResult, SceneType, Style};

    fn result(product_type: &str) -> AiAnalysisResult {
        AiAnalysisResult {
            product_type: product_type.to_string(),
            scene_types: vec![SceneType::LivingRoom],
            color_schemes: vec![],
            materials: vec![],
            size: SizeEstimate::medium(),
            styles: vec![Style::Modern],
            confidence: 0.85,
            analysis_method: AnalysisMethod::Ai,
        }
    }

    #[test]
    fn test_set_and_get() {
        let cache = ContentCache::new();
        cache.insert("key1", result("sofa"));

        let hit = cache.get("key1").unwrap();
        assert_eq!(hit.product_type, "sofa");
    }

    #[test]
    fn test_get_missing() {
        let cache = ContentCache::new();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let cache = ContentCache::with_config(ContentCacheConfig::default().with_max_entries(3));

        for i in 0..4 {
            cache.insert(&format!("key{i}"), result("chair"));
        }

        assert_eq!(cache.len(), 3);
        // The oldest untouched key was the one evicted.
        assert!(cache.get("key0").is_none());
        assert!(cache.get("key3").is_some());
    }

    #[test]
    fn test_read_refreshes_recency() {
        let cache = ContentCache::with_config(ContentCacheConfig::default().with_max_entries(2));

        cache.insert("key1", result("table"));
        cache.insert("key2", result("lamp"));

        // Touch key1 so key2 becomes the eviction candidate.
        assert!(cache.get("key1").is_some());
        cache.insert("key3", result("rug"));

        assert!(cache.get("key1").is_some());
        assert!(cache.get("key2").is_none());
        assert!(cache.get("key3").is_some());
    }

    #[test]
    fn test_reinserting_key_replaces_entry() {
        let cache = ContentCache::with_config(ContentCacheConfig::default().with_max_entries(2));

        cache.insert("key1", result("table"));
        cache.insert("key1", result("desk"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key1").unwrap().product_type, "desk");
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = ContentCache::with_config(
            ContentCacheConfig::default().with_ttl(Duration::from_millis(50)),
        );

        cache.insert("key1", result("bed"));
        assert!(cache.get("key1").is_some());

        std::thread::sleep(Duration::from_millis(100));

        assert!(cache.get("key1").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ContentCache::new();
        cache.insert("key1", result("sofa"));
        cache.insert("key2", result("chair"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
