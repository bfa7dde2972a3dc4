// Result Cache
// Bounded LRU memoization for humanization results. A hit must be
// observably equivalent to a fresh computation with the same key inputs,
// so the key covers every input that can change the output.

use crate::models::{CacheEntry, HumanizationRequest};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Deterministic key over (input_text, target_style, target_complexity,
/// selected_patterns, model_version_id). Metadata is deliberately excluded:
/// it is passed through unmodified and never affects the output.
pub fn cache_key(request: &HumanizationRequest) -> String {
    let key_material = serde_json::json!({
        "input_text": request.input_text,
        "target_style": request.target_style,
        "target_complexity": request.target_complexity,
        "selected_patterns": request.selected_patterns,
        "model_version_id": request.model_version_id,
    });

    let mut hasher = Sha256::new();
    hasher.update(key_material.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// LRU map: `order` holds keys from least to most recently used. Reads
/// promote; inserts evict past capacity. Racing writers for the same key
/// overwrite each other (last-writer-wins), which is acceptable because
/// both computed equivalent results.
pub struct ResultCache {
    capacity: usize,
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(key)?.clone();

        // Expired entries are dropped on read
        if let Some(expires_at) = entry.expires_at {
            if expires_at <= Utc::now() {
                self.remove(key);
                return None;
            }
        }

        self.touch(key);
        Some(entry)
    }

    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        if self.entries.insert(key.clone(), entry).is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(output: &str) -> CacheEntry {
        CacheEntry {
            output_text: output.to_string(),
            detection_score_before: 0.6,
            detection_score_after: 0.4,
            quality_score: 0.8,
            applied_patterns: vec!["Synonym Variation".to_string()],
            cached_at: Utc::now(),
            expires_at: None,
        }
    }

    #[test]
    fn test_key_is_deterministic() {
        let request = HumanizationRequest::new("some text");
        assert_eq!(cache_key(&request), cache_key(&request));
    }

    #[test]
    fn test_key_ignores_metadata_and_use_cache() {
        let a = HumanizationRequest::new("same text");
        let mut b = HumanizationRequest::new("same text");
        b.use_cache = false;
        b.metadata.insert("trace".to_string(), serde_json::json!("abc"));
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_key_changes_with_inputs() {
        let base = HumanizationRequest::new("text");
        let mut other = HumanizationRequest::new("text");
        other.model_version_id = Some("v2".to_string());
        assert_ne!(cache_key(&base), cache_key(&other));
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let mut cache = ResultCache::new(2);
        cache.insert("a".to_string(), entry("A"));
        cache.insert("b".to_string(), entry("B"));

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), entry("C"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_overwrite_same_key_keeps_single_entry() {
        let mut cache = ResultCache::new(4);
        cache.insert("k".to_string(), entry("first"));
        cache.insert("k".to_string(), entry("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().output_text, "second");
    }

    #[test]
    fn test_expired_entry_dropped_on_read() {
        let mut cache = ResultCache::new(4);
        let mut stale = entry("stale");
        stale.expires_at = Some(Utc::now() - Duration::seconds(1));
        cache.insert("k".to_string(), stale);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }
}
