//! Bounded TTL cache keyed by request signature.
//!
//! One core serves both targets: the wasm `ApiClient` injects an instance to
//! short-circuit repeated content calls, and the native proxy keeps one per
//! process behind its state. Time is a caller-supplied millisecond stamp so
//! expiry decisions stay testable.

use std::cmp::Ordering;
use std::collections::HashMap;

#[cfg(any(target_arch = "wasm32", test))]
pub const DEFAULT_CACHE_TTL_MS: f64 = 300_000.0;
#[cfg(any(target_arch = "wasm32", test))]
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

#[derive(Clone)]
struct CacheEntry {
    stored_at_ms: f64,
    expires_at_ms: f64,
    body: String,
}

pub struct ResponseCache {
    max_entries: usize,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
        }
    }

    #[cfg(any(target_arch = "wasm32", test))]
    pub fn bounded_default() -> Self {
        Self::new(DEFAULT_CACHE_MAX_ENTRIES)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn read(&mut self, key: &str, now_ms: f64) -> Option<String> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => Some(entry.body.clone()),
            Some(_) => {
                self.purge_expired(now_ms);
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Last write wins; inserting a new key at capacity evicts the oldest
    /// entry, overwriting an existing key does not.
    pub fn write(&mut self, key: String, body: String, now_ms: f64, ttl_ms: f64) {
        self.purge_expired(now_ms);

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                stored_at_ms: now_ms,
                expires_at_ms: now_ms + ttl_ms,
                body,
            },
        );
    }

    fn purge_expired(&mut self, now_ms: f64) {
        self.entries.retain(|_, entry| entry.expires_at_ms > now_ms);
    }

    fn evict_oldest(&mut self) {
        let Some(key_to_remove) = self
            .entries
            .iter()
            .min_by(|a, b| {
                a.1.stored_at_ms
                    .partial_cmp(&b.1.stored_at_ms)
                    .unwrap_or(Ordering::Equal)
            })
            .map(|(key, _)| key.clone())
        else {
            return;
        };

        self.entries.remove(&key_to_remove);
    }
}

/// Canonical signature for a request: method, URL, query pairs in call
/// order, and the serialized body when present.
pub fn request_key(method: &str, url: &str, params: &[(String, String)], body: Option<&str>) -> String {
    let mut key = format!("{method} {url}");

    for (name, value) in params {
        key.push('&');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }

    if let Some(body) = body {
        key.push(' ');
        key.push_str(body);
    }

    key
}

/// Pull a human-readable message out of an error response body: a `message`
/// field first, then `error`, then the supplied fallback.
#[cfg(any(target_arch = "wasm32", test))]
pub fn error_message_from_body(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_string();
    };

    for field in ["message", "error"] {
        if let Some(text) = value
            .get(field)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            return text.to_string();
        }
    }

    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl_returns_stored_body() {
        let mut cache = ResponseCache::new(8);
        cache.write("k".to_string(), "payload".to_string(), 0.0, 1_000.0);

        assert_eq!(cache.read("k", 999.0), Some("payload".to_string()));
    }

    #[test]
    fn entry_expires_after_ttl() {
        let mut cache = ResponseCache::new(8);
        cache.write("k".to_string(), "payload".to_string(), 0.0, 1_000.0);

        assert_eq!(cache.read("k", 1_000.0), None);
        assert!(cache.is_empty(), "expired entry should be dropped on read");
    }

    #[test]
    fn overwrite_at_capacity_does_not_evict_oldest() {
        let mut cache = ResponseCache::new(4);
        for index in 0..4 {
            cache.write(format!("key-{index}"), "v".to_string(), index as f64, 10_000.0);
        }

        cache.write("key-2".to_string(), "updated".to_string(), 10.0, 10_000.0);

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.read("key-0", 20.0), Some("v".to_string()));
        assert_eq!(cache.read("key-2", 20.0), Some("updated".to_string()));
    }

    #[test]
    fn new_key_at_capacity_evicts_oldest() {
        let mut cache = ResponseCache::new(3);
        for index in 0..3 {
            cache.write(format!("key-{index}"), "v".to_string(), index as f64, 10_000.0);
        }

        cache.write("key-9".to_string(), "fresh".to_string(), 10.0, 10_000.0);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.read("key-0", 20.0), None);
        assert_eq!(cache.read("key-9", 20.0), Some("fresh".to_string()));
    }

    #[test]
    fn expired_entries_do_not_count_against_capacity() {
        let mut cache = ResponseCache::new(2);
        cache.write("stale".to_string(), "v".to_string(), 0.0, 10.0);
        cache.write("kept".to_string(), "v".to_string(), 0.0, 10_000.0);

        cache.write("fresh".to_string(), "v".to_string(), 100.0, 10_000.0);

        assert_eq!(cache.read("kept", 200.0), Some("v".to_string()));
        assert_eq!(cache.read("fresh", 200.0), Some("v".to_string()));
    }

    #[test]
    fn request_key_distinguishes_method_params_and_body() {
        let params = vec![("per_page".to_string(), "6".to_string())];
        let get = request_key("GET", "/posts", &params, None);
        let get_plain = request_key("GET", "/posts", &[], None);
        let post = request_key("POST", "/posts", &params, None);
        let post_body = request_key("POST", "/posts", &params, Some("{\"a\":1}"));

        assert_ne!(get, get_plain);
        assert_ne!(get, post);
        assert_ne!(post, post_body);
    }

    #[test]
    fn error_message_prefers_message_then_error_then_fallback() {
        assert_eq!(
            error_message_from_body(r#"{"message":"rate limited","error":"nope"}"#, "generic"),
            "rate limited"
        );
        assert_eq!(
            error_message_from_body(r#"{"error":"not found"}"#, "generic"),
            "not found"
        );
        assert_eq!(error_message_from_body("<html>oops</html>", "generic"), "generic");
        assert_eq!(error_message_from_body(r#"{"message":"  "}"#, "generic"), "generic");
    }
}
