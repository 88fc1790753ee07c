//! Short-lived query result cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;

/// A cached raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Raw response bytes.
    pub value: Bytes,
    /// When the value was captured.
    pub captured_at: Instant,
    /// Set once a write has made the value obsolete.
    superseded: bool,
}

impl CacheEntry {
    /// Create a fresh entry.
    pub fn new(value: impl Into<Bytes>, captured_at: Instant) -> Self {
        CacheEntry {
            value: value.into(),
            captured_at,
            superseded: false,
        }
    }

    /// Whether the entry may still answer a query at `now`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        !self.superseded && now.saturating_duration_since(self.captured_at) <= ttl
    }

    /// Whether a write has made this entry obsolete.
    pub fn is_superseded(&self) -> bool {
        self.superseded
    }
}

/// Cache of raw responses keyed by mnemonic path.
///
/// Entries are overwritten, never removed; staleness is decided at read time.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        ResponseCache::default()
    }

    /// Get the entry for a path if it is still valid.
    pub fn fresh(&self, path: &str, ttl: Duration, now: Instant) -> Option<&CacheEntry> {
        self.entries.get(path).filter(|entry| entry.is_fresh(ttl, now))
    }

    /// Get the entry for a path regardless of age.
    pub fn get(&self, path: &str) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    /// Store a value captured at `captured_at`.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Bytes>, captured_at: Instant) {
        self.entries
            .insert(path.into(), CacheEntry::new(value, captured_at));
    }

    /// Store a batch of entries.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, CacheEntry)>) {
        self.entries.extend(entries);
    }

    /// Mark the entry for a path as obsolete without dropping it.
    pub fn supersede(&mut self, path: &str) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.superseded = true;
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(500);

    #[test]
    fn test_fresh_within_ttl() {
        let mut cache = ResponseCache::new();
        let t0 = Instant::now();
        cache.insert(":CH1:DISPlay", &b"ON"[..], t0);

        assert!(cache.fresh(":CH1:DISPlay", TTL, t0 + Duration::from_millis(500)).is_some());
        assert!(cache.fresh(":CH1:DISPlay", TTL, t0 + Duration::from_millis(501)).is_none());
        assert!(cache.get(":CH1:DISPlay").is_some());
    }

    #[test]
    fn test_supersede_keeps_value() {
        let mut cache = ResponseCache::new();
        let t0 = Instant::now();
        cache.insert(":CH1:DISPlay", &b"ON"[..], t0);
        cache.supersede(":CH1:DISPlay");
        cache.supersede(":CH2:DISPlay");

        assert!(cache.fresh(":CH1:DISPlay", TTL, t0).is_none());
        let entry = cache.get(":CH1:DISPlay").unwrap();
        assert!(entry.is_superseded());
        assert_eq!(entry.value, Bytes::from_static(b"ON"));
        assert_eq!(cache.len(), 1);

        cache.insert(":CH1:DISPlay", &b"OFF"[..], t0);
        assert!(cache.fresh(":CH1:DISPlay", TTL, t0).is_some());
    }
}
