//! Injected cache abstraction for prompt suggestions.
//!
//! Ownership and lifecycle are explicit: the suggestion engine receives a
//! cache rather than reaching for process-global state, so it can be
//! swapped for a distributed cache or disabled in tests. Best-effort only;
//! entries are safe to drop and recompute at any time.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Get/set access to cached suggestion sets, keyed by a history fingerprint.
#[async_trait]
pub trait SuggestionCache: Send + Sync {
    /// Fetch a cached suggestion set, if present and fresh.
    async fn get(&self, key: &str) -> Option<Vec<String>>;

    /// Store a suggestion set under the given key.
    async fn put(&self, key: &str, suggestions: Vec<String>);
}

/// A process-local TTL cache.
pub struct InMemoryTtlCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Vec<String>, Instant)>>,
}

impl InMemoryTtlCache {
    /// Create a cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }
}

impl Default for InMemoryTtlCache {
    /// Five-minute TTL.
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

#[async_trait]
impl SuggestionCache for InMemoryTtlCache {
    async fn get(&self, key: &str) -> Option<Vec<String>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, stored_at)| stored_at.elapsed() < self.ttl)
            .map(|(suggestions, _)| suggestions.clone())
    }

    async fn put(&self, key: &str, suggestions: Vec<String>) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        entries.insert(key.to_string(), (suggestions, Instant::now()));
    }
}

/// A cache that stores nothing, for tests and cache-off deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl SuggestionCache for NoopCache {
    async fn get(&self, _key: &str) -> Option<Vec<String>> {
        None
    }

    async fn put(&self, _key: &str, _suggestions: Vec<String>) {}
}
