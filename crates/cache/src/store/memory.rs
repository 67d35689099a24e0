//! In-process key-value store with per-key TTL

use super::{human_bytes, KeyValueStore, StoreInfo};
use crate::errors::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use globset::Glob;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredValue {
    data: Vec<u8>,
    /// `None` when the TTL reaches past the clock's range
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// DashMap-backed store. Expired entries are dropped lazily on access.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    entries: Arc<DashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, v| v.is_live(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.data.clone()));
            }
        } else {
            return Ok(None);
        }

        // Expired: remove unless a concurrent writer refreshed it
        self.entries.remove_if(key, |_, v| !v.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            StoredValue {
                data: value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, v)| v.is_live(now)))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Glob::new(pattern)?.compile_matcher();
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.is_live(now) && matcher.is_match(e.key()))
            .map(|e| e.key().clone())
            .collect())
    }

    async fn info(&self) -> Result<StoreInfo> {
        let now = Instant::now();
        let (count, bytes) = self
            .entries
            .iter()
            .filter(|e| e.is_live(now))
            .fold((0usize, 0u64), |(count, bytes), e| {
                (count + 1, bytes + (e.key().len() + e.data.len()) as u64)
            });

        Ok(StoreInfo {
            memory_used: human_bytes(bytes),
            key_count: count,
        })
    }
}
