//! Backing key-value store abstraction
//!
//! Each cache tier talks to one `KeyValueStore` handle. A networked server
//! (Redis, Memcached) or the in-process [`MemoryStore`] can sit behind it; the
//! cache only relies on per-key atomicity.

mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server statistics reported by `info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Human readable memory usage, e.g. `1.50K`
    pub memory_used: String,
    /// Number of live keys
    pub key_count: usize,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store name used in logs and errors
    fn name(&self) -> &str;

    /// `Ok(None)` is a miss; `Err` means the store could not answer
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Returns whether a key was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Live keys matching a glob pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    async fn info(&self) -> Result<StoreInfo>;
}

/// Format a byte count the way cache servers report `used_memory_human`
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for u in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = u;
    }
    format!("{value:.2}{unit}")
}
