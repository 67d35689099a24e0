//! Core error types for the cache system

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Error type for cache and store operations
#[derive(Debug)]
pub enum CacheError {
    /// I/O errors while loading configuration
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Serialization/deserialization of a cached value failed
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Invalid cache key or key pattern
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Backing store unreachable or refusing operations
    StoreUnavailable {
        store: String,
        operation: &'static str,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Verify connectivity to the backing store
    CheckNetwork { endpoint: String },

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// No automated recovery possible
    Manual { instructions: String },

    /// Serve from the producer instead of the cache
    UseFallback,

    /// Operation can be safely ignored
    Ignore,
}

/// Serialization operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationOp {
    Encode,
    Decode,
}

impl CacheError {
    /// Build a store-unavailable error with a retry hint
    pub fn store_unavailable(
        store: impl Into<String>,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            operation,
            reason: reason.into(),
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_secs(1),
            },
        }
    }
}
