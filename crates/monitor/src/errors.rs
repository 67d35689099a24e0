//! Error types for the performance monitor

use alumni_cache::CacheError;

/// Boxed error returned by entity repositories
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Entity repository query failed
    #[error("Entity repository failed during {operation}: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// Time-series store could not answer
    #[error("Time series store unavailable during {operation}: {message}")]
    Series {
        operation: &'static str,
        message: String,
    },

    /// Prometheus registration failed
    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Monitor configuration error: {message}")]
    Configuration { message: String },
}

impl MonitorError {
    pub fn repository(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Repository {
            operation,
            source: source.into(),
        }
    }
}
