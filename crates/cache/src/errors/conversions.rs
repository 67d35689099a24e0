//! Error conversion utilities

use super::types::{CacheError, RecoveryHint, SerializationOp};

/// Convert serde_json errors to cache errors
impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        let operation = if error.is_data() || error.is_syntax() || error.is_eof() {
            SerializationOp::Decode
        } else {
            SerializationOp::Encode
        };

        Self::Serialization {
            key: String::new(),
            operation,
            source: Box::new(error),
            recovery_hint: RecoveryHint::UseFallback,
        }
    }
}

/// Convert glob pattern errors to cache errors
impl From<globset::Error> for CacheError {
    fn from(error: globset::Error) -> Self {
        Self::InvalidKey {
            key: error.glob().unwrap_or_default().to_string(),
            reason: error.kind().to_string(),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Use a glob pattern such as 'search:results:*'".to_string(),
            },
        }
    }
}
