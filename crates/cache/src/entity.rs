//! Entities the cache can hold

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An opaque payload with a stable identity.
///
/// The cache never looks inside the value; it only needs the id to build keys
/// and serde to move the value in and out of a store.
pub trait CacheableEntity: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn cache_id(&self) -> String;
}
