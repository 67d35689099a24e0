//! Read-only entity queries used by warm-up

use crate::errors::BoxError;
use async_trait::async_trait;

pub type RepositoryResult<T> = std::result::Result<T, BoxError>;

/// Source of "which entities matter" for warm-up decisions
#[async_trait]
pub trait EntityRepository<T>: Send + Sync {
    /// Active entities ordered by usage count, highest first
    async fn most_used_active(&self, limit: usize) -> RepositoryResult<Vec<T>>;

    /// Active entities with usage count above `min_usage`, most recently
    /// used first
    async fn frequently_used_active(&self, min_usage: u64, limit: usize)
        -> RepositoryResult<Vec<T>>;

    async fn count_active(&self) -> RepositoryResult<usize>;
}
