use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::{RelationHistory, SwipeOutcome};

/// How long a relation history survives after its last write
pub const HISTORY_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors that can occur with relation cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Result of an append guarded by a history length limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaAppend {
    /// Written; `len` is the history length after the write
    Appended { len: u64 },
    /// Not written; `len` is the history length that was over the limit
    Rejected { len: u64 },
}

/// Failure of a guarded append, tagged with the step that failed
#[derive(Debug, Error)]
pub enum ConditionalAppendError {
    #[error("counting history failed: {0}")]
    Count(#[source] CacheError),

    #[error("appending outcome failed: {0}")]
    Write(#[source] CacheError),
}

/// Cache key builder
pub struct RelationKey;

impl RelationKey {
    /// Key holding the swipe history of `actor_id`
    pub fn history(actor_id: i64) -> String {
        format!("related_user:{}", actor_id)
    }
}

/// Expiring, append-only store of swipe outcomes keyed by actor
#[async_trait]
pub trait RelationCache: Send + Sync {
    /// Membership view of the actor's history. Missing history is empty.
    async fn read_history_set(&self, actor_id: i64) -> Result<RelationHistory, CacheError>;

    /// Raw number of stored entries, duplicates included
    async fn read_history_count(&self, actor_id: i64) -> Result<u64, CacheError>;

    /// Append one outcome and reset the retention window on the actor's key
    async fn append_outcome(&self, actor_id: i64, outcome: &SwipeOutcome) -> Result<(), CacheError>;

    /// Append only while the stored count is not above `limit`.
    ///
    /// The default is a plain read-then-append: concurrent callers for the
    /// same actor can each pass the check, so the history may overrun
    /// `limit` by at most the number of racing callers. Stores that can do
    /// the check and the write as one step override this.
    async fn append_within_limit(
        &self,
        actor_id: i64,
        outcome: &SwipeOutcome,
        limit: u64,
    ) -> Result<QuotaAppend, ConditionalAppendError> {
        check_then_append(self, actor_id, outcome, limit).await
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Two-step guarded append shared by stores without an atomic primitive
pub async fn check_then_append<C>(
    cache: &C,
    actor_id: i64,
    outcome: &SwipeOutcome,
    limit: u64,
) -> Result<QuotaAppend, ConditionalAppendError>
where
    C: RelationCache + ?Sized,
{
    let len = cache
        .read_history_count(actor_id)
        .await
        .map_err(ConditionalAppendError::Count)?;

    if len > limit {
        return Ok(QuotaAppend::Rejected { len });
    }

    cache
        .append_outcome(actor_id, outcome)
        .await
        .map_err(ConditionalAppendError::Write)?;

    Ok(QuotaAppend::Appended { len: len + 1 })
}
