use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;

use crate::models::{RelationHistory, SwipeOutcome};
use crate::services::relations::{
    check_then_append, CacheError, ConditionalAppendError, QuotaAppend, RelationCache, RelationKey,
};

// KEYS[1] history key, ARGV[1] limit, ARGV[2] encoded outcome, ARGV[3] ttl secs
const APPEND_WITHIN_LIMIT: &str = r#"
local len = redis.call('LLEN', KEYS[1])
if len > tonumber(ARGV[1]) then
    return {0, len}
end
len = redis.call('LPUSH', KEYS[1], ARGV[2])
redis.call('EXPIRE', KEYS[1], ARGV[3])
return {1, len}
"#;

/// Sort a failed guarded append by whether the script could have run.
///
/// Transport failures mean the count was never read, so they surface as a
/// count failure. Anything else happened inside or after the script.
fn classify_script_failure(err: CacheError) -> ConditionalAppendError {
    let never_ran = match &err {
        CacheError::RedisError(e) => {
            e.is_io_error()
                || e.is_connection_refusal()
                || e.is_connection_dropped()
                || e.kind() == redis::ErrorKind::IoError
        }
        _ => false,
    };

    if never_ran {
        ConditionalAppendError::Count(err)
    } else {
        ConditionalAppendError::Write(err)
    }
}

/// Redis-backed relation cache
///
/// Each actor's history is a Redis list, newest entry at the head. The
/// connection manager reconnects on its own and is cloned per call, so
/// concurrent requests do not serialize on a lock.
pub struct RedisRelationCache {
    redis: ConnectionManager,
    ttl_secs: u64,
    atomic_quota: bool,
    append_script: Script,
}

impl RedisRelationCache {
    /// Connect to Redis
    pub async fn new(redis_url: &str, ttl_secs: u64, atomic_quota: bool) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis,
            ttl_secs,
            atomic_quota,
            append_script: Script::new(APPEND_WITHIN_LIMIT),
        })
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    async fn append_atomically(
        &self,
        actor_id: i64,
        outcome: &SwipeOutcome,
        limit: u64,
    ) -> Result<QuotaAppend, CacheError> {
        let key = RelationKey::history(actor_id);
        let payload = serde_json::to_string(outcome)?;

        let mut conn = self.redis.clone();
        let reply: Vec<i64> = self
            .append_script
            .key(&key)
            .arg(limit)
            .arg(payload)
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await?;

        match reply.as_slice() {
            [1, len] => Ok(QuotaAppend::Appended { len: *len as u64 }),
            [0, len] => Ok(QuotaAppend::Rejected { len: *len as u64 }),
            other => Err(CacheError::UnexpectedReply(format!("{:?}", other))),
        }
    }
}

#[async_trait]
impl RelationCache for RedisRelationCache {
    async fn read_history_set(&self, actor_id: i64) -> Result<RelationHistory, CacheError> {
        let key = RelationKey::history(actor_id);

        let mut conn = self.redis.clone();
        let entries: Vec<String> = redis::cmd("LRANGE")
            .arg(&key)
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;

        let outcomes = entries
            .iter()
            .map(|entry| serde_json::from_str::<SwipeOutcome>(entry))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!("Read {} history entries from {}", outcomes.len(), key);

        Ok(RelationHistory::from_entries(outcomes))
    }

    async fn read_history_count(&self, actor_id: i64) -> Result<u64, CacheError> {
        let mut conn = self.redis.clone();
        let len: u64 = redis::cmd("LLEN")
            .arg(RelationKey::history(actor_id))
            .query_async(&mut conn)
            .await?;

        Ok(len)
    }

    async fn append_outcome(&self, actor_id: i64, outcome: &SwipeOutcome) -> Result<(), CacheError> {
        let key = RelationKey::history(actor_id);
        let payload = serde_json::to_string(outcome)?;

        let mut conn = self.redis.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("LPUSH")
            .arg(&key)
            .arg(payload)
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(self.ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::trace!("Appended outcome for target {} to {}", outcome.target_id, key);
        Ok(())
    }

    async fn append_within_limit(
        &self,
        actor_id: i64,
        outcome: &SwipeOutcome,
        limit: u64,
    ) -> Result<QuotaAppend, ConditionalAppendError> {
        if self.atomic_quota {
            self.append_atomically(actor_id, outcome, limit)
                .await
                .map_err(classify_script_failure)
        } else {
            check_then_append(self, actor_id, outcome, limit).await
        }
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        let mut conn = self.redis.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
