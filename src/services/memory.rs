//! In-process implementations of the store contracts.
//!
//! `MemoryDirectory` backs the test suite. `MemoryRelationCache` also serves
//! single-instance runs when `cache.backend = "memory"`. Semantics follow the
//! networked stores: the directory returns users in insertion order, the
//! relation cache keeps an append-only newest-first list per actor that
//! expires `ttl` after its last write.

use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use moka::Entry;
use std::future;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::{RelationHistory, SwipeOutcome, User};
use crate::services::directory::{DirectoryError, ProfileDirectory, SubscriptionRegistry};
use crate::services::relations::{
    CacheError, ConditionalAppendError, QuotaAppend, RelationCache, HISTORY_RETENTION,
};

pub struct MemoryDirectory {
    users: RwLock<Vec<User>>,
}

impl MemoryDirectory {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl ProfileDirectory for MemoryDirectory {
    async fn lookup_by_identity(&self, user_id: i64) -> Result<User, DirectoryError> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("user id {}", user_id)))
    }

    async fn lookup_by_username(&self, username: &str) -> Result<User, DirectoryError> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.username == username)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("username {}", username)))
    }

    async fn list_others(&self, excluding_id: i64) -> Result<Vec<User>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.id != excluding_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionRegistry for MemoryDirectory {
    async fn set_premium(&self, user_id: i64, is_premium: bool) -> Result<(), DirectoryError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("user id {}", user_id)))?;
        user.is_premium = is_premium;
        Ok(())
    }
}

/// Relation cache held in a moka cache
///
/// Each actor maps to a newest-first list of outcomes. Every write replaces
/// the list, which restarts its time to live, so a history expires `ttl`
/// after its last append. Expired lists are dropped by moka's housekeeping.
pub struct MemoryRelationCache {
    histories: Cache<i64, Vec<SwipeOutcome>>,
}

impl Default for MemoryRelationCache {
    fn default() -> Self {
        Self::with_ttl(HISTORY_RETENTION)
    }
}

impl MemoryRelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            histories: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Seed an actor's history; `outcomes` are newest first
    pub async fn seed(&self, actor_id: i64, outcomes: Vec<SwipeOutcome>) {
        self.histories.insert(actor_id, outcomes).await;
    }

    /// Number of actors with a live history, after pending evictions run
    pub async fn tracked_actors(&self) -> u64 {
        self.histories.run_pending_tasks().await;
        self.histories.entry_count()
    }
}

#[async_trait]
impl RelationCache for MemoryRelationCache {
    async fn read_history_set(&self, actor_id: i64) -> Result<RelationHistory, CacheError> {
        Ok(self
            .histories
            .get(&actor_id)
            .await
            .map(RelationHistory::from_entries)
            .unwrap_or_default())
    }

    async fn read_history_count(&self, actor_id: i64) -> Result<u64, CacheError> {
        Ok(self
            .histories
            .get(&actor_id)
            .await
            .map(|outcomes| outcomes.len() as u64)
            .unwrap_or(0))
    }

    async fn append_outcome(&self, actor_id: i64, outcome: &SwipeOutcome) -> Result<(), CacheError> {
        let outcome = *outcome;
        self.histories
            .entry(actor_id)
            .and_upsert_with(|existing| {
                let mut outcomes = existing.map(Entry::into_value).unwrap_or_default();
                outcomes.insert(0, outcome);
                future::ready(outcomes)
            })
            .await;
        Ok(())
    }

    async fn append_within_limit(
        &self,
        actor_id: i64,
        outcome: &SwipeOutcome,
        limit: u64,
    ) -> Result<QuotaAppend, ConditionalAppendError> {
        let outcome = *outcome;
        let result = self
            .histories
            .entry(actor_id)
            .and_compute_with(|existing| {
                let mut outcomes = existing.map(Entry::into_value).unwrap_or_default();
                let op = if outcomes.len() as u64 > limit {
                    Op::Nop
                } else {
                    outcomes.insert(0, outcome);
                    Op::Put(outcomes)
                };
                future::ready(op)
            })
            .await;

        Ok(match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => QuotaAppend::Appended {
                len: entry.value().len() as u64,
            },
            CompResult::Unchanged(entry) => QuotaAppend::Rejected {
                len: entry.value().len() as u64,
            },
            // an absent list is never over the limit and nothing is removed
            _ => QuotaAppend::Rejected { len: 0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SwipeStatus;

    fn user(id: i64, premium: bool) -> User {
        User {
            id,
            username: format!("user{}", id),
            password: String::new(),
            full_name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            is_premium: premium,
        }
    }

    #[tokio::test]
    async fn test_directory_lookups() {
        let directory = MemoryDirectory::with_users(vec![user(1, false), user(2, true)]);

        assert_eq!(directory.lookup_by_identity(2).await.unwrap().id, 2);
        assert_eq!(directory.lookup_by_username("user1").await.unwrap().id, 1);
        assert!(directory.lookup_by_identity(3).await.unwrap_err().is_not_found());

        let others = directory.list_others(1).await.unwrap();
        assert_eq!(others.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_set_premium() {
        let directory = MemoryDirectory::with_users(vec![user(1, false)]);

        directory.set_premium(1, true).await.unwrap();
        assert!(directory.lookup_by_identity(1).await.unwrap().is_premium);

        assert!(directory.set_premium(5, true).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_history_expires_after_ttl() {
        let cache = MemoryRelationCache::with_ttl(Duration::from_millis(50));
        cache
            .append_outcome(1, &SwipeOutcome::new(2, SwipeStatus::Liked))
            .await
            .unwrap();
        assert_eq!(cache.read_history_count(1).await.unwrap(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.read_history_count(1).await.unwrap(), 0);
        assert!(cache.read_history_set(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_keeps_duplicates() {
        let cache = MemoryRelationCache::new();
        cache
            .append_outcome(1, &SwipeOutcome::new(2, SwipeStatus::Passed))
            .await
            .unwrap();
        cache
            .append_outcome(1, &SwipeOutcome::new(2, SwipeStatus::Liked))
            .await
            .unwrap();

        assert_eq!(cache.read_history_count(1).await.unwrap(), 2);
        let history = cache.read_history_set(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.status(2), Some(SwipeStatus::Liked));
    }

    #[tokio::test]
    async fn test_append_within_limit_boundary() {
        let cache = MemoryRelationCache::new();
        let outcome = SwipeOutcome::new(9, SwipeStatus::Neutral);

        let result = cache.append_within_limit(1, &outcome, 1).await.unwrap();
        assert_eq!(result, QuotaAppend::Appended { len: 1 });
        let result = cache.append_within_limit(1, &outcome, 1).await.unwrap();
        assert_eq!(result, QuotaAppend::Appended { len: 2 });
        let result = cache.append_within_limit(1, &outcome, 1).await.unwrap();
        assert_eq!(result, QuotaAppend::Rejected { len: 2 });
    }

    #[tokio::test]
    async fn test_append_refreshes_ttl() {
        let cache = MemoryRelationCache::with_ttl(Duration::from_millis(300));
        let outcome = SwipeOutcome::new(2, SwipeStatus::Liked);

        cache.append_outcome(1, &outcome).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        cache.append_outcome(1, &outcome).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.read_history_count(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_expired_histories_are_evicted() {
        let cache = MemoryRelationCache::with_ttl(Duration::from_millis(10));
        let outcome = SwipeOutcome::new(1, SwipeStatus::Neutral);

        for actor in 0..1_000 {
            cache.append_outcome(actor, &outcome).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.append_outcome(5_000, &outcome).await.unwrap();

        assert_eq!(cache.tracked_actors().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_guarded_appends_respect_limit() {
        let cache = std::sync::Arc::new(MemoryRelationCache::new());
        let limit = 3;

        let handles: Vec<_> = (0..20)
            .map(|target| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .append_within_limit(1, &SwipeOutcome::new(target, SwipeStatus::Liked), limit)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut appended = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), QuotaAppend::Appended { .. }) {
                appended += 1;
            }
        }

        assert_eq!(appended, limit + 1);
        assert_eq!(cache.read_history_count(1).await.unwrap(), limit + 1);
    }
}
