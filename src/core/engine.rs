use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::{
    cancel::guard,
    error::{FetchError, GetProfilesError, SwipeError},
    filters::exclude_seen,
    quota::SwipeQuota,
};
use crate::models::{SwipeOutcome, SwipeStatus, User};
use crate::services::{ProfileDirectory, QuotaAppend, RelationCache};

/// A swipe that was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeReceipt {
    pub actor_id: i64,
    pub target_id: i64,
    pub status: SwipeStatus,
    /// History length after the write, when the store reported it
    pub history_len: Option<u64>,
}

/// Matching orchestrator
///
/// Reads candidates from the profile directory, reads and appends swipe
/// outcomes in the relation cache, and applies the filtering and quota
/// rules across the two. Holds no mutable state of its own; the store
/// handles are shared and live as long as the process.
///
/// # Consistency
/// Every store call is a single operation. Where the relation cache offers
/// an atomic guarded append the quota cannot be overrun; otherwise
/// concurrent swipes by one actor may each pass the check and overrun the
/// limit by at most the number of racing calls. Later calls see the true
/// count and are refused.
#[derive(Clone)]
pub struct MatchingEngine {
    directory: Arc<dyn ProfileDirectory>,
    relations: Arc<dyn RelationCache>,
    quota: SwipeQuota,
}

impl MatchingEngine {
    pub fn new(
        directory: Arc<dyn ProfileDirectory>,
        relations: Arc<dyn RelationCache>,
        quota: SwipeQuota,
    ) -> Self {
        Self {
            directory,
            relations,
            quota,
        }
    }

    pub fn quota(&self) -> SwipeQuota {
        self.quota
    }

    /// Profiles the actor has not swiped on yet, in directory order.
    ///
    /// An empty directory is reported as `EmptyCandidatePool` rather than
    /// an empty list. Profiles seen with any status are excluded.
    pub async fn get_profiles(
        &self,
        actor_id: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<User>, GetProfilesError> {
        let candidates = guard(cancel, self.directory.list_others(actor_id))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to list candidates for {}: {}", actor_id, e);
                FetchError::from(e)
            })?;

        if candidates.is_empty() {
            tracing::warn!("Directory has no candidates for user {}", actor_id);
            return Err(GetProfilesError::EmptyCandidatePool { actor_id });
        }

        let history = guard(cancel, self.relations.read_history_set(actor_id))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to read swipe history for {}: {}", actor_id, e);
                FetchError::from(e)
            })?;

        let total_candidates = candidates.len();
        let seen = history.len();
        let profiles = exclude_seen(candidates, &history);

        tracing::info!(
            "Returning {} profiles for user {} ({} candidates, {} already seen)",
            profiles.len(),
            actor_id,
            total_candidates,
            seen
        );

        Ok(profiles)
    }

    /// Enforce the actor's quota, then append the outcome to their history.
    ///
    /// The target is recorded as given; it is not checked against the
    /// directory. On error nothing has been written.
    pub async fn swipe(
        &self,
        actor_id: i64,
        target_id: i64,
        status: SwipeStatus,
        cancel: &CancellationToken,
    ) -> Result<SwipeReceipt, SwipeError> {
        let actor = guard(cancel, self.directory.lookup_by_identity(actor_id))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to look up swiping user {}: {}", actor_id, e);
                SwipeError::ActorLookupFailed(e)
            })?;

        let outcome = SwipeOutcome::new(target_id, status);

        let history_len = if self.quota.applies_to(&actor) {
            let limit = self.quota.limit();
            let appended = guard(cancel, self.relations.append_within_limit(actor_id, &outcome, limit))
                .await?
                .map_err(|e| {
                    tracing::error!("Failed to record swipe {} -> {}: {}", actor_id, target_id, e);
                    SwipeError::from(e)
                })?;

            match appended {
                QuotaAppend::Appended { len } => Some(len),
                QuotaAppend::Rejected { len } => {
                    debug_assert!(self.quota.is_exceeded(len));
                    tracing::warn!(
                        "User {} reached the swipe limit ({} recorded, limit {})",
                        actor_id,
                        len,
                        limit
                    );
                    return Err(SwipeError::QuotaExceeded {
                        actor_id,
                        count: len,
                        limit,
                    });
                }
            }
        } else {
            guard(cancel, self.relations.append_outcome(actor_id, &outcome))
                .await?
                .map_err(|e| {
                    tracing::error!("Failed to record swipe {} -> {}: {}", actor_id, target_id, e);
                    SwipeError::RecordWriteFailed(e)
                })?;
            None
        };

        tracing::info!(
            "Recorded swipe {} -> {} ({:?}, premium: {})",
            actor_id,
            target_id,
            status,
            actor.is_premium
        );

        Ok(SwipeReceipt {
            actor_id,
            target_id,
            status,
            history_len,
        })
    }
}
