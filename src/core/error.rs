use std::fmt;
use thiserror::Error;

use crate::core::cancel::Cancelled;
use crate::services::{CacheError, ConditionalAppendError, DirectoryError};

/// The external store an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Directory,
    RelationCache,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Directory => f.write_str("profile directory"),
            StoreKind::RelationCache => f.write_str("relation cache"),
        }
    }
}

/// A read against one of the stores failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("profile directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("relation cache: {0}")]
    RelationCache(#[from] CacheError),
}

impl FetchError {
    pub fn store(&self) -> StoreKind {
        match self {
            FetchError::Directory(_) => StoreKind::Directory,
            FetchError::RelationCache(_) => StoreKind::RelationCache,
        }
    }
}

/// Errors returned by `MatchingEngine::get_profiles`
#[derive(Debug, Error)]
pub enum GetProfilesError {
    #[error("No candidate profiles available for user {actor_id}")]
    EmptyCandidatePool { actor_id: i64 },

    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for GetProfilesError {
    fn from(_: Cancelled) -> Self {
        GetProfilesError::Cancelled
    }
}

/// Errors returned by `MatchingEngine::swipe`
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Actor lookup failed: {0}")]
    ActorLookupFailed(#[source] DirectoryError),

    #[error("Quota check failed: {0}")]
    QuotaCheckFailed(#[source] CacheError),

    #[error("Swipe quota exceeded for user {actor_id}: {count} swipes recorded, limit is {limit}")]
    QuotaExceeded { actor_id: i64, count: u64, limit: u64 },

    #[error("Recording swipe failed: {0}")]
    RecordWriteFailed(#[source] CacheError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl SwipeError {
    /// Quota rejections are policy outcomes, not store faults
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, SwipeError::QuotaExceeded { .. })
    }
}

impl From<Cancelled> for SwipeError {
    fn from(_: Cancelled) -> Self {
        SwipeError::Cancelled
    }
}

impl From<ConditionalAppendError> for SwipeError {
    fn from(value: ConditionalAppendError) -> Self {
        match value {
            ConditionalAppendError::Count(e) => SwipeError::QuotaCheckFailed(e),
            ConditionalAppendError::Write(e) => SwipeError::RecordWriteFailed(e),
        }
    }
}
