use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Account record owned by the profile directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub is_premium: bool,
}

/// Decision a user made about a candidate.
///
/// Encoded on the wire and in the relation cache as a small signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum SwipeStatus {
    Passed,
    Neutral,
    Liked,
}

impl SwipeStatus {
    pub fn as_i8(self) -> i8 {
        match self {
            SwipeStatus::Passed => -1,
            SwipeStatus::Neutral => 0,
            SwipeStatus::Liked => 1,
        }
    }
}

/// Raised when an integer does not name a swipe status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSwipeStatus(pub i64);

impl fmt::Display for InvalidSwipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid swipe status {}, expected -1, 0 or 1", self.0)
    }
}

impl std::error::Error for InvalidSwipeStatus {}

impl TryFrom<i8> for SwipeStatus {
    type Error = InvalidSwipeStatus;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SwipeStatus::Passed),
            0 => Ok(SwipeStatus::Neutral),
            1 => Ok(SwipeStatus::Liked),
            other => Err(InvalidSwipeStatus(other as i64)),
        }
    }
}

impl TryFrom<i64> for SwipeStatus {
    type Error = InvalidSwipeStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i8::try_from(value)
            .map_err(|_| InvalidSwipeStatus(value))
            .and_then(SwipeStatus::try_from)
    }
}

impl From<SwipeStatus> for i8 {
    fn from(value: SwipeStatus) -> Self {
        value.as_i8()
    }
}

/// One recorded swipe, as stored in the actor's relation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    #[serde(alias = "id")]
    pub target_id: i64,
    pub swipe_status: SwipeStatus,
}

impl SwipeOutcome {
    pub fn new(target_id: i64, swipe_status: SwipeStatus) -> Self {
        Self {
            target_id,
            swipe_status,
        }
    }
}

/// Membership view over an actor's swipe history.
///
/// The backing list is append-only and may hold several entries for the same
/// target. Entries are consumed newest-first and the first occurrence of a
/// target is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationHistory {
    seen: HashMap<i64, SwipeStatus>,
}

impl RelationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries ordered newest-first
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SwipeOutcome>,
    {
        let mut history = Self::new();
        for outcome in entries {
            history.record(outcome);
        }
        history
    }

    /// Keep `outcome` unless its target is already present
    pub fn record(&mut self, outcome: SwipeOutcome) {
        self.seen
            .entry(outcome.target_id)
            .or_insert(outcome.swipe_status);
    }

    pub fn contains(&self, target_id: i64) -> bool {
        self.seen.contains_key(&target_id)
    }

    pub fn status(&self, target_id: i64) -> Option<SwipeStatus> {
        self.seen.get(&target_id).copied()
    }

    /// Number of distinct targets
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
