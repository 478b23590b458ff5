use crate::models::User;

/// Swipes a non-premium user may have recorded before further swipes are refused
pub const DEFAULT_SWIPE_LIMIT: u64 = 10;

/// Swipe quota policy.
///
/// Derived on every attempt from the actor's premium flag and the length of
/// their relation history; nothing is persisted besides the history itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeQuota {
    limit: u64,
}

impl SwipeQuota {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Premium accounts are never capped
    pub fn applies_to(&self, user: &User) -> bool {
        !user.is_premium
    }

    /// A history of exactly `limit` entries still allows one more swipe
    pub fn is_exceeded(&self, history_len: u64) -> bool {
        history_len > self.limit
    }
}

impl Default for SwipeQuota {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_LIMIT)
    }
}
