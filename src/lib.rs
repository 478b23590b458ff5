//! Swipe Match - profile recommendation and swipe quota service
//!
//! The matching engine combines a durable profile directory with an
//! expiring relation cache: it hides profiles a user has already swiped on
//! and caps how many swipes a non-premium user may record.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{GetProfilesError, MatchingEngine, SwipeError, SwipeQuota, SwipeReceipt};
pub use models::{RelationHistory, SwipeOutcome, SwipeStatus, User};
pub use services::{ProfileDirectory, RelationCache, SubscriptionRegistry};
