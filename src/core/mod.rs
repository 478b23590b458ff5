// Core engine exports
pub mod cancel;
pub mod engine;
pub mod error;
pub mod filters;
pub mod quota;

pub use cancel::{guard, Cancelled};
pub use engine::{MatchingEngine, SwipeReceipt};
pub use error::{FetchError, GetProfilesError, StoreKind, SwipeError};
pub use filters::{exclude_seen, is_unseen};
pub use quota::{SwipeQuota, DEFAULT_SWIPE_LIMIT};
