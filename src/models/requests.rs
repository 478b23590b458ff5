use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::SwipeStatus;

/// Query for the related profiles endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GetProfilesRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
}

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(range(min = 1))]
    pub swiped_user_id: i64,
    pub swipe_status: SwipeStatus,
}

/// Request to change a user's premium subscription
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
}
