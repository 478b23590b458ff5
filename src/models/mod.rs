// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{InvalidSwipeStatus, RelationHistory, SwipeOutcome, SwipeStatus, User};
pub use requests::{GetProfilesRequest, SubscribeRequest, SwipeRequest};
pub use responses::{ErrorResponse, GetProfilesResponse, HealthResponse, SubscribeResponse, SwipeResponse};
