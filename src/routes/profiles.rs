use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::core::{GetProfilesError, MatchingEngine, SwipeError};
use crate::models::{
    ErrorResponse, GetProfilesRequest, GetProfilesResponse, HealthResponse, SubscribeRequest,
    SubscribeResponse, SwipeRequest, SwipeResponse,
};
use crate::services::{ProfileDirectory, RelationCache, SubscriptionRegistry};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
    pub directory: Arc<dyn ProfileDirectory>,
    pub relations: Arc<dyn RelationCache>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    pub request_timeout: Duration,
}

/// Configure all profile and swipe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/profiles/related", web::get().to(get_profiles))
        .route("/swipe", web::post().to(swipe))
        .route("/subscribe-premium", web::post().to(subscribe))
        .route("/unsubscribe-premium", web::post().to(unsubscribe));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

/// Token fired when the request outlives `timeout`.
///
/// Callers hold a drop guard on it so the timer stops with the handler.
fn request_token(timeout: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let timer = token.clone();
    actix_web::rt::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => timer.cancel(),
            _ = timer.cancelled() => {}
        }
    });
    token
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let directory_healthy = state.directory.health_check().await.is_ok();
    let cache_healthy = state.relations.health_check().await.is_ok();

    let status = if directory_healthy && cache_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Related profiles endpoint
///
/// GET /api/v1/profiles/related?userId={userId}
async fn get_profiles(
    state: web::Data<AppState>,
    query: web::Query<GetProfilesRequest>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let cancel = request_token(state.request_timeout);
    let _guard = cancel.clone().drop_guard();

    match state.engine.get_profiles(query.user_id, &cancel).await {
        Ok(profiles) => HttpResponse::Ok().json(GetProfilesResponse {
            total_results: profiles.len(),
            profiles,
        }),
        Err(e) => {
            let status = match &e {
                GetProfilesError::EmptyCandidatePool { .. } => StatusCode::NOT_FOUND,
                GetProfilesError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
                GetProfilesError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            };
            error_response(status, "Error fetching related profiles", e.to_string())
        }
    }
}

/// Swipe endpoint
///
/// POST /api/v1/swipe
///
/// Request body:
/// ```json
/// {
///   "user_id": 1,
///   "swiped_user_id": 2,
///   "swipe_status": 1
/// }
/// ```
async fn swipe(state: web::Data<AppState>, req: web::Json<SwipeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let cancel = request_token(state.request_timeout);
    let _guard = cancel.clone().drop_guard();

    match state
        .engine
        .swipe(req.user_id, req.swiped_user_id, req.swipe_status, &cancel)
        .await
    {
        Ok(receipt) => HttpResponse::Ok().json(SwipeResponse {
            success: true,
            history_len: receipt.history_len,
        }),
        Err(e) => {
            let status = match &e {
                SwipeError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                SwipeError::ActorLookupFailed(inner) if inner.is_not_found() => StatusCode::NOT_FOUND,
                SwipeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let error = if e.is_policy_rejection() {
                "Swipe limit reached"
            } else {
                "Error swiping profile"
            };
            error_response(status, error, e.to_string())
        }
    }
}

async fn subscribe(state: web::Data<AppState>, req: web::Json<SubscribeRequest>) -> impl Responder {
    update_subscription(&state, &req, true).await
}

async fn unsubscribe(state: web::Data<AppState>, req: web::Json<SubscribeRequest>) -> impl Responder {
    update_subscription(&state, &req, false).await
}

async fn update_subscription(state: &AppState, req: &SubscribeRequest, is_premium: bool) -> HttpResponse {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.subscriptions.set_premium(req.user_id, is_premium).await {
        Ok(()) => HttpResponse::Ok().json(SubscribeResponse {
            user_id: req.user_id,
            is_premium,
        }),
        Err(e) => {
            tracing::error!("Failed to update subscription for {}: {}", req.user_id, e);
            let status = if e.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, "Error updating subscription", e.to_string())
        }
    }
}
