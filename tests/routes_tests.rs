// HTTP mapping tests for Swipe Match

use actix_web::{http::StatusCode, test, web, App};
use std::sync::Arc;
use std::time::Duration;
use swipe_match::core::{MatchingEngine, SwipeQuota};
use swipe_match::models::{
    ErrorResponse, GetProfilesResponse, SubscribeResponse, SwipeOutcome, SwipeResponse, SwipeStatus,
    User,
};
use swipe_match::routes::{configure_routes, AppState};
use swipe_match::services::{MemoryDirectory, MemoryRelationCache, ProfileDirectory, RelationCache};

fn create_user(id: i64, is_premium: bool) -> User {
    User {
        id,
        username: format!("user{}", id),
        password: "hashed".to_string(),
        full_name: format!("User {}", id),
        email: format!("user{}@example.com", id),
        is_premium,
    }
}

fn create_state(users: Vec<User>) -> (AppState, Arc<MemoryDirectory>, Arc<MemoryRelationCache>) {
    let directory = Arc::new(MemoryDirectory::with_users(users));
    let relations = Arc::new(MemoryRelationCache::new());
    let engine = MatchingEngine::new(directory.clone(), relations.clone(), SwipeQuota::default());

    let state = AppState {
        engine,
        directory: directory.clone(),
        relations: relations.clone(),
        subscriptions: directory.clone(),
        request_timeout: Duration::from_secs(5),
    };
    (state, directory, relations)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_healthy() {
    let (state, _, _) = create_state(vec![]);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_related_profiles_filters_seen() {
    let (state, _, relations) = create_state((1..=4).map(|id| create_user(id, false)).collect());
    relations
        .seed(1, vec![SwipeOutcome::new(3, SwipeStatus::Passed)])
        .await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles/related?userId=1")
        .to_request();
    let body: GetProfilesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.total_results, 2);
    assert_eq!(body.profiles.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 4]);
}

#[actix_web::test]
async fn test_related_profiles_never_exposes_password() {
    let (state, _, _) = create_state(vec![create_user(1, false), create_user(2, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles/related?userId=1")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["profiles"][0].get("password").is_none());
}

#[actix_web::test]
async fn test_empty_pool_is_not_found() {
    let (state, _, _) = create_state(vec![create_user(1, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles/related?userId=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_missing_user_id_is_bad_request() {
    let (state, _, _) = create_state(vec![create_user(1, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/profiles/related").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_swipe_records_outcome() {
    let (state, _, relations) = create_state(vec![create_user(1, false), create_user(2, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(serde_json::json!({
            "user_id": 1,
            "swiped_user_id": 2,
            "swipe_status": -1
        }))
        .to_request();
    let body: SwipeResponse = test::call_and_read_body_json(&app, req).await;

    assert!(body.success);
    assert_eq!(body.history_len, Some(1));
    let history = relations.read_history_set(1).await.unwrap();
    assert_eq!(history.status(2), Some(SwipeStatus::Passed));
}

#[actix_web::test]
async fn test_swipe_over_quota_is_too_many_requests() {
    let (state, _, relations) = create_state(vec![create_user(1, false), create_user(2, false)]);
    relations
        .seed(
            1,
            (0..11)
                .map(|i| SwipeOutcome::new(100 + i, SwipeStatus::Liked))
                .collect(),
        )
        .await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(serde_json::json!({
            "user_id": 1,
            "swiped_user_id": 2,
            "swipe_status": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Swipe limit reached");
    assert_eq!(body.status_code, 429);
}

#[actix_web::test]
async fn test_swipe_unknown_actor_is_not_found() {
    let (state, _, _) = create_state(vec![create_user(2, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(serde_json::json!({
            "user_id": 1,
            "swiped_user_id": 2,
            "swipe_status": 0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_swipe_status_is_bad_request() {
    let (state, _, _) = create_state(vec![create_user(1, false), create_user(2, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(serde_json::json!({
            "user_id": 1,
            "swiped_user_id": 2,
            "swipe_status": 5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
}

#[actix_web::test]
async fn test_subscribe_lifts_quota() {
    let (state, directory, relations) = create_state(vec![create_user(1, false), create_user(2, false)]);
    relations
        .seed(
            1,
            (0..11)
                .map(|i| SwipeOutcome::new(100 + i, SwipeStatus::Liked))
                .collect(),
        )
        .await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/subscribe-premium")
        .set_json(serde_json::json!({ "user_id": 1 }))
        .to_request();
    let body: SubscribeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.is_premium);
    assert!(directory.lookup_by_identity(1).await.unwrap().is_premium);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(serde_json::json!({
            "user_id": 1,
            "swiped_user_id": 2,
            "swipe_status": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/unsubscribe-premium")
        .set_json(serde_json::json!({ "user_id": 1 }))
        .to_request();
    let body: SubscribeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!body.is_premium);
}

#[actix_web::test]
async fn test_subscribe_unknown_user_is_not_found() {
    let (state, _, _) = create_state(vec![create_user(1, false)]);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/subscribe-premium")
        .set_json(serde_json::json!({ "user_id": 42 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
