// libs/availability-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use availability_cell::{availability_routes, AvailabilityService, AvailabilityState, ScheduleRulesService};
use shared_config::{SchedulingConfig, DEFAULT_CLINIC_TIMEZONE};
use shared_database::{InMemoryRepository, ScheduleRepository};
use shared_utils::test_utils::{date, local_instant, weekly_rule};
use shared_utils::FixedClock;

fn create_test_app(repo: Arc<InMemoryRepository>) -> Router {
    let now = local_instant(DEFAULT_CLINIC_TIMEZONE, date(2024, 6, 1), "08:00");
    let availability = AvailabilityService::new(
        &SchedulingConfig::default(),
        repo.clone(),
        repo.clone(),
        Arc::new(FixedClock::new(now)),
    )
    .unwrap();

    availability_routes(Arc::new(AvailabilityState {
        availability: Arc::new(availability),
        rules: ScheduleRulesService::new(repo),
    }))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: String) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: String, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_get_available_slots() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    repo.create_weekly_rule(&weekly_rule(professional_id, 1, "09:00", "12:00"))
        .await
        .unwrap();
    let app = create_test_app(repo);

    let response = app
        .oneshot(get(format!("/{}/available-slots?date=2024-06-03", professional_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["timezone"], "America/Santiago");
    assert_eq!(
        body["slots"],
        json!([
            {"date": "2024-06-03", "start_time": "09:00", "end_time": "10:00", "available": true},
            {"date": "2024-06-03", "start_time": "10:00", "end_time": "11:00", "available": true},
            {"date": "2024-06-03", "start_time": "11:00", "end_time": "12:00", "available": true}
        ])
    );
}

#[tokio::test]
async fn test_malformed_date_is_bad_request() {
    let app = create_test_app(Arc::new(InMemoryRepository::new()));

    let response = app
        .oneshot(get(format!("/{}/available-slots?date=03-06-2024", Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("03-06-2024"));
}

#[tokio::test]
async fn test_out_of_horizon_date_is_empty_not_error() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    repo.create_weekly_rule(&weekly_rule(professional_id, 1, "09:00", "12:00"))
        .await
        .unwrap();
    let app = create_test_app(repo);

    let response = app
        .oneshot(get(format!("/{}/slot-grid?date=2024-09-02", professional_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["slots"], json!([]));
}

#[tokio::test]
async fn test_get_available_dates() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    repo.create_weekly_rule(&weekly_rule(professional_id, 1, "09:00", "12:00"))
        .await
        .unwrap();
    let app = create_test_app(repo);

    let response = app
        .oneshot(get(format!("/{}/available-dates", professional_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["dates"], json!(["2024-06-03", "2024-06-10"]));
}

#[tokio::test]
async fn test_create_weekly_rule_then_query() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    let app = create_test_app(repo);

    let response = app
        .clone()
        .oneshot(post(
            format!("/{}/weekly-rules", professional_id),
            json!({"weekday": 1, "start_time": "22:00", "end_time": "00:00"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get(format!("/{}/availability?date=2024-06-03", professional_id)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["availability"]["source"], "weekly_rules");
    assert_eq!(
        body["availability"]["windows"],
        json!([{"start_time": "22:00", "end_time": "00:00"}])
    );
}

#[tokio::test]
async fn test_invalid_weekly_rule_is_rejected() {
    let app = create_test_app(Arc::new(InMemoryRepository::new()));

    let response = app
        .oneshot(post(
            format!("/{}/weekly-rules", Uuid::new_v4()),
            json!({"weekday": 1, "start_time": "12:00", "end_time": "09:00"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_blocked_interval() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    repo.create_weekly_rule(&weekly_rule(professional_id, 1, "09:00", "12:00"))
        .await
        .unwrap();
    let app = create_test_app(repo);

    let response = app
        .clone()
        .oneshot(post(
            format!("/{}/blocked-intervals", professional_id),
            json!({
                "starts_at": "2024-06-03T10:00:00-04:00",
                "ends_at": "2024-06-03T10:30:00-04:00",
                "reason": "supervision"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get(format!("/{}/available-slots?date=2024-06-03", professional_id)))
        .await
        .unwrap();
    let starts: Vec<String> = body_json(response).await["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["start_time"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(starts, vec!["09:00", "11:00"]);
}
