use std::sync::Arc;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use skyseat_api::{app, metrics::Metrics, middleware::issue_customer_token, state::{AppState, AuthConfig}};
use skyseat_booking::{BookingEngine, EngineDeps, EngineSettings};
use skyseat_core::{Discount, Flight, FlightStatus, Seat, SeatClass, SeatStatus, Service, SystemClock};
use skyseat_store::app_config::BusinessRules;
use skyseat_store::{LogNotifier, MemoryStore};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

async fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let departure_at = Utc::now() + Duration::days(10);

    store.add_flight(Flight {
        id: 1,
        flight_number: "SK101".to_string(),
        departure_at,
        arrival_at: departure_at + Duration::hours(2),
        status: FlightStatus::Scheduled,
    }).await;
    for (id, number) in [(1, "10A"), (2, "10B")] {
        store.add_seat(Seat {
            id,
            flight_id: 1,
            seat_number: number.to_string(),
            seat_class: SeatClass::Economy,
            price: 1_000_000,
            status: SeatStatus::Available,
        }).await;
    }
    store.add_service(Service { id: 1, name: "Extra baggage".to_string(), price: 200_000 }).await;
    store.upsert_discount(Discount { code: "SPRING10".to_string(), percentage: 10, is_active: true }).await;

    let deps = EngineDeps::from_store(store.clone(), Arc::new(LogNotifier), Arc::new(SystemClock));
    let state = AppState {
        engine: Arc::new(BookingEngine::new(deps, EngineSettings::default())),
        redis: None,
        metrics: Arc::new(Metrics::new().unwrap()),
        auth: AuthConfig { secret: SECRET.to_string() },
        business_rules: BusinessRules::default(),
    };

    (app(state), store)
}

fn token(user: &str) -> String {
    issue_customer_token(SECRET, user, Duration::hours(1)).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let (app, store) = test_app().await;

    let (status, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some("alice"),
        Some(json!({ "seat_id": 1, "service_id": 1, "discount_code": "SPRING10" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["total_price"], 1_080_000);
    assert_eq!(booking["status"], "booked");
    assert_eq!(store.seat_status(1).await, Some(SeatStatus::Held));

    let id = booking["id"].as_str().unwrap().to_string();

    let (status, paid) = send(&app, "POST", &format!("/v1/bookings/{}/pay", id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (status, err) = send(&app, "POST", &format!("/v1/bookings/{}/pay", id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "ALREADY_PAID");

    let (status, err) = send(&app, "POST", &format!("/v1/bookings/{}/cancel", id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "BOOKING_PAID");
}

#[tokio::test]
async fn test_second_booking_of_same_seat_conflicts() {
    let (app, _) = test_app().await;

    let (status, _) = send(&app, "POST", "/v1/bookings", Some("alice"), Some(json!({ "seat_id": 2 }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = send(&app, "POST", "/v1/bookings", Some("bob"), Some(json!({ "seat_id": 2 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "SEAT_UNAVAILABLE");
}

#[tokio::test]
async fn test_cancel_releases_seat_for_listing() {
    let (app, _) = test_app().await;

    let (_, booking) = send(&app, "POST", "/v1/bookings", Some("alice"), Some(json!({ "seat_id": 1 }))).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let (_, seats) = send(&app, "GET", "/v1/flights/1/seats", None, None).await;
    assert_eq!(seats.as_array().unwrap().len(), 1);

    let (status, canceled) = send(&app, "POST", &format!("/v1/bookings/{}/cancel", id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["status"], "canceled");

    let (_, seats) = send(&app, "GET", "/v1/flights/1/seats?class=economy", None, None).await;
    assert_eq!(seats.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_other_users_cannot_touch_booking() {
    let (app, _) = test_app().await;

    let (_, booking) = send(&app, "POST", "/v1/bookings", Some("alice"), Some(json!({ "seat_id": 1 }))).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let (status, err) = send(&app, "GET", &format!("/v1/bookings/{}", id), Some("mallory"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"], "FORBIDDEN");

    let (status, _) = send(&app, "POST", &format!("/v1/bookings/{}/pay", id), Some("mallory"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, err) = send(&app, "GET", &format!("/v1/bookings/{}", uuid::Uuid::new_v4()), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "BOOKING_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_discount_is_bad_request() {
    let (app, store) = test_app().await;

    let (status, err) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some("alice"),
        Some(json!({ "seat_id": 1, "discount_code": "NOPE" })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "DISCOUNT_INVALID");
    assert_eq!(store.seat_status(1).await, Some(SeatStatus::Available));
}

#[tokio::test]
async fn test_list_bookings_is_scoped_to_caller() {
    let (app, _) = test_app().await;

    send(&app, "POST", "/v1/bookings", Some("alice"), Some(json!({ "seat_id": 1 }))).await;
    send(&app, "POST", "/v1/bookings", Some("bob"), Some(json!({ "seat_id": 2 }))).await;

    let (status, page) = send(&app, "GET", "/v1/bookings?page=1", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["seat_number"], "10A");
    assert_eq!(page["items"][0]["flight_number"], "SK101");

    let (status, _) = send(&app, "GET", "/v1/bookings?page=0", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requests_without_valid_token_are_rejected() {
    let (app, _) = test_app().await;

    let (status, _) = send(&app, "GET", "/v1/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/v1/bookings")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_count_created_bookings() {
    let (app, _) = test_app().await;
    send(&app, "POST", "/v1/bookings", Some("alice"), Some(json!({ "seat_id": 1 }))).await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("skyseat_bookings_created_total 1"));
}
