use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use skyseat_booking::CreateBooking;
use skyseat_core::{Booking, BookingSummary, Page, UserId};
use skyseat_shared::Masked;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub seat_id: i64,
    pub service_id: Option<i64>,
    pub discount_code: Option<String>,
}

impl From<CreateBookingRequest> for CreateBooking {
    fn from(req: CreateBookingRequest) -> Self {
        CreateBooking {
            seat_id: req.seat_id,
            service_id: req.service_id,
            discount_code: req.discount_code,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BookingPageResponse {
    pub items: Vec<BookingSummary>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Page<BookingSummary>> for BookingPageResponse {
    fn from(page: Page<BookingSummary>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/pay", post(pay_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    tracing::info!("Booking seat {} for user {}", req.seat_id, Masked(&user_id));

    match state.engine.coordinator.create_booking(&user_id, req.into()).await {
        Ok(booking) => {
            state.metrics.bookings_created.inc();
            Ok((StatusCode::CREATED, Json(booking)))
        }
        Err(e) => {
            state.metrics.record_failure("create", &e);
            Err(e.into())
        }
    }
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<BookingPageResponse>, AppError> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::ValidationError("page starts at 1".to_string()));
    }

    let bookings = state.engine.queries.list_user_bookings(&user_id, page).await?;
    Ok(Json(bookings.into()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.engine.queries.get_booking(id, &user_id).await?;
    Ok(Json(booking))
}

pub async fn pay_booking(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    match state.engine.payments.pay(id, &user_id).await {
        Ok(booking) => {
            state.metrics.bookings_paid.inc();
            Ok(Json(booking))
        }
        Err(e) => {
            state.metrics.record_failure("pay", &e);
            Err(e.into())
        }
    }
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    tracing::info!("Cancel requested for booking {} by user {}", id, Masked(&user_id));

    match state.engine.cancellations.cancel(id, &user_id).await {
        Ok(booking) => {
            state.metrics.bookings_canceled.inc();
            Ok(Json(booking))
        }
        Err(e) => {
            state.metrics.record_failure("cancel", &e);
            Err(e.into())
        }
    }
}
