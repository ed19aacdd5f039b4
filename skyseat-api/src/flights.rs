use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use skyseat_core::{Seat, SeatClass};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeatQuery {
    pub class: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/{id}/seats", get(list_available_seats))
}

/// Available seats of one cabin class, economy unless `?class=` says otherwise
pub async fn list_available_seats(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
    Query(query): Query<SeatQuery>,
) -> Result<Json<Vec<Seat>>, AppError> {
    let seat_class = match query.class.as_deref() {
        None => SeatClass::Economy,
        Some(raw) => raw.parse::<SeatClass>().map_err(AppError::ValidationError)?,
    };

    let seats = state.engine.queries.list_available_seats(flight_id, seat_class).await?;
    Ok(Json(seats))
}
