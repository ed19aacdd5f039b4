use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyseat_core::BookingError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    ValidationError(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Booking(err) => {
                let status = match err {
                    BookingError::SeatUnavailable
                    | BookingError::AlreadyPaid
                    | BookingError::AlreadyCanceled
                    | BookingError::BookingCanceled
                    | BookingError::BookingPaid => StatusCode::CONFLICT,
                    BookingError::DiscountInvalid | BookingError::ValidationError(_) => StatusCode::BAD_REQUEST,
                    BookingError::TooLateToCancel | BookingError::FlightNotCancelable => StatusCode::UNPROCESSABLE_ENTITY,
                    BookingError::BookingNotFound => StatusCode::NOT_FOUND,
                    BookingError::Forbidden => StatusCode::FORBIDDEN,
                    BookingError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.code())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::ValidationError(msg) => msg,
            AppError::Booking(BookingError::Storage(err)) => {
                tracing::error!("Storage failure: {}", err);
                "Service temporarily unavailable".to_string()
            }
            AppError::Booking(err) => err.to_string(),
        };

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyseat_core::StoreError;

    #[test]
    fn test_booking_errors_map_to_statuses() {
        let cases = [
            (BookingError::SeatUnavailable, StatusCode::CONFLICT),
            (BookingError::DiscountInvalid, StatusCode::BAD_REQUEST),
            (BookingError::BookingNotFound, StatusCode::NOT_FOUND),
            (BookingError::Forbidden, StatusCode::FORBIDDEN),
            (BookingError::TooLateToCancel, StatusCode::UNPROCESSABLE_ENTITY),
            (BookingError::Storage(StoreError::Unavailable("down".into())), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
    }
}
