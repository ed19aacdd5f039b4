pub mod clock;
pub mod identity;
pub mod models;
pub mod notify;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::UserId;
pub use models::{
    Booking, BookingStatus, BookingSummary, Discount, Flight, FlightStatus, Page, PageRequest,
    Seat, SeatClass, SeatStatus, Service,
};

/// Infrastructure failures raised by a store adapter.
///
/// These are never domain outcomes; callers may retry them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Constraint violated: {0}")]
    Conflict(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Closed set of outcomes the booking engine reports to its callers.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Seat is not available")]
    SeatUnavailable,
    #[error("Discount code is unknown or inactive")]
    DiscountInvalid,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Booking belongs to another user")]
    Forbidden,
    #[error("Booking is already paid")]
    AlreadyPaid,
    #[error("Booking is already canceled")]
    AlreadyCanceled,
    #[error("Booking is canceled")]
    BookingCanceled,
    #[error("Paid bookings cannot be canceled")]
    BookingPaid,
    #[error("Cancellation window has closed")]
    TooLateToCancel,
    #[error("Flight status does not allow cancellation")]
    FlightNotCancelable,
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl BookingError {
    /// Stable machine-readable code, used by the HTTP layer and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::SeatUnavailable => "SEAT_UNAVAILABLE",
            BookingError::DiscountInvalid => "DISCOUNT_INVALID",
            BookingError::BookingNotFound => "BOOKING_NOT_FOUND",
            BookingError::Forbidden => "FORBIDDEN",
            BookingError::AlreadyPaid => "ALREADY_PAID",
            BookingError::AlreadyCanceled => "ALREADY_CANCELED",
            BookingError::BookingCanceled => "BOOKING_CANCELED",
            BookingError::BookingPaid => "BOOKING_PAID",
            BookingError::TooLateToCancel => "TOO_LATE_TO_CANCEL",
            BookingError::FlightNotCancelable => "FLIGHT_NOT_CANCELABLE",
            BookingError::ValidationError(_) => "VALIDATION_ERROR",
            BookingError::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
