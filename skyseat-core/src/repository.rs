use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::identity::UserId;
use crate::models::{Booking, BookingSummary, Discount, Flight, Page, PageRequest, Seat, SeatClass, Service};
use crate::StoreResult;

/// Result of an atomic seat claim
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The seat moved from available to held; carries the row as claimed.
    Claimed(Seat),
    /// The seat exists but is already held.
    Unavailable,
    NotFound,
}

/// Per-seat availability with an atomic claim/release.
#[async_trait]
pub trait SeatStore: Send + Sync {
    async fn get_seat(&self, seat_id: i64) -> StoreResult<Option<Seat>>;

    /// Available seats of a flight and class, ordered by seat number.
    async fn list_available(&self, flight_id: i64, seat_class: SeatClass) -> StoreResult<Vec<Seat>>;

    /// Compare-and-set available -> held. Exactly one concurrent caller wins.
    async fn claim_seat(&self, seat_id: i64) -> StoreResult<ClaimOutcome>;

    /// held -> available. No-op when the seat is already available or has an
    /// active booking.
    async fn release_seat(&self, seat_id: i64) -> StoreResult<()>;
}

/// Durable booking records. Rows are never deleted.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Fails with `StoreError::Conflict` if another active booking references the seat.
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>>;

    /// booked -> paid, guarded on the current status.
    /// Returns `None` when the booking was not in `booked` at write time.
    async fn mark_paid(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>>;

    /// booked -> canceled and the seat back to available, in one atomic write.
    /// Returns `None` when the booking was not in `booked` at write time.
    async fn cancel_and_release(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>>;

    /// Newest first.
    async fn list_user_bookings(&self, user_id: &UserId, page: PageRequest) -> StoreResult<Page<BookingSummary>>;
}

/// Read-only view of the flight catalog
#[async_trait]
pub trait FlightCatalog: Send + Sync {
    async fn get_flight(&self, flight_id: i64) -> StoreResult<Option<Flight>>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn get_service(&self, service_id: i64) -> StoreResult<Option<Service>>;
}

#[async_trait]
pub trait DiscountCatalog: Send + Sync {
    async fn find_discount(&self, code: &str) -> StoreResult<Option<Discount>>;
}
