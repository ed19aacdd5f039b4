use std::sync::Arc;
use uuid::Uuid;
use skyseat_core::repository::{BookingLedger, SeatStore};
use skyseat_core::{Booking, BookingError, BookingResult, BookingSummary, Page, PageRequest, Seat, SeatClass, UserId};

/// Read paths over the booking ledger and seat inventory
pub struct BookingQueries {
    ledger: Arc<dyn BookingLedger>,
    seats: Arc<dyn SeatStore>,
    page_size: u32,
}

impl BookingQueries {
    pub fn new(ledger: Arc<dyn BookingLedger>, seats: Arc<dyn SeatStore>, page_size: u32) -> Self {
        Self { ledger, seats, page_size: page_size.max(1) }
    }

    pub async fn get_booking(&self, booking_id: Uuid, user_id: &UserId) -> BookingResult<Booking> {
        load_owned(self.ledger.as_ref(), booking_id, user_id).await
    }

    /// One page of the caller's bookings, newest first, with seat and flight details
    pub async fn list_user_bookings(&self, user_id: &UserId, page: u32) -> BookingResult<Page<BookingSummary>> {
        let request = PageRequest::new(page, self.page_size);
        Ok(self.ledger.list_user_bookings(user_id, request).await?)
    }

    pub async fn list_available_seats(&self, flight_id: i64, seat_class: SeatClass) -> BookingResult<Vec<Seat>> {
        Ok(self.seats.list_available(flight_id, seat_class).await?)
    }
}

/// Fetch a booking and check it belongs to `user_id`
pub(crate) async fn load_owned(
    ledger: &dyn BookingLedger,
    booking_id: Uuid,
    user_id: &UserId,
) -> BookingResult<Booking> {
    let booking = ledger.get_booking(booking_id).await?
        .ok_or(BookingError::BookingNotFound)?;

    if !booking.is_owned_by(user_id) {
        return Err(BookingError::Forbidden);
    }

    Ok(booking)
}
