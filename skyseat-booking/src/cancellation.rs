use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use tracing::info;
use skyseat_core::notify::BookingNotifier;
use skyseat_core::repository::{BookingLedger, FlightCatalog, SeatStore};
use skyseat_core::{Booking, BookingError, BookingResult, BookingStatus, Clock, Flight, StoreError, UserId};
use skyseat_shared::{BookingCanceledEvent, BookingEvent};

use crate::dispatch;
use crate::ledger::load_owned;

/// Time and status rules deciding whether a booking may be canceled.
#[derive(Debug, Clone, Copy)]
pub struct CancellationPolicy {
    window: Duration,
}

impl CancellationPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Status checks, in order: canceled, then paid.
    pub fn check_status(&self, booking: &Booking) -> BookingResult<()> {
        match booking.status {
            BookingStatus::Booked => Ok(()),
            BookingStatus::Canceled => Err(BookingError::AlreadyCanceled),
            BookingStatus::Paid => Err(BookingError::BookingPaid),
        }
    }

    /// Flight checks, in order: the cutoff before departure, then flight status.
    pub fn check_flight(&self, flight: &Flight, now: DateTime<Utc>) -> BookingResult<()> {
        if now > flight.departure_at - self.window {
            return Err(BookingError::TooLateToCancel);
        }
        if !flight.status.allows_cancellation() {
            return Err(BookingError::FlightNotCancelable);
        }
        Ok(())
    }
}

/// Cancels booked bookings and hands their seat back to inventory.
pub struct CancellationEngine {
    ledger: Arc<dyn BookingLedger>,
    seats: Arc<dyn SeatStore>,
    flights: Arc<dyn FlightCatalog>,
    policy: CancellationPolicy,
    notifier: Arc<dyn BookingNotifier>,
    clock: Arc<dyn Clock>,
}

impl CancellationEngine {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        seats: Arc<dyn SeatStore>,
        flights: Arc<dyn FlightCatalog>,
        policy: CancellationPolicy,
        notifier: Arc<dyn BookingNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { ledger, seats, flights, policy, notifier, clock }
    }

    pub async fn cancel(&self, booking_id: Uuid, user_id: &UserId) -> BookingResult<Booking> {
        let booking = load_owned(self.ledger.as_ref(), booking_id, user_id).await?;
        self.policy.check_status(&booking)?;

        let flight = self.flight_of(&booking).await?;
        let now = self.clock.now();
        self.policy.check_flight(&flight, now)?;

        let canceled = match self.ledger.cancel_and_release(booking_id, now).await? {
            Some(canceled) => canceled,
            None => {
                let current = self.ledger.get_booking(booking_id).await?
                    .ok_or(BookingError::BookingNotFound)?;
                self.policy.check_status(&current)?;
                return Err(StoreError::Corrupt(format!("booking {} stayed booked after guarded update", booking_id)).into());
            }
        };

        info!("Booking {} canceled, seat {} released", canceled.id, canceled.seat_id);

        dispatch(self.notifier.as_ref(), BookingEvent::Canceled(BookingCanceledEvent {
            booking_id: canceled.id,
            user_id: canceled.user_id.to_string(),
            seat_id: canceled.seat_id,
            timestamp: now.timestamp(),
        })).await;

        Ok(canceled)
    }

    async fn flight_of(&self, booking: &Booking) -> BookingResult<Flight> {
        let seat = self.seats.get_seat(booking.seat_id).await?
            .ok_or_else(|| StoreError::Corrupt(format!("booking {} references missing seat {}", booking.id, booking.seat_id)))?;

        let flight = self.flights.get_flight(seat.flight_id).await?
            .ok_or_else(|| StoreError::Corrupt(format!("seat {} references missing flight {}", seat.id, seat.flight_id)))?;

        Ok(flight)
    }
}
