use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use tracing::{error, info, warn};
use skyseat_catalog::{DiscountError, DiscountValidator, PriceSnapshot, ValidDiscount};
use skyseat_core::notify::BookingNotifier;
use skyseat_core::repository::{BookingLedger, ClaimOutcome, SeatStore, ServiceCatalog};
use skyseat_core::{Booking, BookingError, BookingResult, BookingStatus, Clock, Seat, StoreError, UserId};
use skyseat_shared::{BookingCreatedEvent, BookingEvent};

use crate::dispatch;

const RELEASE_ATTEMPTS: usize = 3;
const RELEASE_BACKOFF_START: Duration = Duration::from_millis(50);
const RELEASE_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// What the caller picked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBooking {
    pub seat_id: i64,
    pub service_id: Option<i64>,
    pub discount_code: Option<String>,
}

impl CreateBooking {
    pub fn seat(seat_id: i64) -> Self {
        Self { seat_id, ..Default::default() }
    }

    pub fn with_service(mut self, service_id: i64) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn with_discount(mut self, code: &str) -> Self {
        self.discount_code = Some(code.to_string());
        self
    }

    fn validate(&self) -> BookingResult<()> {
        if self.seat_id <= 0 {
            return Err(BookingError::ValidationError(format!("invalid seat id {}", self.seat_id)));
        }
        if matches!(self.service_id, Some(id) if id <= 0) {
            return Err(BookingError::ValidationError("invalid service id".to_string()));
        }
        Ok(())
    }

    /// Blank codes count as no code.
    fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Turns a seat pick into a booking.
///
/// The seat is claimed first; every failure after a successful claim releases it
/// again, so a held seat always has a booking behind it.
#[derive(Clone)]
pub struct ReservationCoordinator {
    seats: Arc<dyn SeatStore>,
    ledger: Arc<dyn BookingLedger>,
    services: Arc<dyn ServiceCatalog>,
    discounts: DiscountValidator,
    notifier: Arc<dyn BookingNotifier>,
    clock: Arc<dyn Clock>,
}

impl ReservationCoordinator {
    pub fn new(
        seats: Arc<dyn SeatStore>,
        ledger: Arc<dyn BookingLedger>,
        services: Arc<dyn ServiceCatalog>,
        discounts: DiscountValidator,
        notifier: Arc<dyn BookingNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { seats, ledger, services, discounts, notifier, clock }
    }

    pub async fn create_booking(&self, user_id: &UserId, request: CreateBooking) -> BookingResult<Booking> {
        if user_id.as_str().trim().is_empty() {
            return Err(BookingError::ValidationError("missing user id".to_string()));
        }
        request.validate()?;

        // Claim through insert runs on its own task, so a caller that goes away
        // mid-flight cannot leave the seat held without a booking.
        let worker = self.clone();
        let user_id = user_id.clone();
        tokio::spawn(async move { worker.reserve(&user_id, request).await })
            .await
            .map_err(|e| StoreError::Unavailable(format!("booking task aborted: {}", e)))?
    }

    async fn reserve(&self, user_id: &UserId, request: CreateBooking) -> BookingResult<Booking> {
        // 1. Claim
        let seat = match self.seats.claim_seat(request.seat_id).await? {
            ClaimOutcome::Claimed(seat) => seat,
            ClaimOutcome::Unavailable => {
                info!("Seat {} already held, rejecting booking", request.seat_id);
                return Err(BookingError::SeatUnavailable);
            }
            ClaimOutcome::NotFound => {
                return Err(BookingError::ValidationError(format!("unknown seat {}", request.seat_id)));
            }
        };

        // 2-5. Price, snapshot, record
        match self.record_booking(user_id, &seat, &request).await {
            Ok(booking) => {
                info!("Booking {} created for seat {} (total {})", booking.id, seat.id, booking.total_price);
                dispatch(self.notifier.as_ref(), created_event(&booking, self.clock.now().timestamp())).await;
                Ok(booking)
            }
            Err(BookingError::Storage(StoreError::Conflict(reason))) => {
                // The ledger already has an active booking on this seat; it owns the hold.
                warn!("Seat {} claimed but ledger rejected insert: {}", seat.id, reason);
                Err(BookingError::SeatUnavailable)
            }
            Err(err) => {
                self.release_claim(seat.id, &err).await;
                Err(err)
            }
        }
    }

    async fn record_booking(&self, user_id: &UserId, seat: &Seat, request: &CreateBooking) -> BookingResult<Booking> {
        let service_price = match request.service_id {
            Some(service_id) => self.services.get_service(service_id).await?
                .ok_or_else(|| BookingError::ValidationError(format!("unknown service {}", service_id)))?
                .price,
            None => 0,
        };

        let discount = match request.discount_code() {
            Some(code) => Some(self.validate_discount(code).await?),
            None => None,
        };

        let snapshot = PriceSnapshot::compute(seat.price, service_price, discount.as_ref())
            .map_err(|e| BookingError::ValidationError(e.to_string()))?;

        let now = self.clock.now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            seat_id: seat.id,
            service_id: request.service_id,
            discount_code: discount.map(|d| d.code),
            seat_price: snapshot.seat_price,
            service_price: snapshot.service_price,
            discount_value: snapshot.discount_value,
            total_price: snapshot.total_price,
            status: BookingStatus::Booked,
            created_at: now,
            updated_at: now,
        };

        self.ledger.insert_booking(&booking).await?;
        Ok(booking)
    }

    async fn validate_discount(&self, code: &str) -> BookingResult<ValidDiscount> {
        self.discounts.validate(code).await.map_err(|e| match e {
            DiscountError::Invalid(_) => BookingError::DiscountInvalid,
            DiscountError::Storage(e) => BookingError::Storage(e),
        })
    }

    /// Compensating release after a failed booking attempt.
    async fn release_claim(&self, seat_id: i64, cause: &BookingError) {
        warn!("Releasing seat {} after failed booking: {}", seat_id, cause);

        for attempt in 1..=RELEASE_ATTEMPTS {
            match self.seats.release_seat(seat_id).await {
                Ok(()) => return,
                Err(e) => error!("Release of seat {} failed (attempt {}/{}): {}", seat_id, attempt, RELEASE_ATTEMPTS, e),
            }
        }

        warn!("Seat {} still held, retrying release in the background", seat_id);
        tokio::spawn(release_until_done(self.seats.clone(), seat_id));
    }
}

/// Keeps releasing with capped exponential backoff until the store accepts it.
async fn release_until_done(seats: Arc<dyn SeatStore>, seat_id: i64) {
    let mut delay = RELEASE_BACKOFF_START;
    loop {
        tokio::time::sleep(delay).await;
        match seats.release_seat(seat_id).await {
            Ok(()) => {
                info!("Seat {} released after retries", seat_id);
                return;
            }
            Err(e) => {
                error!("Background release of seat {} failed: {}", seat_id, e);
                delay = (delay * 2).min(RELEASE_BACKOFF_MAX);
            }
        }
    }
}

fn created_event(booking: &Booking, timestamp: i64) -> BookingEvent {
    BookingEvent::Created(BookingCreatedEvent {
        booking_id: booking.id,
        user_id: booking.user_id.to_string(),
        seat_id: booking.seat_id,
        service_id: booking.service_id,
        discount_code: booking.discount_code.clone(),
        total_price: booking.total_price,
        timestamp,
    })
}
