use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use skyseat_catalog::{InventoryError, SeatInventory};
use skyseat_core::repository::{BookingLedger, ClaimOutcome, DiscountCatalog, FlightCatalog, SeatStore, ServiceCatalog};
use skyseat_core::{
    Booking, BookingStatus, BookingSummary, Discount, Flight, FlightStatus, Page, PageRequest, Seat, SeatClass,
    SeatStatus, Service, StoreError, StoreResult, UserId,
};

#[derive(Default)]
struct MemoryState {
    inventory: SeatInventory,
    bookings: HashMap<Uuid, Booking>,
    /// Insertion order, oldest first
    booking_order: Vec<Uuid>,
    flights: HashMap<i64, Flight>,
    services: HashMap<i64, Service>,
    discounts: HashMap<String, Discount>,
}

impl MemoryState {
    fn has_active_booking(&self, seat_id: i64) -> bool {
        self.bookings.values().any(|b| b.seat_id == seat_id && b.status.is_active())
    }
}

/// Store backed by process memory, for tests and local runs.
///
/// Every operation runs under a single write or read guard, which makes claim a
/// check-then-set step and couples seat and booking updates.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_flight(&self, flight: Flight) {
        self.state.write().await.flights.insert(flight.id, flight);
    }

    pub async fn add_seat(&self, seat: Seat) {
        self.state.write().await.inventory.add_seat(seat);
    }

    pub async fn add_service(&self, service: Service) {
        self.state.write().await.services.insert(service.id, service);
    }

    pub async fn upsert_discount(&self, discount: Discount) {
        self.state.write().await.discounts.insert(discount.code.clone(), discount);
    }

    pub async fn set_seat_price(&self, seat_id: i64, price: i64) -> Result<(), InventoryError> {
        self.state.write().await.inventory.set_price(seat_id, price)
    }

    pub async fn set_flight_status(&self, flight_id: i64, status: FlightStatus) {
        if let Some(flight) = self.state.write().await.flights.get_mut(&flight_id) {
            flight.status = status;
        }
    }

    pub async fn seat_status(&self, seat_id: i64) -> Option<SeatStatus> {
        self.state.read().await.inventory.get(seat_id).map(|s| s.status)
    }

    pub async fn active_bookings_for_seat(&self, seat_id: i64) -> Vec<Booking> {
        self.state.read().await.bookings.values()
            .filter(|b| b.seat_id == seat_id && b.status.is_active())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SeatStore for MemoryStore {
    async fn get_seat(&self, seat_id: i64) -> StoreResult<Option<Seat>> {
        Ok(self.state.read().await.inventory.get(seat_id).cloned())
    }

    async fn list_available(&self, flight_id: i64, seat_class: SeatClass) -> StoreResult<Vec<Seat>> {
        Ok(self.state.read().await.inventory.list_available(flight_id, seat_class))
    }

    async fn claim_seat(&self, seat_id: i64) -> StoreResult<ClaimOutcome> {
        let mut state = self.state.write().await;
        match state.inventory.claim(seat_id) {
            Ok(seat) => Ok(ClaimOutcome::Claimed(seat)),
            Err(InventoryError::AlreadyHeld(_)) => Ok(ClaimOutcome::Unavailable),
            Err(InventoryError::NotFound(_)) => Ok(ClaimOutcome::NotFound),
        }
    }

    async fn release_seat(&self, seat_id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        // A seat with an active booking stays held
        if state.has_active_booking(seat_id) {
            return Ok(());
        }
        state.inventory.release(seat_id)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

#[async_trait]
impl BookingLedger for MemoryStore {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if booking.status.is_active() && state.has_active_booking(booking.seat_id) {
            return Err(StoreError::Conflict(format!("seat {} already has an active booking", booking.seat_id)));
        }
        if state.bookings.contains_key(&booking.id) {
            return Err(StoreError::Conflict(format!("booking {} already exists", booking.id)));
        }

        state.booking_order.push(booking.id);
        state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&booking_id).cloned())
    }

    async fn mark_paid(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        let mut state = self.state.write().await;
        let Some(booking) = state.bookings.get_mut(&booking_id) else {
            return Ok(None);
        };
        if booking.status != BookingStatus::Booked {
            return Ok(None);
        }

        booking.status = BookingStatus::Paid;
        booking.updated_at = at;
        Ok(Some(booking.clone()))
    }

    async fn cancel_and_release(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        let mut state = self.state.write().await;
        let seat_id = match state.bookings.get(&booking_id) {
            Some(b) if b.status == BookingStatus::Booked => b.seat_id,
            _ => return Ok(None),
        };

        // Check the seat first so a failure leaves both rows untouched.
        if state.inventory.get(seat_id).is_none() {
            return Err(StoreError::Corrupt(format!("booking {} references missing seat {}", booking_id, seat_id)));
        }
        state.inventory.release(seat_id)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let booking = state.bookings.get_mut(&booking_id)
            .ok_or_else(|| StoreError::Corrupt(format!("booking {} vanished", booking_id)))?;
        booking.status = BookingStatus::Canceled;
        booking.updated_at = at;
        Ok(Some(booking.clone()))
    }

    async fn list_user_bookings(&self, user_id: &UserId, page: PageRequest) -> StoreResult<Page<BookingSummary>> {
        let state = self.state.read().await;

        let owned: Vec<&Booking> = state.booking_order.iter().rev()
            .filter_map(|id| state.bookings.get(id))
            .filter(|b| b.is_owned_by(user_id))
            .collect();

        let total = owned.len() as u64;
        let items = owned.into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .map(|booking| {
                let seat = state.inventory.get(booking.seat_id)
                    .ok_or_else(|| StoreError::Corrupt(format!("missing seat {}", booking.seat_id)))?;
                let flight = state.flights.get(&seat.flight_id)
                    .ok_or_else(|| StoreError::Corrupt(format!("missing flight {}", seat.flight_id)))?;

                Ok(BookingSummary {
                    booking: booking.clone(),
                    seat_number: seat.seat_number.clone(),
                    seat_class: seat.seat_class,
                    flight_id: flight.id,
                    flight_number: flight.flight_number.clone(),
                    departure_at: flight.departure_at,
                    flight_status: flight.status,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page { items, page: page.page, per_page: page.per_page, total })
    }
}

#[async_trait]
impl FlightCatalog for MemoryStore {
    async fn get_flight(&self, flight_id: i64) -> StoreResult<Option<Flight>> {
        Ok(self.state.read().await.flights.get(&flight_id).cloned())
    }
}

#[async_trait]
impl ServiceCatalog for MemoryStore {
    async fn get_service(&self, service_id: i64) -> StoreResult<Option<Service>> {
        Ok(self.state.read().await.services.get(&service_id).cloned())
    }
}

#[async_trait]
impl DiscountCatalog for MemoryStore {
    async fn find_discount(&self, code: &str) -> StoreResult<Option<Discount>> {
        Ok(self.state.read().await.discounts.get(code).cloned())
    }
}
