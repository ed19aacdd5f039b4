use std::collections::HashMap;
use skyseat_core::{Seat, SeatClass, SeatStatus};

/// In-memory seat inventory.
///
/// Not synchronized itself: every mutation takes `&mut self`, so whoever owns it
/// decides the lock that makes claim a single check-then-set step.
pub struct SeatInventory {
    seats: HashMap<i64, Seat>,
}

impl SeatInventory {
    pub fn new() -> Self {
        Self {
            seats: HashMap::new(),
        }
    }

    /// Provision a seat (done by the flight layout, outside the booking flow)
    pub fn add_seat(&mut self, seat: Seat) {
        self.seats.insert(seat.id, seat);
    }

    pub fn get(&self, seat_id: i64) -> Option<&Seat> {
        self.seats.get(&seat_id)
    }

    pub fn list_available(&self, flight_id: i64, seat_class: SeatClass) -> Vec<Seat> {
        let mut seats: Vec<Seat> = self.seats.values()
            .filter(|s| s.flight_id == flight_id && s.seat_class == seat_class)
            .filter(|s| s.status == SeatStatus::Available)
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        seats
    }

    /// available -> held. Leaves the seat untouched on failure.
    pub fn claim(&mut self, seat_id: i64) -> Result<Seat, InventoryError> {
        let seat = self.seats.get_mut(&seat_id)
            .ok_or(InventoryError::NotFound(seat_id))?;

        if seat.status != SeatStatus::Available {
            return Err(InventoryError::AlreadyHeld(seat_id));
        }

        seat.status = SeatStatus::Held;
        Ok(seat.clone())
    }

    /// held -> available; releasing an available seat is a no-op
    pub fn release(&mut self, seat_id: i64) -> Result<(), InventoryError> {
        let seat = self.seats.get_mut(&seat_id)
            .ok_or(InventoryError::NotFound(seat_id))?;

        seat.status = SeatStatus::Available;
        Ok(())
    }

    /// Catalog-side price change. Existing bookings keep their snapshot.
    pub fn set_price(&mut self, seat_id: i64, price: i64) -> Result<(), InventoryError> {
        let seat = self.seats.get_mut(&seat_id)
            .ok_or(InventoryError::NotFound(seat_id))?;

        seat.price = price;
        Ok(())
    }
}

impl Default for SeatInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Seat not found: {0}")]
    NotFound(i64),

    #[error("Seat already held: {0}")]
    AlreadyHeld(i64),
}
