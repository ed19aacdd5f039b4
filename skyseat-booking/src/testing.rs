//! Shared fixture for the engine's unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;
use skyseat_catalog::DiscountValidator;
use skyseat_core::notify::{BookingNotifier, NotifyError};
use skyseat_core::repository::{BookingLedger, ClaimOutcome, SeatStore, ServiceCatalog};
use skyseat_core::{
    Booking, BookingSummary, Discount, FixedClock, Flight, FlightStatus, Page, PageRequest, Seat, SeatClass,
    SeatStatus, Service, StoreError, StoreResult, UserId,
};
use skyseat_shared::BookingEvent;
use skyseat_store::MemoryStore;

use crate::coordinator::ReservationCoordinator;
use crate::engine::{BookingEngine, EngineDeps, EngineSettings};

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<BookingEvent>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { events: Mutex::new(Vec::new()), failing: true }
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.topic()).collect()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn notify(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        if self.failing {
            return Err(NotifyError("broker down".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct Fixture {
    pub engine: BookingEngine,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub flight_id: i64,
    pub departure_at: DateTime<Utc>,
}

pub const SERVICE_ID: i64 = 1;

impl Fixture {
    pub async fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier) -> Self {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let departure_at = now + Duration::days(10);
        let flight_id = 1;

        let store = Arc::new(MemoryStore::new());
        store.add_flight(Flight {
            id: flight_id,
            flight_number: "SK101".to_string(),
            departure_at,
            arrival_at: departure_at + Duration::hours(2),
            status: FlightStatus::Scheduled,
        }).await;

        let economy = [(1, "10A"), (2, "10B"), (3, "10C"), (4, "10D"), (42, "42C")];
        for (id, number) in economy {
            store.add_seat(seat(id, flight_id, number, SeatClass::Economy, 1_000_000)).await;
        }
        store.add_seat(seat(5, flight_id, "2A", SeatClass::Business, 3_500_000)).await;

        store.add_service(Service { id: SERVICE_ID, name: "Extra baggage".to_string(), price: 200_000 }).await;
        store.upsert_discount(Discount { code: "SPRING10".to_string(), percentage: 10, is_active: true }).await;
        store.upsert_discount(Discount { code: "WINTER20".to_string(), percentage: 20, is_active: false }).await;

        let clock = Arc::new(FixedClock::new(now));
        let notifier = Arc::new(notifier);

        let deps = EngineDeps::from_store(store.clone(), notifier.clone(), clock.clone());
        let settings = EngineSettings {
            cancellation_window: Duration::hours(24),
            page_size: 2,
        };

        Self {
            engine: BookingEngine::new(deps, settings),
            store,
            clock,
            notifier,
            flight_id,
            departure_at,
        }
    }

    /// A coordinator over the fixture's catalog, clock and notifier with some collaborators swapped out.
    pub fn coordinator_with(
        &self,
        seats: Arc<dyn SeatStore>,
        ledger: Arc<dyn BookingLedger>,
        services: Arc<dyn ServiceCatalog>,
    ) -> ReservationCoordinator {
        ReservationCoordinator::new(
            seats,
            ledger,
            services,
            DiscountValidator::new(self.store.clone()),
            self.notifier.clone(),
            self.clock.clone(),
        )
    }
}

/// Service catalog that answers only after `delay`
pub struct SlowServices {
    inner: Arc<MemoryStore>,
    delay: std::time::Duration,
}

impl SlowServices {
    pub fn new(inner: Arc<MemoryStore>, delay: std::time::Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ServiceCatalog for SlowServices {
    async fn get_service(&self, service_id: i64) -> StoreResult<Option<Service>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_service(service_id).await
    }
}

/// Ledger whose inserts fail as if the database were unreachable, until `recover`
pub struct FailingInserts {
    inner: Arc<MemoryStore>,
    failing: AtomicBool,
}

impl FailingInserts {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner, failing: AtomicBool::new(true) }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingLedger for FailingInserts {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.insert_booking(booking).await
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        self.inner.get_booking(booking_id).await
    }

    async fn mark_paid(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        self.inner.mark_paid(booking_id, at).await
    }

    async fn cancel_and_release(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        self.inner.cancel_and_release(booking_id, at).await
    }

    async fn list_user_bookings(&self, user_id: &UserId, page: PageRequest) -> StoreResult<Page<BookingSummary>> {
        self.inner.list_user_bookings(user_id, page).await
    }
}

/// Seat store whose first `failures` releases fail
pub struct FlakySeats {
    inner: Arc<MemoryStore>,
    failures: AtomicUsize,
    release_calls: AtomicUsize,
}

impl FlakySeats {
    pub fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self { inner, failures: AtomicUsize::new(failures), release_calls: AtomicUsize::new(0) }
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeatStore for FlakySeats {
    async fn get_seat(&self, seat_id: i64) -> StoreResult<Option<Seat>> {
        self.inner.get_seat(seat_id).await
    }

    async fn list_available(&self, flight_id: i64, seat_class: SeatClass) -> StoreResult<Vec<Seat>> {
        self.inner.list_available(flight_id, seat_class).await
    }

    async fn claim_seat(&self, seat_id: i64) -> StoreResult<ClaimOutcome> {
        self.inner.claim_seat(seat_id).await
    }

    async fn release_seat(&self, seat_id: i64) -> StoreResult<()> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.release_seat(seat_id).await
    }
}

fn seat(id: i64, flight_id: i64, number: &str, class: SeatClass, price: i64) -> Seat {
    Seat {
        id,
        flight_id,
        seat_number: number.to_string(),
        seat_class: class,
        price,
        status: SeatStatus::Available,
    }
}
