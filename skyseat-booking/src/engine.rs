use std::sync::Arc;
use chrono::Duration;
use skyseat_catalog::DiscountValidator;
use skyseat_core::notify::BookingNotifier;
use skyseat_core::repository::{BookingLedger, DiscountCatalog, FlightCatalog, SeatStore, ServiceCatalog};
use skyseat_core::Clock;

use crate::cancellation::{CancellationEngine, CancellationPolicy};
use crate::coordinator::ReservationCoordinator;
use crate::ledger::BookingQueries;
use crate::payment::PaymentProcessor;

/// Collaborators the engine is wired against
#[derive(Clone)]
pub struct EngineDeps {
    pub seats: Arc<dyn SeatStore>,
    pub ledger: Arc<dyn BookingLedger>,
    pub flights: Arc<dyn FlightCatalog>,
    pub services: Arc<dyn ServiceCatalog>,
    pub discounts: Arc<dyn DiscountCatalog>,
    pub notifier: Arc<dyn BookingNotifier>,
    pub clock: Arc<dyn Clock>,
}

impl EngineDeps {
    /// Wire every store-side collaborator to one backing store.
    pub fn from_store<S>(store: Arc<S>, notifier: Arc<dyn BookingNotifier>, clock: Arc<dyn Clock>) -> Self
    where
        S: SeatStore + BookingLedger + FlightCatalog + ServiceCatalog + DiscountCatalog + 'static,
    {
        Self {
            seats: store.clone(),
            ledger: store.clone(),
            flights: store.clone(),
            services: store.clone(),
            discounts: store,
            notifier,
            clock,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub cancellation_window: Duration,
    pub page_size: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cancellation_window: Duration::hours(24),
            page_size: 20,
        }
    }
}

/// The booking lifecycle engine: one handle per component
pub struct BookingEngine {
    pub coordinator: ReservationCoordinator,
    pub payments: PaymentProcessor,
    pub cancellations: CancellationEngine,
    pub queries: BookingQueries,
}

impl BookingEngine {
    pub fn new(deps: EngineDeps, settings: EngineSettings) -> Self {
        let coordinator = ReservationCoordinator::new(
            deps.seats.clone(),
            deps.ledger.clone(),
            deps.services.clone(),
            DiscountValidator::new(deps.discounts.clone()),
            deps.notifier.clone(),
            deps.clock.clone(),
        );

        let payments = PaymentProcessor::new(
            deps.ledger.clone(),
            deps.notifier.clone(),
            deps.clock.clone(),
        );

        let cancellations = CancellationEngine::new(
            deps.ledger.clone(),
            deps.seats.clone(),
            deps.flights.clone(),
            CancellationPolicy::new(settings.cancellation_window),
            deps.notifier.clone(),
            deps.clock.clone(),
        );

        let queries = BookingQueries::new(deps.ledger, deps.seats, settings.page_size);

        Self { coordinator, payments, cancellations, queries }
    }
}
