pub mod coordinator;
pub mod payment;
pub mod cancellation;
pub mod ledger;
pub mod engine;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CreateBooking, ReservationCoordinator};
pub use payment::PaymentProcessor;
pub use cancellation::{CancellationEngine, CancellationPolicy};
pub use ledger::BookingQueries;
pub use engine::{BookingEngine, EngineDeps, EngineSettings};

use skyseat_core::notify::BookingNotifier;
use skyseat_shared::BookingEvent;

/// Hand an event to the notifier. Failures are logged, never propagated.
pub(crate) async fn dispatch(notifier: &dyn BookingNotifier, event: BookingEvent) {
    if let Err(e) = notifier.notify(&event).await {
        tracing::warn!("Failed to publish {} for booking {}: {}", event.topic(), event.key(), e);
    }
}
