use std::sync::Arc;
use uuid::Uuid;
use tracing::info;
use skyseat_core::notify::BookingNotifier;
use skyseat_core::repository::BookingLedger;
use skyseat_core::{Booking, BookingError, BookingResult, BookingStatus, Clock, StoreError, UserId};
use skyseat_shared::{BookingEvent, BookingPaidEvent};

use crate::dispatch;
use crate::ledger::load_owned;

/// Moves a booking from booked to paid, at most once.
pub struct PaymentProcessor {
    ledger: Arc<dyn BookingLedger>,
    notifier: Arc<dyn BookingNotifier>,
    clock: Arc<dyn Clock>,
}

impl PaymentProcessor {
    pub fn new(ledger: Arc<dyn BookingLedger>, notifier: Arc<dyn BookingNotifier>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, notifier, clock }
    }

    /// A second payment is reported as `AlreadyPaid`, not as success.
    pub async fn pay(&self, booking_id: Uuid, user_id: &UserId) -> BookingResult<Booking> {
        let booking = load_owned(self.ledger.as_ref(), booking_id, user_id).await?;
        ensure_payable(&booking)?;

        let now = self.clock.now();
        let paid = match self.ledger.mark_paid(booking_id, now).await? {
            Some(paid) => paid,
            None => {
                // Lost a race with another payment or a cancellation; report what won.
                let current = self.ledger.get_booking(booking_id).await?
                    .ok_or(BookingError::BookingNotFound)?;
                ensure_payable(&current)?;
                return Err(StoreError::Corrupt(format!("booking {} stayed booked after guarded update", booking_id)).into());
            }
        };

        info!("Booking {} paid ({})", paid.id, paid.total_price);

        dispatch(self.notifier.as_ref(), BookingEvent::Paid(BookingPaidEvent {
            booking_id: paid.id,
            user_id: paid.user_id.to_string(),
            total_price: paid.total_price,
            timestamp: now.timestamp(),
        })).await;

        Ok(paid)
    }
}

fn ensure_payable(booking: &Booking) -> BookingResult<()> {
    match booking.status {
        BookingStatus::Booked => Ok(()),
        BookingStatus::Paid => Err(BookingError::AlreadyPaid),
        BookingStatus::Canceled => Err(BookingError::BookingCanceled),
    }
}
