use async_trait::async_trait;
use tracing::info;
use skyseat_core::notify::{BookingNotifier, NotifyError};
use skyseat_shared::BookingEvent;

/// Notifier that only records events in the log; used when no broker is configured.
pub struct LogNotifier;

#[async_trait]
impl BookingNotifier for LogNotifier {
    async fn notify(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(event).map_err(|e| NotifyError(e.to_string()))?;
        info!(topic = event.topic(), key = %event.key(), "{}", payload);
        Ok(())
    }
}
