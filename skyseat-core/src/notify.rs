use async_trait::async_trait;
use skyseat_shared::BookingEvent;

#[derive(Debug, thiserror::Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Downstream notification hook, invoked after a state change is durable.
///
/// A failed notification is logged by the caller and never undoes the change.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, event: &BookingEvent) -> Result<(), NotifyError>;
}
