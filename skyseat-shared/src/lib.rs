pub mod models;
pub mod pii;

pub use models::events::{BookingCanceledEvent, BookingCreatedEvent, BookingEvent, BookingPaidEvent};
pub use pii::Masked;
