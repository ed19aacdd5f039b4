use uuid::Uuid;

pub const TOPIC_BOOKING_CREATED: &str = "booking.created";
pub const TOPIC_BOOKING_PAID: &str = "booking.paid";
pub const TOPIC_BOOKING_CANCELED: &str = "booking.canceled";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub user_id: String,
    pub seat_id: i64,
    pub service_id: Option<i64>,
    pub discount_code: Option<String>,
    pub total_price: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingPaidEvent {
    pub booking_id: Uuid,
    pub user_id: String,
    pub total_price: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingCanceledEvent {
    pub booking_id: Uuid,
    pub user_id: String,
    pub seat_id: i64,
    pub timestamp: i64,
}

/// Envelope handed to notifiers once a booking state change is durable.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEvent {
    Created(BookingCreatedEvent),
    Paid(BookingPaidEvent),
    Canceled(BookingCanceledEvent),
}

impl BookingEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            BookingEvent::Created(_) => TOPIC_BOOKING_CREATED,
            BookingEvent::Paid(_) => TOPIC_BOOKING_PAID,
            BookingEvent::Canceled(_) => TOPIC_BOOKING_CANCELED,
        }
    }

    /// Partition key; all events of one booking land on the same partition.
    pub fn key(&self) -> Uuid {
        match self {
            BookingEvent::Created(e) => e.booking_id,
            BookingEvent::Paid(e) => e.booking_id,
            BookingEvent::Canceled(e) => e.booking_id,
        }
    }
}
