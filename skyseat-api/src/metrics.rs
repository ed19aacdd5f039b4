use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use skyseat_core::BookingError;

/// Booking lifecycle counters exposed on `/metrics`
pub struct Metrics {
    registry: Registry,
    pub bookings_created: IntCounter,
    pub bookings_paid: IntCounter,
    pub bookings_canceled: IntCounter,
    pub booking_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let bookings_created = IntCounter::new("skyseat_bookings_created_total", "Bookings created")?;
        let bookings_paid = IntCounter::new("skyseat_bookings_paid_total", "Bookings paid")?;
        let bookings_canceled = IntCounter::new("skyseat_bookings_canceled_total", "Bookings canceled")?;
        let booking_failures = IntCounterVec::new(
            Opts::new("skyseat_booking_failures_total", "Rejected booking operations by error code"),
            &["operation", "code"],
        )?;

        registry.register(Box::new(bookings_created.clone()))?;
        registry.register(Box::new(bookings_paid.clone()))?;
        registry.register(Box::new(bookings_canceled.clone()))?;
        registry.register(Box::new(booking_failures.clone()))?;

        Ok(Self {
            registry,
            bookings_created,
            bookings_paid,
            bookings_canceled,
            booking_failures,
        })
    }

    pub fn record_failure(&self, operation: &str, err: &BookingError) {
        self.booking_failures.with_label_values(&[operation, err.code()]).inc();
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
