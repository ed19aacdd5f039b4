use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::identity::UserId;

/// Flight status as published by the flight catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Canceled,
    Completed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Canceled => "canceled",
            FlightStatus::Completed => "completed",
        }
    }

    /// Bookings on this flight may still be canceled by the customer.
    pub fn allows_cancellation(&self) -> bool {
        matches!(self, FlightStatus::Scheduled | FlightStatus::Delayed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeatClass {
    Economy,
    Business,
    FirstClass,
}

impl SeatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::Economy => "economy",
            SeatClass::Business => "business",
            SeatClass::FirstClass => "first_class",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Held,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Held => "held",
        }
    }
}

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Paid,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Paid => "paid",
            BookingStatus::Canceled => "canceled",
        }
    }

    /// Booked and paid bookings keep their seat held.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Booked | BookingStatus::Paid)
    }
}

macro_rules! impl_str_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(format!("unknown {} value: {}", stringify!($ty), s))
            }
        }
    };
}

impl_str_enum!(FlightStatus { Scheduled, Delayed, Canceled, Completed });
impl_str_enum!(SeatClass { Economy, Business, FirstClass });
impl_str_enum!(SeatStatus { Available, Held });
impl_str_enum!(BookingStatus { Booked, Paid, Canceled });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    pub departure_at: DateTime<Utc>,
    pub arrival_at: DateTime<Utc>,
    pub status: FlightStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub flight_id: i64,
    pub seat_number: String,
    pub seat_class: SeatClass,
    /// Minor currency units
    pub price: i64,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub code: String,
    pub percentage: i32,
    pub is_active: bool,
}

/// Add-on service (meal, baggage...) from the service catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

/// The durable record of a seat purchase.
///
/// All price fields are snapshots taken at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: UserId,
    pub seat_id: i64,
    pub service_id: Option<i64>,
    pub discount_code: Option<String>,
    pub seat_price: i64,
    pub service_price: i64,
    pub discount_value: i32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Booking joined with its seat and flight, for listing pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking: Booking,
    pub seat_number: String,
    pub seat_class: SeatClass,
    pub flight_id: i64,
    pub flight_number: String,
    pub departure_at: DateTime<Utc>,
    pub flight_status: FlightStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64)
    }
}
