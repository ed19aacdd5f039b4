use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use skyseat_core::repository::BookingLedger;
use skyseat_core::{Booking, BookingSummary, Page, PageRequest, StoreError, StoreResult, UserId};

use crate::database::{parse_column, store_error};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, seat_id, service_id, discount_code, seat_price, service_price, \
     discount_value, total_price, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: String,
    seat_id: i64,
    service_id: Option<i64>,
    discount_code: Option<String>,
    seat_price: i64,
    service_price: i64,
    discount_value: i32,
    total_price: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: UserId::new(row.user_id),
            seat_id: row.seat_id,
            service_id: row.service_id,
            discount_code: row.discount_code,
            seat_price: row.seat_price,
            service_price: row.service_price,
            discount_value: row.discount_value,
            total_price: row.total_price,
            status: parse_column("bookings.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    seat_number: String,
    seat_class: String,
    flight_id: i64,
    flight_number: String,
    departure_at: DateTime<Utc>,
    flight_status: String,
}

impl TryFrom<SummaryRow> for BookingSummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(BookingSummary {
            booking: Booking::try_from(row.booking)?,
            seat_number: row.seat_number,
            seat_class: parse_column("seats.seat_class", &row.seat_class)?,
            flight_id: row.flight_id,
            flight_number: row.flight_number,
            departure_at: row.departure_at,
            flight_status: parse_column("flights.status", &row.flight_status)?,
        })
    }
}

#[async_trait]
impl BookingLedger for PgBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        // The partial unique index on active bookings turns a double booking into a Conflict.
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, seat_id, service_id, discount_code, seat_price, service_price,
                                  discount_value, total_price, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id.as_str())
        .bind(booking.seat_id)
        .bind(booking.service_id)
        .bind(booking.discount_code.as_deref())
        .bind(booking.seat_price)
        .bind(booking.service_price)
        .bind(booking.discount_value)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn mark_paid(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = 'paid', updated_at = $2 WHERE id = $1 AND status = 'booked' RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn cancel_and_release(&self, booking_id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Booking>> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = 'canceled', updated_at = $2 WHERE id = $1 AND status = 'booked' RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(store_error)?;
            return Ok(None);
        };
        let booking = Booking::try_from(row)?;

        sqlx::query("UPDATE seats SET status = 'available' WHERE id = $1")
            .bind(booking.seat_id)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(Some(booking))
    }

    async fn list_user_bookings(&self, user_id: &UserId, page: PageRequest) -> StoreResult<Page<BookingSummary>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT b.id, b.user_id, b.seat_id, b.service_id, b.discount_code, b.seat_price, b.service_price,
                   b.discount_value, b.total_price, b.status, b.created_at, b.updated_at,
                   s.seat_number, s.seat_class, f.id AS flight_id, f.flight_number, f.departure_at,
                   f.status AS flight_status
            FROM bookings b
            JOIN seats s ON s.id = b.seat_id
            JOIN flights f ON f.id = s.flight_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC, b.seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(page.per_page as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let items = rows.into_iter()
            .map(BookingSummary::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total: total.max(0) as u64,
        })
    }
}
