use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use skyseat_core::repository::{ClaimOutcome, SeatStore};
use skyseat_core::{Seat, SeatClass, StoreError, StoreResult};

use crate::database::{parse_column, store_error};

pub struct PgSeatRepository {
    pool: PgPool,
}

impl PgSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SeatRow {
    pub id: i64,
    pub flight_id: i64,
    pub seat_number: String,
    pub seat_class: String,
    pub price: i64,
    pub status: String,
}

impl TryFrom<SeatRow> for Seat {
    type Error = StoreError;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        Ok(Seat {
            id: row.id,
            flight_id: row.flight_id,
            seat_number: row.seat_number,
            seat_class: parse_column("seats.seat_class", &row.seat_class)?,
            price: row.price,
            status: parse_column("seats.status", &row.status)?,
        })
    }
}

#[async_trait]
impl SeatStore for PgSeatRepository {
    async fn get_seat(&self, seat_id: i64) -> StoreResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT id, flight_id, seat_number, seat_class, price, status FROM seats WHERE id = $1",
        )
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Seat::try_from).transpose()
    }

    async fn list_available(&self, flight_id: i64, seat_class: SeatClass) -> StoreResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT id, flight_id, seat_number, seat_class, price, status
            FROM seats
            WHERE flight_id = $1 AND seat_class = $2 AND status = 'available'
            ORDER BY seat_number
            "#,
        )
        .bind(flight_id)
        .bind(seat_class.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(Seat::try_from).collect()
    }

    async fn claim_seat(&self, seat_id: i64) -> StoreResult<ClaimOutcome> {
        // Single-statement compare-and-set; Postgres row locking serializes racers.
        let claimed = sqlx::query_as::<_, SeatRow>(
            r#"
            UPDATE seats SET status = 'held'
            WHERE id = $1 AND status = 'available'
            RETURNING id, flight_id, seat_number, seat_class, price, status
            "#,
        )
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        if let Some(row) = claimed {
            return Ok(ClaimOutcome::Claimed(Seat::try_from(row)?));
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM seats WHERE id = $1")
            .bind(seat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        debug!("Claim on seat {} lost (exists: {})", seat_id, exists.is_some());
        Ok(match exists {
            Some(_) => ClaimOutcome::Unavailable,
            None => ClaimOutcome::NotFound,
        })
    }

    async fn release_seat(&self, seat_id: i64) -> StoreResult<()> {
        // A seat with an active booking stays held
        sqlx::query(
            r#"
            UPDATE seats SET status = 'available'
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM bookings WHERE seat_id = $1 AND status IN ('booked', 'paid')
              )
            "#,
        )
        .bind(seat_id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}
