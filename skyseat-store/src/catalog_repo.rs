use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use skyseat_core::repository::{DiscountCatalog, FlightCatalog, ServiceCatalog};
use skyseat_core::{Discount, Flight, Service, StoreError, StoreResult};

use crate::database::{parse_column, store_error};

/// Read-only access to the catalog tables maintained by the management side.
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    flight_number: String,
    departure_at: DateTime<Utc>,
    arrival_at: DateTime<Utc>,
    status: String,
}

impl TryFrom<FlightRow> for Flight {
    type Error = StoreError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        Ok(Flight {
            id: row.id,
            flight_number: row.flight_number,
            departure_at: row.departure_at,
            arrival_at: row.arrival_at,
            status: parse_column("flights.status", &row.status)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    price: i64,
}

#[derive(sqlx::FromRow)]
struct DiscountRow {
    code: String,
    percentage: i32,
    is_active: bool,
}

#[async_trait]
impl FlightCatalog for PgCatalogRepository {
    async fn get_flight(&self, flight_id: i64) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(
            "SELECT id, flight_number, departure_at, arrival_at, status FROM flights WHERE id = $1",
        )
        .bind(flight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Flight::try_from).transpose()
    }
}

#[async_trait]
impl ServiceCatalog for PgCatalogRepository {
    async fn get_service(&self, service_id: i64) -> StoreResult<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT id, name, price FROM services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(row.map(|r| Service { id: r.id, name: r.name, price: r.price }))
    }
}

#[async_trait]
impl DiscountCatalog for PgCatalogRepository {
    async fn find_discount(&self, code: &str) -> StoreResult<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>("SELECT code, percentage, is_active FROM discounts WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(row.map(|r| Discount { code: r.code, percentage: r.percentage, is_active: r.is_active }))
    }
}
