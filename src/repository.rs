//! repository.rs
//!
//! Хранилище заявок. Воркфлоу видит только трейт [`BookingStore`], так что
//! Postgres-реализацию можно подменить в тестах.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{BookingRequest, JetCategory, NewBookingRequest};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    // Для хранилищ, не основанных на sqlx
    #[error("{0}")]
    Unavailable(String),
}

/// Append-only хранилище заявок.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Вставляет одну запись атомарно: либо строка целиком зафиксирована,
    /// либо от попытки не остаётся следа.
    async fn insert(&self, request: &NewBookingRequest) -> Result<BookingRequest, PersistenceError>;

    /// Все заявки, новые сверху.
    async fn list_newest_first(&self) -> Result<Vec<BookingRequest>, PersistenceError>;
}

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRequestRow {
    id: i64,
    created_at: DateTime<Utc>,
    full_name: String,
    email: String,
    phone: String,
    jet_category: String,
    departure: String,
    arrival: String,
    departure_date: NaiveDate,
    passengers: i32,
    special_requests: Option<String>,
}

impl TryFrom<BookingRequestRow> for BookingRequest {
    type Error = PersistenceError;

    fn try_from(row: BookingRequestRow) -> Result<Self, Self::Error> {
        let jet_category = row
            .jet_category
            .parse::<JetCategory>()
            .map_err(|e| PersistenceError::CorruptRow {
                id: row.id,
                reason: e.to_string(),
            })?;

        Ok(BookingRequest {
            id: row.id,
            created_at: row.created_at,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            jet_category,
            departure: row.departure,
            arrival: row.arrival,
            departure_date: row.departure_date,
            passengers: row.passengers,
            special_requests: row.special_requests,
        })
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    #[tracing::instrument(name = "Insert booking request", skip(self, request), fields(email = %request.email))]
    async fn insert(&self, request: &NewBookingRequest) -> Result<BookingRequest, PersistenceError> {
        // Незафиксированная транзакция откатывается при drop
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO booking_requests
                (full_name, email, phone, jet_category, departure, arrival,
                 departure_date, passengers, special_requests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, created_at
            "#,
        )
        .bind(&request.full_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.jet_category.as_str())
        .bind(&request.departure)
        .bind(&request.arrival)
        .bind(request.departure_date)
        .bind(request.passengers)
        .bind(request.special_requests.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BookingRequest::from_new(id, created_at, request.clone()))
    }

    #[tracing::instrument(name = "List booking requests", skip(self))]
    async fn list_newest_first(&self) -> Result<Vec<BookingRequest>, PersistenceError> {
        let rows = sqlx::query_as::<_, BookingRequestRow>(
            r#"
            SELECT id, created_at, full_name, email, phone, jet_category,
                   departure, arrival, departure_date, passengers, special_requests
            FROM booking_requests
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRequest::try_from).collect()
    }
}
