use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

// Пул соединений к Postgres с заявками
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!("Opening database pool ({} connections)", config.pool_size);
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;

        Ok(Database { pool })
    }

    /// Создаёт таблицу `booking_requests`, если её ещё нет.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running booking_requests migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Schema is up to date");
        Ok(())
    }
}
