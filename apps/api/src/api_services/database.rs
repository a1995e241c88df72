use std::time::Duration;

use pulse_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Opens the event warehouse pool and brings the schema up to date.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|error| AppError::Unavailable(format!("event warehouse unreachable: {error}")))?;

    let migrator = sqlx::migrate!("../../crates/infrastructure/migrations");
    migrator
        .run(&pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to apply event table migrations: {error}"))
        })?;
    info!(migrations = migrator.iter().count(), "event tables ready");

    Ok(pool)
}
