use crate::{config::DatabaseConfig, error::Result};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connections are opened on first use, so startup never waits on the database.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.url)?;

    tracing::info!(
        "Database pool configured with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

pub fn spawn_migrations(pool: PgPool) {
    tokio::spawn(async move {
        match sqlx::migrate!().run(&pool).await {
            Ok(()) => tracing::info!("Database migrations applied"),
            Err(e) => tracing::error!("Failed to run migrations: {}", e),
        }
    });
}

pub async fn check_health(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
