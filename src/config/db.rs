// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Build the PostgreSQL pool shared by the location, session and friend repositories

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
}

/// Connect and verify the pool
/// DOCUMENTATION: Called once from main; fails fast when PostgreSQL is unreachable
pub async fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!(
        "Initializing database pool (max {} connections)",
        config.db_max_connections
    );

    let pool = pool_options(config).connect(&config.database_url).await?;

    // PostGIS is required for user_locations
    sqlx::query("SELECT PostGIS_Version()").execute(&pool).await?;

    log::info!("Database pool initialized successfully");
    Ok(pool)
}

/// Pool that connects on first use
pub fn init_lazy_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.database_url)
}
