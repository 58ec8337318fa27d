// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, logging and database, then run the routing server until Ctrl-C

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod server;
mod services;

use config::Config;
use dotenv::dotenv;
use server::ServerHandle;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    for warning in &config.warnings {
        log::warn!("{}", warning);
    }

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting locshare-routing...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Grid resolution {}, freshness window {}s, expansion budget {}",
        config.grid_resolution,
        config.freshness_window_secs,
        config.max_expansions
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Serve until interrupted
    let server = ServerHandle::start(&config, pool)?;

    tokio::signal::ctrl_c().await?;
    log::info!("Shutdown signal received");

    server.stop(true).await;
    server.wait().await
}
