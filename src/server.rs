// src/server.rs
// DOCUMENTATION: HTTP server lifecycle
// PURPOSE: Start, stop and await the actix server from an owned handle

use crate::config::Config;
use crate::db::PgLocationStore;
use crate::handlers;
use crate::services::{RouteService, RouteSettings};
use actix_web::dev::ServerHandle as ActixHandle;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::io;
use tokio::task::JoinHandle;

/// Running server owned by the caller
pub struct ServerHandle {
    handle: ActixHandle,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Bind and start serving in the background
    /// DOCUMENTATION: Signal handling is left to the owner of the handle
    pub fn start(config: &Config, pool: PgPool) -> io::Result<Self> {
        let settings = RouteSettings::from(config);
        let store = PgLocationStore::new(pool.clone());
        let service = web::Data::new(RouteService::new(store, settings));
        let pool = web::Data::new(pool);
        let bind_address = config.bind_address();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(pool.clone())
                .app_data(service.clone())
                .wrap(Logger::default())
                .wrap(actix_web::middleware::Compress::default())
                .configure(handlers::health_config)
                .configure(handlers::auth_config)
                .configure(handlers::locations_config)
                .configure(handlers::routes_config)
        })
        .disable_signals()
        .bind(&bind_address)?
        .run();

        log::info!("Listening on {}", bind_address);

        let handle = server.handle();
        let task = actix_rt::spawn(server);
        Ok(Self { handle, task })
    }

    /// Stop accepting connections; `graceful` lets in-flight requests finish
    pub async fn stop(&self, graceful: bool) {
        log::info!("Stopping server (graceful: {})", graceful);
        self.handle.stop(graceful).await;
    }

    /// Wait until the server has shut down
    pub async fn wait(self) -> io::Result<()> {
        self.task
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::init_lazy_pool;

    #[actix_rt::test]
    async fn test_start_and_stop() {
        let config = Config {
            server_port: 0,
            ..Config::default()
        };
        let pool = init_lazy_pool(&config).unwrap();

        let server = ServerHandle::start(&config, pool).unwrap();
        server.stop(true).await;
        assert!(server.wait().await.is_ok());
    }
}
