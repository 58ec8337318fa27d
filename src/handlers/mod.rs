// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod auth;
pub mod health;
pub mod locations;
pub mod routes;

pub use auth::config as auth_config;
pub use health::config as health_config;
pub use locations::config as locations_config;
pub use routes::config as routes_config;

use crate::db::PgLocationStore;
use crate::services::RouteService;

/// RouteService as shared application state
pub type AppRouteService = RouteService<PgLocationStore>;
