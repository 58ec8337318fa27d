// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Report service status and the active grid resolution

use crate::handlers::AppRouteService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(service: web::Data<AppRouteService>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "locshare-routing",
        "version": env!("CARGO_PKG_VERSION"),
        "grid_resolution": service.settings().resolution
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
