// src/handlers/locations.rs
// DOCUMENTATION: HTTP handler for location updates
// PURPOSE: Record the caller's current position

use crate::db::{parse_user_id, LocationRepository};
use crate::errors::RouteError;
use crate::handlers::auth::authenticate;
use crate::handlers::AppRouteService;
use crate::models::{Coordinate, SaveLocationRequest};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// POST /api/save-location
/// Upsert the authenticated user's location
pub async fn save_location(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    body: web::Json<SaveLocationRequest>,
) -> Result<impl Responder, RouteError> {
    let user_id = authenticate(&req, pool.get_ref()).await?;

    if let Err(e) = body.validate() {
        return Err(RouteError::ValidationError(e.to_string()));
    }

    let coordinate = Coordinate::new(body.latitude, body.longitude)?;
    let id = parse_user_id(&user_id)?;
    let cell = LocationRepository::save_location(pool.get_ref(), id, &coordinate, body.accuracy).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "saved",
        "user_id": user_id,
        "cell": cell,
        "accuracy": body.accuracy
    })))
}

/// GET /api/friends/locations
/// Recent positions of the caller's accepted friends
pub async fn friends_locations(
    pool: web::Data<PgPool>,
    service: web::Data<AppRouteService>,
    req: HttpRequest,
) -> Result<impl Responder, RouteError> {
    let user_id = authenticate(&req, pool.get_ref()).await?;
    let id = parse_user_id(&user_id)?;

    let window = service.settings().freshness_window;
    let friends = LocationRepository::get_friends_latest(pool.get_ref(), id, window).await?;

    Ok(HttpResponse::Ok().json(json!({
        "count": friends.len(),
        "window_secs": window.num_seconds(),
        "locations": friends
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/save-location", web::post().to(save_location))
        .route("/api/friends/locations", web::get().to(friends_locations));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{init_lazy_pool, Config};
    use crate::db::PgLocationStore;
    use crate::services::{RouteService, RouteSettings};
    use actix_web::{http::StatusCode, test as actix_test, App};

    fn state() -> (web::Data<PgPool>, web::Data<AppRouteService>) {
        let config = Config::default();
        let pool = init_lazy_pool(&config).unwrap();
        let service = RouteService::new(
            PgLocationStore::new(pool.clone()),
            RouteSettings::from(&config),
        );
        (web::Data::new(pool), web::Data::new(service))
    }

    #[actix_rt::test]
    async fn test_save_location_requires_auth() {
        let (pool, service) = state();
        let app = actix_test::init_service(
            App::new()
                .app_data(pool)
                .app_data(service)
                .configure(config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/save-location")
            .set_json(json!({ "latitude": 41.0, "longitude": 29.0 }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_friends_locations_requires_auth() {
        let (pool, service) = state();
        let app = actix_test::init_service(
            App::new()
                .app_data(pool)
                .app_data(service)
                .configure(config),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/friends/locations")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::get()
            .uri("/api/friends/locations")
            .insert_header(("Authorization", "Basic abc"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_body_defaults_accuracy() {
        let body: SaveLocationRequest =
            serde_json::from_value(json!({ "latitude": 41.0, "longitude": 29.0 })).unwrap();
        assert_eq!(body.accuracy, 50);
        assert!(body.validate().is_ok());
    }
}
