// src/handlers/routes.rs
// DOCUMENTATION: HTTP handlers for routing queries
// PURPOSE: Parse requests, check access, call RouteService, shape responses

use crate::db::{parse_user_id, FriendRepository};
use crate::errors::RouteError;
use crate::handlers::auth::authenticate;
use crate::handlers::AppRouteService;
use crate::models::{
    Coordinate, Destination, DistanceParams, NearbyParams, RouteParams, RouteQuery,
};
use crate::services::DistanceAggregator;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use geojson::{Feature, Geometry, JsonObject};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Allow access to `target`'s location for the target itself and accepted friends
async fn ensure_can_view(pool: &PgPool, requester: &str, target: &str) -> Result<(), RouteError> {
    if requester == target {
        return Ok(());
    }

    let a = parse_user_id(requester)?;
    let b = parse_user_id(target)?;
    if FriendRepository::are_friends(pool, a, b).await? {
        Ok(())
    } else {
        log::warn!("User {} denied access to location of {}", requester, target);
        Err(RouteError::Forbidden(format!(
            "not allowed to view the location of {}",
            target
        )))
    }
}

/// GET /api/route
/// Route from a coordinate to another user's last known position
pub async fn route(
    pool: web::Data<PgPool>,
    service: web::Data<AppRouteService>,
    req: HttpRequest,
    query: web::Query<RouteParams>,
) -> Result<impl Responder, RouteError> {
    let requester = authenticate(&req, pool.get_ref()).await?;

    if let Err(e) = query.validate() {
        return Err(RouteError::ValidationError(e.to_string()));
    }
    let params = query.into_inner();
    ensure_can_view(pool.get_ref(), &requester, &params.end_id).await?;

    let origin = Coordinate::new(params.start_lat, params.start_lon)?;

    match params.format.as_deref() {
        Some("json") | None => {
            let summary = service.route_to_user(origin, &params.end_id).await?;
            Ok(HttpResponse::Ok().json(summary))
        }
        Some("geojson") => {
            let settings = service.settings();
            let route_query = RouteQuery {
                origin,
                destination: Destination::User(params.end_id),
            };
            let path = service
                .route_to(&route_query, settings.resolution, settings.freshness_window)
                .await?;
            let line = DistanceAggregator::to_line_string(&path);

            let mut properties = JsonObject::new();
            properties.insert("hop_count".to_string(), json!(path.hop_count()));
            properties.insert("distance_meters".to_string(), json!(path.distance_meters()));
            properties.insert("cells".to_string(), json!(path.cells()));

            let feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&line))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            };
            Ok(HttpResponse::Ok().json(feature))
        }
        Some(other) => Err(RouteError::ValidationError(format!(
            "unsupported format '{}'",
            other
        ))),
    }
}

/// GET /api/distance
/// Distance between two users, by grid or by path
pub async fn distance(
    pool: web::Data<PgPool>,
    service: web::Data<AppRouteService>,
    req: HttpRequest,
    query: web::Query<DistanceParams>,
) -> Result<impl Responder, RouteError> {
    let requester = authenticate(&req, pool.get_ref()).await?;

    if let Err(e) = query.validate() {
        return Err(RouteError::ValidationError(e.to_string()));
    }
    let params = query.into_inner();
    ensure_can_view(pool.get_ref(), &requester, &params.user1).await?;
    ensure_can_view(pool.get_ref(), &requester, &params.user2).await?;

    let summary = service
        .distance(&params.user1, &params.user2, params.mode)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// GET /api/nearby
/// Grid cells around a coordinate; no authentication
pub async fn nearby(
    service: web::Data<AppRouteService>,
    query: web::Query<NearbyParams>,
) -> Result<impl Responder, RouteError> {
    if let Err(e) = query.validate() {
        return Err(RouteError::ValidationError(e.to_string()));
    }

    let center = Coordinate::new(query.lat, query.lon)?;
    let cells = service.nearby(&center, query.radius_km)?;

    Ok(HttpResponse::Ok().json(json!({
        "center": center,
        "radius_km": query.radius_km,
        "count": cells.len(),
        "cells": cells
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/route", web::get().to(route))
        .route("/api/distance", web::get().to(distance))
        .route("/api/nearby", web::get().to(nearby));
}
