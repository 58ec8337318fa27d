// src/handlers/auth.rs
// DOCUMENTATION: Bearer token authentication and logout
// PURPOSE: Resolve the calling user from the Authorization header

use crate::db::SessionRepository;
use crate::errors::RouteError;
use crate::models::SessionState;
use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(req: &HttpRequest) -> Result<&str, RouteError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(RouteError::Unauthorized)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => {
            log::warn!("Malformed Authorization header");
            Err(RouteError::Unauthorized)
        }
    }
}

/// Authenticate a request and return the user id of its active session
/// DOCUMENTATION: Expired sessions map to `SessionExpired`, revoked and
/// unknown ones to `Unauthorized`
pub async fn authenticate(req: &HttpRequest, pool: &PgPool) -> Result<String, RouteError> {
    let token = bearer_token(req)?;

    match SessionRepository::validate(pool, token).await? {
        SessionState::Active { user_id } => Ok(user_id),
        SessionState::Expired => Err(RouteError::SessionExpired),
        SessionState::Revoked => Err(RouteError::Unauthorized),
    }
}

/// POST /api/logout
/// Revoke the caller's session
pub async fn logout(
    pool: web::Data<PgPool>,
    req: HttpRequest,
) -> Result<impl Responder, RouteError> {
    let user_id = authenticate(&req, pool.get_ref()).await?;
    let token = bearer_token(&req)?;

    SessionRepository::revoke(pool.get_ref(), token).await?;
    log::info!("User {} logged out", user_id);

    Ok(HttpResponse::Ok().json(json!({ "status": "logged_out" })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/logout", web::post().to(logout));
}
