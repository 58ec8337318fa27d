// src/db/session_repository.rs
// DOCUMENTATION: Bearer session lookup and revocation
// PURPOSE: Map session tokens to SessionState

use crate::errors::RouteError;
use crate::models::{SessionRow, SessionState};
use chrono::Utc;
use sqlx::PgPool;

pub struct SessionRepository;

impl SessionRepository {
    /// Current state of a session token
    /// DOCUMENTATION: Unknown tokens are `Unauthorized`; known tokens map to
    /// Active, Expired or Revoked
    pub async fn validate(pool: &PgPool, token: &str) -> Result<SessionState, RouteError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT user_id, expires_at, revoked_at
            FROM user_sessions
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?
        .ok_or(RouteError::Unauthorized)?;

        Ok(row.state_at(Utc::now()))
    }

    /// Mark a session as revoked; the row is kept
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), RouteError> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = NOW()
            WHERE session_token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            log::warn!("Logout for unknown or already revoked session");
        }
        Ok(())
    }
}
