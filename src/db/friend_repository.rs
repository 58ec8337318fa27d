// src/db/friend_repository.rs
// DOCUMENTATION: Friendship checks
// PURPOSE: Gate access to another user's location

use crate::errors::RouteError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FriendRepository;

impl FriendRepository {
    /// True when an accepted friendship exists in either direction
    pub async fn are_friends(pool: &PgPool, a: Uuid, b: Uuid) -> Result<bool, RouteError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friendships
                WHERE ((user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1))
                  AND status = 'accepted'
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}
