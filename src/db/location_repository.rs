// src/db/location_repository.rs
// DOCUMENTATION: Database access for user locations
// PURPOSE: Read and upsert rows of user_locations (PostGIS)

use crate::errors::RouteError;
use crate::models::{
    Coordinate, FriendLocation, FriendLocationRow, GridCell, LocationRow, UserLocation,
};
use crate::services::{CoordinateProjector, LocationStore};
use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

/// Resolution of the cell string stored next to each location
pub const STORED_CELL_RESOLUTION: u8 = 9;

/// Parse a user id, treating malformed ids as unknown users
pub fn parse_user_id(user_id: &str) -> Result<Uuid, RouteError> {
    Uuid::parse_str(user_id).map_err(|_| {
        log::warn!("Rejected malformed user id: {}", user_id);
        RouteError::NotFound(format!("user {}", user_id))
    })
}

/// LocationRepository: all queries against user_locations
pub struct LocationRepository;

impl LocationRepository {
    /// Latest location of a user
    /// DOCUMENTATION: PostGIS POINT is split with ST_Y()/ST_X()
    pub async fn get_latest(pool: &PgPool, user_id: Uuid) -> Result<UserLocation, RouteError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT
                user_id,
                ST_Y(location) as latitude, ST_X(location) as longitude,
                accuracy, updated_at
            FROM user_locations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching location for {}: {}", user_id, e);
            RouteError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| {
            log::warn!("No location recorded for user: {}", user_id);
            RouteError::NotFound(format!("location for user {}", user_id))
        })?;

        row.to_location()
    }

    /// Locations of accepted friends observed within `window`, newest first
    pub async fn get_friends_latest(
        pool: &PgPool,
        user_id: Uuid,
        window: Duration,
    ) -> Result<Vec<FriendLocation>, RouteError> {
        let rows = sqlx::query_as::<_, FriendLocationRow>(
            r#"
            SELECT
                ul.user_id, u.username,
                ST_Y(ul.location) as latitude, ST_X(ul.location) as longitude,
                ul.accuracy, ul.updated_at
            FROM user_locations ul
            JOIN users u ON ul.user_id = u.id
            WHERE ul.user_id IN (
                SELECT CASE WHEN f.user_id = $1 THEN f.friend_id ELSE f.user_id END
                FROM friendships f
                WHERE (f.user_id = $1 OR f.friend_id = $1)
                  AND f.status = 'accepted'
            )
            AND ul.updated_at > NOW() - make_interval(secs => $2)
            ORDER BY ul.updated_at DESC
            "#,
        )
        .bind(user_id) // $1
        .bind(window.num_seconds() as f64) // $2
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching friends of {}: {}", user_id, e);
            RouteError::DatabaseError(e.to_string())
        })?;

        log::debug!("Found {} recent friend locations for {}", rows.len(), user_id);

        rows.into_iter()
            .map(FriendLocationRow::to_friend_location)
            .collect()
    }

    /// Insert or replace the location of a user, returning its stored cell
    /// DOCUMENTATION: Also stores the resolution-9 cell so other readers
    /// can bucket users without projecting again
    pub async fn save_location(
        pool: &PgPool,
        user_id: Uuid,
        coordinate: &Coordinate,
        accuracy: i32,
    ) -> Result<GridCell, RouteError> {
        let cell = CoordinateProjector::project(coordinate, STORED_CELL_RESOLUTION)?;

        sqlx::query(
            r#"
            INSERT INTO user_locations (user_id, location, h3_index, accuracy, updated_at)
            VALUES ($1, ST_SetSRID(ST_MakePoint($2, $3), 4326), $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                location = EXCLUDED.location,
                h3_index = EXCLUDED.h3_index,
                accuracy = EXCLUDED.accuracy,
                updated_at = NOW()
            "#,
        )
        .bind(user_id) // $1
        .bind(coordinate.longitude()) // $2
        .bind(coordinate.latitude()) // $3
        .bind(cell.to_string()) // $4
        .bind(accuracy) // $5
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to save location for {}: {}", user_id, e);
            RouteError::DatabaseError(e.to_string())
        })?;

        log::debug!("Saved location for {} in cell {}", user_id, cell);
        Ok(cell)
    }
}

/// LocationStore backed by PostgreSQL
#[derive(Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LocationStore for PgLocationStore {
    async fn get_location(&self, user_id: &str) -> Result<UserLocation, RouteError> {
        let id = parse_user_id(user_id)?;
        LocationRepository::get_latest(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_user_id_is_not_found() {
        assert!(matches!(
            parse_user_id("42; DROP TABLE users"),
            Err(RouteError::NotFound(_))
        ));
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
    }

    #[actix_rt::test]
    async fn test_store_rejects_malformed_id_before_querying() {
        let pool = crate::config::init_lazy_pool(&crate::config::Config::default()).unwrap();
        let store = PgLocationStore::new(pool);

        let result = store.get_location("not-a-uuid").await;
        assert!(matches!(result, Err(RouteError::NotFound(_))));
    }
}
