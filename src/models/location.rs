// src/models/location.rs
// DOCUMENTATION: Last-known user positions
// PURPOSE: Data owned by the location store and read by RouteService

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::Coordinate;
use crate::errors::RouteError;

/// Last recorded position of a user
/// DOCUMENTATION: Read-only from the engine's point of view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLocation {
    pub user_id: String,
    pub coordinate: Coordinate,
    pub accuracy_meters: i32,
    pub observed_at: DateTime<Utc>,
}

impl UserLocation {
    /// Age of the observation relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.observed_at
    }

    /// Fail with `StaleLocation` when older than `window`
    pub fn ensure_fresh(&self, now: DateTime<Utc>, window: Duration) -> Result<(), RouteError> {
        let age = self.age(now);
        if age > window {
            log::warn!(
                "Location for user {} is {}s old (window {}s)",
                self.user_id,
                age.num_seconds(),
                window.num_seconds()
            );
            return Err(RouteError::StaleLocation {
                user_id: self.user_id.clone(),
                age_secs: age.num_seconds(),
                window_secs: window.num_seconds(),
            });
        }
        Ok(())
    }
}

/// Internal struct for mapping `user_locations` rows
/// DOCUMENTATION: PostGIS POINT extracted via ST_Y() and ST_X()
#[derive(Debug, FromRow)]
pub struct LocationRow {
    pub user_id: Uuid,
    pub latitude: f64,  // From ST_Y(location)
    pub longitude: f64, // From ST_X(location)
    pub accuracy: i32,
    pub updated_at: DateTime<Utc>,
}

impl LocationRow {
    /// Convert row to domain model, re-validating the stored coordinate
    pub fn to_location(self) -> Result<UserLocation, RouteError> {
        Ok(UserLocation {
            user_id: self.user_id.to_string(),
            coordinate: Coordinate::new(self.latitude, self.longitude)?,
            accuracy_meters: self.accuracy,
            observed_at: self.updated_at,
        })
    }
}

/// Row of the friends' locations query, joined with `users`
#[derive(Debug, FromRow)]
pub struct FriendLocationRow {
    pub user_id: Uuid,
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: i32,
    pub updated_at: DateTime<Utc>,
}

/// Recent position of an accepted friend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendLocation {
    pub user_id: String,
    pub username: String,
    pub coordinate: Coordinate,
    pub accuracy_meters: i32,
    pub observed_at: DateTime<Utc>,
}

impl FriendLocationRow {
    pub fn to_friend_location(self) -> Result<FriendLocation, RouteError> {
        Ok(FriendLocation {
            user_id: self.user_id.to_string(),
            username: self.username,
            coordinate: Coordinate::new(self.latitude, self.longitude)?,
            accuracy_meters: self.accuracy,
            observed_at: self.updated_at,
        })
    }
}

/// Request body for POST /api/save-location
#[derive(Debug, Deserialize, Validate)]
pub struct SaveLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Reported accuracy in meters
    #[serde(default = "default_accuracy")]
    #[validate(range(min = 0, max = 100000))]
    pub accuracy: i32,
}

fn default_accuracy() -> i32 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(minutes_ago: i64) -> UserLocation {
        UserLocation {
            user_id: "u1".into(),
            coordinate: Coordinate::new(39.9334, 32.8597).unwrap(),
            accuracy_meters: 25,
            observed_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_fresh_location_passes() {
        assert!(location(5)
            .ensure_fresh(Utc::now(), Duration::minutes(10))
            .is_ok());
    }

    #[test]
    fn test_stale_location_fails() {
        let err = location(15)
            .ensure_fresh(Utc::now(), Duration::minutes(10))
            .unwrap_err();
        match err {
            RouteError::StaleLocation { age_secs, window_secs, .. } => {
                assert!(age_secs >= 900);
                assert_eq!(window_secs, 600);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_row_with_invalid_coordinate_is_rejected() {
        let row = LocationRow {
            user_id: Uuid::new_v4(),
            latitude: 123.0,
            longitude: 0.0,
            accuracy: 10,
            updated_at: Utc::now(),
        };
        assert!(row.to_location().is_err());
    }

    #[test]
    fn test_friend_row_keeps_username_and_position() {
        let id = Uuid::new_v4();
        let row = FriendLocationRow {
            user_id: id,
            username: "deniz".into(),
            latitude: 40.9903,
            longitude: 29.0290,
            accuracy: 15,
            updated_at: Utc::now(),
        };

        let friend = row.to_friend_location().unwrap();
        assert_eq!(friend.user_id, id.to_string());
        assert_eq!(friend.username, "deniz");
        assert_eq!(friend.coordinate, Coordinate::new(40.9903, 29.0290).unwrap());
        assert_eq!(friend.accuracy_meters, 15);

        let json = serde_json::to_value(&friend).unwrap();
        assert_eq!(json["username"], "deniz");
    }
}
