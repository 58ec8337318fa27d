// src/models/coordinate.rs
// DOCUMENTATION: Geographic coordinate value type
// PURPOSE: Validated (latitude, longitude) pair shared by every component

use crate::errors::RouteError;
use serde::Serialize;

/// Mean Earth radius used for every great-circle measurement in the service
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the sphere in decimal degrees
/// DOCUMENTATION: Immutable; can only be built through `Coordinate::new`,
/// which enforces latitude in [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, failing with `OutOfRange` for invalid input
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RouteError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RouteError::OutOfRange(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RouteError::OutOfRange(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build from degrees produced by the grid library itself.
    /// Clamps rounding noise at the poles and the antimeridian.
    pub(crate) fn from_grid_degrees(latitude: f64, longitude: f64) -> Self {
        let longitude = if longitude > 180.0 {
            longitude - 360.0
        } else if longitude < -180.0 {
            longitude + 360.0
        } else {
            longitude
        };

        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters
    /// Uses the Haversine formula
    pub fn haversine_m(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);

        // min() guards asin against values a hair above 1.0
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }
}

impl From<Coordinate> for geo_types::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo_types::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo_types::Coord {
            x: coordinate.longitude,
            y: coordinate.latitude,
        }
    }
}
