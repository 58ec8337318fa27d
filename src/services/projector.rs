// src/services/projector.rs
// DOCUMENTATION: Coordinate <-> hexagonal cell projection
// PURPOSE: Map (latitude, longitude) onto the H3 grid at a chosen resolution and back

use h3o::{LatLng, Resolution};

use crate::errors::RouteError;
use crate::models::{Coordinate, GridCell};

/// Finest supported grid resolution
pub const MAX_RESOLUTION: u8 = 15;

/// Projection service
/// DOCUMENTATION: Pure and stateless; safe to call from any thread
pub struct CoordinateProjector;

impl CoordinateProjector {
    /// Validate a numeric resolution
    pub fn resolution(value: u8) -> Result<Resolution, RouteError> {
        Resolution::try_from(value).map_err(|_| {
            RouteError::OutOfRange(format!(
                "resolution {} outside [0, {}]",
                value, MAX_RESOLUTION
            ))
        })
    }

    /// Project a coordinate to the cell containing it
    /// DOCUMENTATION: Deterministic. Fails with `OutOfRange` for a resolution
    /// outside [0, 15]; the coordinate itself was range-checked on construction.
    pub fn project(coordinate: &Coordinate, resolution: u8) -> Result<GridCell, RouteError> {
        let resolution = Self::resolution(resolution)?;
        let point = LatLng::new(coordinate.latitude(), coordinate.longitude())
            .map_err(|e| RouteError::OutOfRange(e.to_string()))?;

        Ok(GridCell::from_index(point.to_cell(resolution)))
    }

    /// Validate raw degrees and project them in one step
    pub fn project_degrees(
        latitude: f64,
        longitude: f64,
        resolution: u8,
    ) -> Result<GridCell, RouteError> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        Self::project(&coordinate, resolution)
    }

    /// Representative center point of a cell
    pub fn center_of(cell: GridCell) -> Coordinate {
        let center = LatLng::from(cell.index());
        Coordinate::from_grid_degrees(center.lat(), center.lng())
    }

    /// Edge length of this particular cell in meters
    /// DOCUMENTATION: Measured as the largest center-to-vertex distance, which
    /// for a hexagon equals its edge length and bounds the distance from the
    /// center to any point inside the cell.
    pub fn edge_length_m(cell: GridCell) -> f64 {
        let center = Self::center_of(cell);

        cell.index()
            .boundary()
            .iter()
            .map(|vertex| {
                center.haversine_m(&Coordinate::from_grid_degrees(vertex.lat(), vertex.lng()))
            })
            .fold(0.0, f64::max)
    }

    /// Average hexagon edge length at a resolution, in meters
    pub fn average_edge_length_m(resolution: u8) -> Result<f64, RouteError> {
        Ok(Self::resolution(resolution)?.edge_length_m())
    }
}
