// src/models/route.rs
// DOCUMENTATION: Route, ring and distance data structures
// PURPOSE: Per-query results of the grid engine plus the HTTP request/response DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Coordinate, GridCell};

/// Result of a grid path search
/// DOCUMENTATION: Consecutive cells are always graph-adjacent and
/// `hop_count == cells.len() - 1`. Owned solely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    cells: Vec<GridCell>,
    hop_count: usize,
    distance_meters: f64,
}

impl PathResult {
    /// Build from a reconstructed path; `None` for an empty sequence
    pub(crate) fn from_cells(cells: Vec<GridCell>) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }

        Some(Self {
            hop_count: cells.len() - 1,
            cells,
            distance_meters: 0.0,
        })
    }

    /// Same path, augmented with its aggregated real-world length
    pub fn with_distance(self, distance_meters: f64) -> Self {
        Self {
            distance_meters,
            ..self
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn hop_count(&self) -> usize {
        self.hop_count
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn start(&self) -> GridCell {
        self.cells[0]
    }

    pub fn goal(&self) -> GridCell {
        self.cells[self.hop_count]
    }
}

/// One cell of a k-ring with its hop distance from the center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RingEntry {
    pub cell: GridCell,
    pub ring_distance: u32,
}

/// Cells within `k` hops of a center, in breadth-first order, no duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RingResult {
    entries: Vec<RingEntry>,
}

impl RingResult {
    pub(crate) fn new(entries: Vec<RingEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.entries.iter().any(|e| e.cell == cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RingEntry> {
        self.entries.iter()
    }
}

/// Where a route should end
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Coordinate(Coordinate),
    User(String),
}

/// Route request as seen by RouteService
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub origin: Coordinate,
    pub destination: Destination,
}

/// Distance computation strategy
/// DOCUMENTATION: `grid` measures the raw coordinates directly, `path` runs
/// the full pathfinder/aggregator pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    Grid,
    Path,
}

/// Route answer exposed to the HTTP layer
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub path: Vec<Coordinate>,
    pub cells: Vec<GridCell>,
    pub hop_count: usize,
    pub distance_meters: f64,
}

/// Distance answer exposed to the HTTP layer
#[derive(Debug, Clone, Serialize)]
pub struct DistanceSummary {
    pub distance_meters: f64,
    pub mode: DistanceMode,
    /// Grid hops between the two users' cells; `None` when no exact count
    /// is available without a search
    pub hop_count: Option<u32>,
    pub unit: &'static str,
}

/// One entry of a nearby query
#[derive(Debug, Clone, Serialize)]
pub struct NearbyCell {
    pub cell: GridCell,
    pub coordinate: Coordinate,
    pub ring_distance: u32,
}

/// Query parameters for GET /api/route
#[derive(Debug, Deserialize, Validate)]
pub struct RouteParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub start_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub start_lon: f64,

    /// Destination user id
    #[validate(length(min = 1, max = 64))]
    pub end_id: String,

    /// `json` (default) or `geojson`
    #[serde(default)]
    pub format: Option<String>,
}

/// Query parameters for GET /api/distance
#[derive(Debug, Deserialize, Validate)]
pub struct DistanceParams {
    #[validate(length(min = 1, max = 64))]
    pub user1: String,

    #[validate(length(min = 1, max = 64))]
    pub user2: String,

    #[serde(default = "default_distance_mode")]
    pub mode: DistanceMode,
}

fn default_distance_mode() -> DistanceMode {
    DistanceMode::Path
}

/// Query parameters for GET /api/nearby
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,

    #[validate(range(min = 0.0, max = 1000.0))]
    pub radius_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(PathResult::from_cells(Vec::new()).is_none());
    }

    #[test]
    fn test_distance_mode_parsing() {
        let mode: DistanceMode = serde_json::from_str("\"grid\"").unwrap();
        assert_eq!(mode, DistanceMode::Grid);
        assert!(serde_json::from_str::<DistanceMode>("\"astar\"").is_err());
    }

    #[test]
    fn test_route_params_validation() {
        let params = RouteParams {
            start_lat: 95.0,
            start_lon: 28.0,
            end_id: "u1".into(),
            format: None,
        };
        assert!(params.validate().is_err());

        let params = RouteParams {
            start_lat: 41.0,
            start_lon: 28.0,
            end_id: String::new(),
            format: None,
        };
        assert!(params.validate().is_err());
    }
}
