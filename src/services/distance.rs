// src/services/distance.rs
// DOCUMENTATION: Real-world length of a grid path
// PURPOSE: Sum great-circle segments between consecutive cell centers

use geo_types::LineString;

use crate::models::{Coordinate, GridCell, PathResult};
use crate::services::CoordinateProjector;

pub struct DistanceAggregator;

impl DistanceAggregator {
    /// Path length in meters
    /// DOCUMENTATION: Sum of Haversine distances between consecutive cell
    /// centers. Never less than the great-circle distance between the first
    /// and last center.
    pub fn aggregate(path: &PathResult) -> f64 {
        Self::centers(path.cells())
            .windows(2)
            .map(|pair| pair[0].haversine_m(&pair[1]))
            .sum()
    }

    /// Direct great-circle distance between two cell centers
    pub fn great_circle(a: GridCell, b: GridCell) -> f64 {
        CoordinateProjector::center_of(a).haversine_m(&CoordinateProjector::center_of(b))
    }

    pub fn centers(cells: &[GridCell]) -> Vec<Coordinate> {
        cells
            .iter()
            .map(|&cell| CoordinateProjector::center_of(cell))
            .collect()
    }

    /// Path of cell centers as a lon/lat line
    pub fn to_line_string(path: &PathResult) -> LineString<f64> {
        Self::centers(path.cells())
            .into_iter()
            .map(geo_types::Coord::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{CellGraph, GridPathfinder, SearchLimits};

    fn cell_at(lat: f64, lon: f64, res: u8) -> GridCell {
        CoordinateProjector::project(&Coordinate::new(lat, lon).unwrap(), res).unwrap()
    }

    #[test]
    fn test_single_cell_has_zero_length() {
        let a = cell_at(41.0151, 28.9795, 9);
        let path = GridPathfinder::find_path(a, a, &SearchLimits::default()).unwrap();
        assert_eq!(DistanceAggregator::aggregate(&path), 0.0);
    }

    #[test]
    fn test_aggregate_bounded_below_by_great_circle() {
        let pairs = [
            ((41.0151, 28.9795), (41.10, 29.10)),
            ((41.6488, -0.8891), (41.60, -0.95)),
        ];

        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let a = cell_at(lat1, lon1, 8);
            let b = cell_at(lat2, lon2, 8);
            let path = GridPathfinder::find_path(a, b, &SearchLimits::default()).unwrap();

            let along = DistanceAggregator::aggregate(&path);
            let direct = DistanceAggregator::great_circle(a, b);

            assert!(along >= direct - 1e-6);
            // Hexagonal detour never exceeds 2/sqrt(3) by much
            assert!(along <= direct * 1.2, "along {} direct {}", along, direct);
        }
    }

    #[test]
    fn test_detour_is_never_shorter_than_optimal_path() {
        let a = cell_at(41.0151, 28.9795, 9);
        let b = cell_at(41.03, 29.01, 9);
        let limits = SearchLimits::default();
        let optimal = GridPathfinder::find_path(a, b, &limits).unwrap();
        let direct_hops = CellGraph::grid_distance(a, b).unwrap();

        // Step away from the goal first, then take the best path back
        let away = CellGraph::neighbors(a)
            .into_iter()
            .find(|&n| CellGraph::grid_distance(n, b).unwrap() > direct_hops)
            .unwrap();
        let rest = GridPathfinder::find_path(away, b, &limits).unwrap();

        let mut cells = vec![a];
        cells.extend_from_slice(rest.cells());
        for pair in cells.windows(2) {
            assert!(CellGraph::neighbors(pair[0]).contains(&pair[1]));
        }
        let detour = PathResult::from_cells(cells).unwrap();

        assert!(detour.hop_count() > optimal.hop_count());
        assert!(DistanceAggregator::aggregate(&detour) >= DistanceAggregator::aggregate(&optimal));
    }

    #[test]
    fn test_line_string_follows_path() {
        let a = cell_at(41.0151, 28.9795, 9);
        let b = cell_at(41.02, 28.99, 9);
        let path = GridPathfinder::find_path(a, b, &SearchLimits::default()).unwrap();

        let line = DistanceAggregator::to_line_string(&path);
        assert_eq!(line.0.len(), path.cells().len());

        let first = CoordinateProjector::center_of(a);
        assert_eq!(line.0[0].x, first.longitude());
        assert_eq!(line.0[0].y, first.latitude());
    }
}
