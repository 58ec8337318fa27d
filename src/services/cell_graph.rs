// src/services/cell_graph.rs
// DOCUMENTATION: Implicit adjacency graph over grid cells
// PURPOSE: Neighbor enumeration and an admissible hop-distance heuristic

use std::hash::Hash;

use crate::errors::RouteError;
use crate::models::GridCell;
use crate::services::kring::bfs_distance;
use crate::services::CoordinateProjector;

/// Hop radius counted exactly by breadth-first search near pentagons
pub const EXACT_HOP_LIMIT: u32 = 32;

/// Minimal search interface: neighbor enumeration.
pub trait Pather {
    type Node: Copy + Eq + Hash;

    /// Append neighbors of `node` into `buf`. The caller clears `buf` first.
    fn neighbors(&self, node: Self::Node, buf: &mut Vec<Self::Node>);
}

/// Pather with an admissible heuristic. Every edge costs one hop.
pub trait AstarPather: Pather {
    /// Lower bound on the number of hops from `from` to `to`.
    /// Must never overestimate.
    fn estimate(&self, from: Self::Node, to: Self::Node) -> u32;
}

/// Adjacency over the hexagonal grid
/// DOCUMENTATION: Stateless. Adjacency is symmetric; pentagons have 5
/// neighbors, every other cell 6.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellGraph;

impl CellGraph {
    /// Adjacent cells, sorted for deterministic iteration
    pub fn neighbors(cell: GridCell) -> Vec<GridCell> {
        let mut out: Vec<GridCell> = cell
            .index()
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .filter(|&index| index != cell.index())
            .map(GridCell::from_index)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn are_neighbors(a: GridCell, b: GridCell) -> Result<bool, RouteError> {
        Self::ensure_same_resolution(a, b)?;
        Ok(a != b && Self::neighbors(a).contains(&b))
    }

    /// Exact hop count between two cells of one resolution, when it is known
    /// DOCUMENTATION: Away from pentagons this is the H3 local-IJ distance.
    /// Within `EXACT_HOP_LIMIT` hops of a pentagon local IJ is unreliable, so
    /// spans up to that limit are counted by breadth-first search instead.
    /// `None` when neither applies.
    pub fn hop_distance(a: GridCell, b: GridCell) -> Result<Option<u32>, RouteError> {
        Self::ensure_same_resolution(a, b)?;
        if a == b {
            return Ok(Some(0));
        }

        let near_pentagon = Self::near_pentagon(a)? || Self::near_pentagon(b)?;
        if !near_pentagon {
            if let Ok(hops) = a.index().grid_distance(b.index()) {
                if hops >= 0 {
                    return Ok(Some(hops as u32));
                }
            }
        }

        if Self::great_circle_bound(a, b)? <= EXACT_HOP_LIMIT {
            return Ok(bfs_distance(&CellGraph, a, b, EXACT_HOP_LIMIT));
        }
        Ok(None)
    }

    /// Lower bound on the hop count between two cells of one resolution
    /// DOCUMENTATION: `hop_distance` where known. Otherwise the cells are
    /// more than `EXACT_HOP_LIMIT` hops apart, and the great-circle bound is
    /// raised to at least `EXACT_HOP_LIMIT + 1`. For a fixed target the
    /// result changes by at most one between adjacent cells.
    pub fn grid_distance(a: GridCell, b: GridCell) -> Result<u32, RouteError> {
        match Self::hop_distance(a, b)? {
            Some(hops) => Ok(hops),
            None => Ok(Self::great_circle_bound(a, b)?.max(EXACT_HOP_LIMIT + 1)),
        }
    }

    pub fn ensure_same_resolution(a: GridCell, b: GridCell) -> Result<(), RouteError> {
        if a.resolution() != b.resolution() {
            return Err(RouteError::ResolutionMismatch(a.resolution(), b.resolution()));
        }
        Ok(())
    }

    /// Upper bound on the distance between adjacent cell centers
    fn max_step_m(resolution: u8) -> Result<f64, RouteError> {
        // Neighbor centers are at most two circumradii apart and cells vary
        // in size by less than 2x across the globe.
        Ok(4.0 * CoordinateProjector::average_edge_length_m(resolution)?)
    }

    fn great_circle_bound(a: GridCell, b: GridCell) -> Result<u32, RouteError> {
        let span = CoordinateProjector::center_of(a).haversine_m(&CoordinateProjector::center_of(b));
        Ok((span / Self::max_step_m(a.resolution())?).floor() as u32)
    }

    /// True when some pentagon may lie within `EXACT_HOP_LIMIT` hops
    fn near_pentagon(cell: GridCell) -> Result<bool, RouteError> {
        let resolution = CoordinateProjector::resolution(cell.resolution())?;
        let radius = EXACT_HOP_LIMIT as f64 * Self::max_step_m(cell.resolution())?;
        let center = CoordinateProjector::center_of(cell);

        Ok(resolution.pentagons().any(|pentagon| {
            let pentagon = CoordinateProjector::center_of(GridCell::from_index(pentagon));
            center.haversine_m(&pentagon) <= radius
        }))
    }
}

impl Pather for CellGraph {
    type Node = GridCell;

    fn neighbors(&self, node: GridCell, buf: &mut Vec<GridCell>) {
        buf.extend(CellGraph::neighbors(node));
    }
}

impl AstarPather for CellGraph {
    fn estimate(&self, from: GridCell, to: GridCell) -> u32 {
        // Resolutions are checked before a search starts
        CellGraph::grid_distance(from, to).unwrap_or(0)
    }
}
