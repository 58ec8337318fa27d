// src/services/kring.rs
// DOCUMENTATION: Breadth-first neighborhood enumeration
// PURPOSE: All cells within k hops of a center, tagged with their ring distance

use rustc_hash::FxHashSet;

use crate::errors::RouteError;
use crate::models::{GridCell, RingEntry, RingResult};
use crate::services::cell_graph::{CellGraph, Pather};

/// Breadth-first rings around `center` on any graph.
///
/// Frontier `i` is the set of unvisited nodes adjacent to frontier `i - 1`.
/// Returns `(node, ring)` pairs in visiting order.
pub fn bfs_rings<P: Pather>(pather: &P, center: P::Node, k: u32) -> Vec<(P::Node, u32)> {
    let mut visited: FxHashSet<P::Node> = FxHashSet::default();
    visited.insert(center);

    let mut out = vec![(center, 0)];
    let mut frontier = vec![center];
    let mut next = Vec::new();
    let mut nbuf = Vec::new();

    for ring in 1..=k {
        next.clear();
        for &node in frontier.iter() {
            nbuf.clear();
            pather.neighbors(node, &mut nbuf);
            for &n in nbuf.iter() {
                if visited.insert(n) {
                    next.push(n);
                    out.push((n, ring));
                }
            }
        }

        if next.is_empty() {
            break;
        }
        std::mem::swap(&mut frontier, &mut next);
    }

    out
}

/// Exact hop count from `from` to `to` if it is at most `limit`.
///
/// Expands whole frontiers, so the first frontier containing `to` gives the
/// true graph distance.
pub fn bfs_distance<P: Pather>(pather: &P, from: P::Node, to: P::Node, limit: u32) -> Option<u32> {
    if from == to {
        return Some(0);
    }

    let mut visited: FxHashSet<P::Node> = FxHashSet::default();
    visited.insert(from);

    let mut frontier = vec![from];
    let mut next = Vec::new();
    let mut nbuf = Vec::new();

    for ring in 1..=limit {
        next.clear();
        for &node in frontier.iter() {
            nbuf.clear();
            pather.neighbors(node, &mut nbuf);
            for &n in nbuf.iter() {
                if n == to {
                    return Some(ring);
                }
                if visited.insert(n) {
                    next.push(n);
                }
            }
        }

        if next.is_empty() {
            return None;
        }
        std::mem::swap(&mut frontier, &mut next);
    }

    None
}

/// k-ring search over the hexagonal grid
pub struct KRingSearch;

impl KRingSearch {
    /// Every cell within `k` hops of `center`
    /// DOCUMENTATION: On a region free of pentagons the result has exactly
    /// `1 + 3k(k+1)` cells. Fails with `OutOfRange` for negative `k`.
    pub fn ring(center: GridCell, k: i32) -> Result<RingResult, RouteError> {
        let k = u32::try_from(k)
            .map_err(|_| RouteError::OutOfRange(format!("ring size {} is negative", k)))?;

        let entries = bfs_rings(&CellGraph, center, k)
            .into_iter()
            .map(|(cell, ring_distance)| RingEntry {
                cell,
                ring_distance,
            })
            .collect();

        Ok(RingResult::new(entries))
    }
}
