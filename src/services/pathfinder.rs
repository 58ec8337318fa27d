// src/services/pathfinder.rs
// DOCUMENTATION: A* shortest-path search over the implicit cell graph
// PURPOSE: Find a minimum-hop path between two cells under an expansion budget

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::RouteError;
use crate::models::{GridCell, PathResult};
use crate::services::cell_graph::{AstarPather, CellGraph};

/// Default expansion budget for a single search
pub const DEFAULT_MAX_EXPANSIONS: usize = 100_000;

/// Deadline and cancellation are polled once per this many expansions
pub const CANCELLATION_CHECK_INTERVAL: usize = 1_000;

/// Cooperative cancellation signal shared between a caller and a search
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Bounds applied to one search
#[derive(Debug, Clone)]
pub struct SearchLimits {
    pub max_expansions: usize,
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationFlag>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            deadline: None,
            cancel: None,
        }
    }
}

impl SearchLimits {
    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions,
            ..Self::default()
        }
    }

    fn interrupted(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
            || self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled)
    }
}

/// Open-list entry.
///
/// Pops lowest `f` first. Among equal `f` the entry with the lowest `h`
/// wins, and among equal `h` the most recently pushed one (LIFO on `seq`),
/// not the oldest. Paths stay optimal either way, but which of several
/// equal-cost paths is returned follows this order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct OpenEntry {
    f: u32,
    h: u32,
    g: u32,
    seq: u64,
    slot: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first; ties go to
        // the node closest to the goal, then to the latest insertion.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct SearchNode<N> {
    node: N,
    g: u32,
    parent: usize,
    closed: bool,
}

const NO_PARENT: usize = usize::MAX;

/// Generic A* with unit edge costs.
///
/// Returns the full path including both endpoints. Closed nodes are reopened
/// when a cheaper route to them turns up, so the result stays optimal as
/// long as the estimate is admissible.
pub fn astar<P: AstarPather>(
    pather: &P,
    start: P::Node,
    goal: P::Node,
    limits: &SearchLimits,
) -> Result<Vec<P::Node>, RouteError>
where
    P::Node: std::fmt::Debug,
{
    if start == goal {
        return Ok(vec![start]);
    }

    let mut nodes: Vec<SearchNode<P::Node>> = Vec::new();
    let mut index: FxHashMap<P::Node, usize> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    nodes.push(SearchNode {
        node: start,
        g: 0,
        parent: NO_PARENT,
        closed: false,
    });
    index.insert(start, 0);

    let h = pather.estimate(start, goal);
    open.push(OpenEntry {
        f: h,
        h,
        g: 0,
        seq,
        slot: 0,
    });

    let mut expansions = 0usize;
    let mut nbuf = Vec::with_capacity(6);

    while let Some(current) = open.pop() {
        let ci = current.slot;

        // Skip stale entries.
        if nodes[ci].closed || nodes[ci].g != current.g {
            continue;
        }

        if nodes[ci].node == goal {
            log::debug!(
                "A* reached goal after {} expansions ({} hops)",
                expansions,
                current.g
            );
            return Ok(reconstruct(&nodes, ci));
        }

        expansions += 1;
        if expansions > limits.max_expansions {
            log::warn!(
                "A* expansion budget of {} exhausted",
                limits.max_expansions
            );
            return Err(RouteError::SearchBoundExceeded {
                expansions: limits.max_expansions,
            });
        }
        if expansions % CANCELLATION_CHECK_INTERVAL == 0 && limits.interrupted() {
            log::warn!("A* interrupted after {} expansions", expansions);
            return Err(RouteError::Timeout { expansions });
        }

        nodes[ci].closed = true;
        let current_node = nodes[ci].node;
        let tentative_g = current.g + 1;

        nbuf.clear();
        pather.neighbors(current_node, &mut nbuf);

        for &neighbor in nbuf.iter() {
            let ni = match index.get(&neighbor) {
                Some(&ni) => {
                    if tentative_g >= nodes[ni].g {
                        continue;
                    }
                    let n = &mut nodes[ni];
                    n.g = tentative_g;
                    n.parent = ci;
                    n.closed = false;
                    ni
                }
                None => {
                    nodes.push(SearchNode {
                        node: neighbor,
                        g: tentative_g,
                        parent: ci,
                        closed: false,
                    });
                    let ni = nodes.len() - 1;
                    index.insert(neighbor, ni);
                    ni
                }
            };

            let h = pather.estimate(neighbor, goal);
            seq += 1;
            open.push(OpenEntry {
                f: tentative_g + h,
                h,
                g: tentative_g,
                seq,
                slot: ni,
            });
        }
    }

    Err(RouteError::NoPathFound {
        from: format!("{:?}", start),
        to: format!("{:?}", goal),
    })
}

fn reconstruct<N: Copy>(nodes: &[SearchNode<N>], goal_slot: usize) -> Vec<N> {
    let mut path = Vec::new();
    let mut ci = goal_slot;
    while ci != NO_PARENT {
        path.push(nodes[ci].node);
        ci = nodes[ci].parent;
    }
    path.reverse();
    path
}

/// A* over the hexagonal grid
pub struct GridPathfinder;

impl GridPathfinder {
    /// Minimum-hop path from `start` to `goal`
    /// DOCUMENTATION: The returned `PathResult` carries no distance yet; see
    /// `DistanceAggregator`. Fails with `ResolutionMismatch`, `NoPathFound`,
    /// `SearchBoundExceeded` or `Timeout`.
    pub fn find_path(
        start: GridCell,
        goal: GridCell,
        limits: &SearchLimits,
    ) -> Result<PathResult, RouteError> {
        CellGraph::ensure_same_resolution(start, goal)?;

        let cells = astar(&CellGraph, start, goal, limits).map_err(|e| match e {
            RouteError::NoPathFound { .. } => RouteError::NoPathFound {
                from: start.to_string(),
                to: goal.to_string(),
            },
            other => other,
        })?;

        PathResult::from_cells(cells)
            .ok_or_else(|| RouteError::InternalError("empty path reconstructed".into()))
    }
}
