// src/models/cell.rs
// DOCUMENTATION: Opaque hexagonal grid cell identifier
// PURPOSE: Wraps an H3 cell index so cells only come from projection or navigation

use h3o::CellIndex;
use serde::{Serialize, Serializer};
use std::fmt;

/// One cell of the hierarchical hexagonal grid at a given resolution
/// DOCUMENTATION: Equal iff same cell at same resolution. The constructor is
/// crate-private: values are produced by `CoordinateProjector::project` and
/// `CellGraph::neighbors`, never from arbitrary bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell(CellIndex);

impl GridCell {
    pub(crate) fn from_index(index: CellIndex) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> CellIndex {
        self.0
    }

    /// Grid refinement level, 0 (coarsest) to 15 (finest)
    pub fn resolution(self) -> u8 {
        u8::from(self.0.resolution())
    }

    /// True for the twelve singular cells per resolution that have five neighbors
    pub fn is_pentagon(self) -> bool {
        self.0.is_pentagon()
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for GridCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
