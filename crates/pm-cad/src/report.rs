//! Pass Reports
//!
//! Summary returned by the ordered resolution passes (sketch constraints
//! and assembly mates).

use serde::{Deserialize, Serialize};

/// Outcome of one ordered pass over a constraint container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Items whose step ran
    pub applied: usize,
    /// Items with no registered step, or that reference themselves
    pub skipped: usize,
    /// Positions of items that referenced a missing entity
    pub dangling: Vec<usize>,
}

impl PassReport {
    /// True when no item referenced a missing entity
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty()
    }

    /// Total number of items visited
    pub fn visited(&self) -> usize {
        self.applied + self.skipped + self.dangling.len()
    }
}
