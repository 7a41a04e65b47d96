//! Round descriptor used when loading the active delegate set.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// Round number the ranking is built for.
    pub round: u64,
    /// Number of delegates that forge in this round.
    pub max_delegates: usize,
}

impl RoundInfo {
    pub fn new(round: u64, max_delegates: usize) -> Self {
        Self {
            round,
            max_delegates,
        }
    }
}
