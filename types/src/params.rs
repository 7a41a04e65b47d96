//! Network milestones: the per-height consensus parameters the state engine reads.
//!
//! Only the stake levels matter to the ledger: the multiplier that turns a liquid
//! balance into vote weight, and the four duration-tier multipliers applied to stakes.

use crate::error::TypesError;
use crate::multiplier::Multiplier;
use serde::{Deserialize, Serialize};

/// Vote-weight multipliers active at a milestone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLevels {
    /// Liquid balance → vote balance multiplier.
    pub balance: Multiplier,
    #[serde(rename = "3m")]
    pub three_months: Multiplier,
    #[serde(rename = "6m")]
    pub six_months: Multiplier,
    #[serde(rename = "1y")]
    pub one_year: Multiplier,
    #[serde(rename = "2y")]
    pub two_years: Multiplier,
}

impl Default for StakeLevels {
    fn default() -> Self {
        Self {
            balance: Multiplier::one(),
            three_months: Multiplier::decimal(5, 1),
            six_months: Multiplier::one(),
            one_year: Multiplier::decimal(15, 1),
            two_years: Multiplier::integer(2),
        }
    }
}

/// A parameter set that becomes active at `height`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub height: u64,
    #[serde(default)]
    pub stake_levels: StakeLevels,
}

impl Default for Milestone {
    fn default() -> Self {
        Self {
            height: 1,
            stake_levels: StakeLevels::default(),
        }
    }
}

/// Height-ordered milestone list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Milestone>", into = "Vec<Milestone>")]
pub struct Milestones(Vec<Milestone>);

impl Milestones {
    pub fn new(mut milestones: Vec<Milestone>) -> Result<Self, TypesError> {
        if milestones.is_empty() {
            return Err(TypesError::NoMilestones);
        }
        milestones.sort_by_key(|m| m.height);
        Ok(Self(milestones))
    }

    /// The milestone active at `height`: the last one starting at or below it.
    /// Heights before the first milestone use the first milestone.
    pub fn at(&self, height: u64) -> &Milestone {
        let idx = self.0.partition_point(|m| m.height <= height);
        &self.0[idx.saturating_sub(1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.0.iter()
    }
}

impl Default for Milestones {
    fn default() -> Self {
        Self(vec![Milestone::default()])
    }
}

impl TryFrom<Vec<Milestone>> for Milestones {
    type Error = TypesError;

    fn try_from(value: Vec<Milestone>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Milestones> for Vec<Milestone> {
    fn from(value: Milestones) -> Self {
        value.0
    }
}
