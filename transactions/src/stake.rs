//! Stake creation asset and the duration tiers that weight it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_types::{Amount, Multiplier, StakeLevels, Timestamp};

/// Seconds in three months (a quarter of a 365.25 day year).
pub const THREE_MONTHS_SECS: u64 = 7_889_400;
pub const SIX_MONTHS_SECS: u64 = 15_778_800;
pub const ONE_YEAR_SECS: u64 = 31_557_600;
pub const TWO_YEARS_SECS: u64 = 63_115_200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeCreateAsset {
    /// Lock duration in seconds.
    pub duration: u64,
    pub amount: Amount,
    /// Stake start; the stake is redeemable at `timestamp + duration`.
    pub timestamp: Timestamp,
}

impl StakeCreateAsset {
    pub fn redeemable_timestamp(&self) -> Timestamp {
        self.timestamp.plus_secs(self.duration)
    }

    pub fn level(&self) -> Option<StakeLevel> {
        StakeLevel::from_duration(self.duration)
    }
}

/// Duration tier of a stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StakeLevel {
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl StakeLevel {
    /// Select the tier for a lock duration. Durations below three months have no tier.
    pub fn from_duration(duration: u64) -> Option<Self> {
        match duration {
            d if d >= TWO_YEARS_SECS => Some(Self::TwoYears),
            d if d >= ONE_YEAR_SECS => Some(Self::OneYear),
            d if d >= SIX_MONTHS_SECS => Some(Self::SixMonths),
            d if d >= THREE_MONTHS_SECS => Some(Self::ThreeMonths),
            _ => None,
        }
    }

    pub fn multiplier<'a>(&self, levels: &'a StakeLevels) -> &'a Multiplier {
        match self {
            Self::ThreeMonths => &levels.three_months,
            Self::SixMonths => &levels.six_months,
            Self::OneYear => &levels.one_year,
            Self::TwoYears => &levels.two_years,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
        }
    }
}

impl fmt::Display for StakeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
