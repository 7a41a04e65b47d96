//! Timestamp type and the clock seam.
//!
//! Timestamps are seconds since the network epoch, the same unit stake objects use
//! for `timestamp` and `redeemable_timestamp`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the network epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// `self - secs`, clamped at the epoch.
    pub fn minus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current network time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock measured from a network epoch given in Unix seconds.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch_unix_secs: u64,
}

impl SystemClock {
    pub fn new(epoch_unix_secs: u64) -> Self {
        Self { epoch_unix_secs }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp(secs.saturating_sub(self.epoch_unix_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_secs_clamps_at_epoch() {
        assert_eq!(Timestamp::new(100).minus_secs(120), Timestamp::EPOCH);
        assert_eq!(Timestamp::new(500).minus_secs(120), Timestamp::new(380));
    }

    #[test]
    fn system_clock_is_relative_to_epoch() {
        let unix = SystemClock::new(0).now();
        let shifted = SystemClock::new(1_000).now();
        assert!(shifted <= unix);
    }
}
