//! Deferred stake activation.
//!
//! A stake powers up a fixed delay after it is created. The schedule only records
//! when; whether the stake still qualifies is decided when the entry comes due.

use crate::stake::StakeKey;
use std::collections::{BTreeSet, HashMap};
use tally_types::{PublicKey, Timestamp};

/// A power-up that has come due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuePowerUp {
    pub stake: StakeKey,
    pub owner: PublicKey,
    pub due: Timestamp,
}

#[derive(Clone, Debug, Default)]
pub struct PowerUpSchedule {
    queue: BTreeSet<(Timestamp, StakeKey)>,
    entries: HashMap<StakeKey, (Timestamp, PublicKey)>,
}

impl PowerUpSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `stake` owned by `owner` at `due`, replacing any earlier entry.
    pub fn schedule(&mut self, stake: StakeKey, owner: PublicKey, due: Timestamp) {
        self.remove(&stake);
        self.queue.insert((due, stake.clone()));
        self.entries.insert(stake, (due, owner));
    }

    pub fn remove(&mut self, stake: &StakeKey) -> bool {
        match self.entries.remove(stake) {
            Some((due, _)) => {
                self.queue.remove(&(due, stake.clone()));
                true
            }
            None => false,
        }
    }

    /// Remove and return every entry due at or before `until`, earliest first.
    pub fn take_due(&mut self, until: Timestamp) -> Vec<DuePowerUp> {
        let mut due = Vec::new();
        while let Some((at, _)) = self.queue.first() {
            if *at > until {
                break;
            }
            let Some((at, stake)) = self.queue.pop_first() else {
                break;
            };
            if let Some((_, owner)) = self.entries.remove(&stake) {
                due.push(DuePowerUp {
                    stake,
                    owner,
                    due: at,
                });
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
