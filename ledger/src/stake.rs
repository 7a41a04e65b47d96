//! Stakes held by a wallet.

use serde::{Deserialize, Serialize};
use tally_transactions::{StakeCreateAsset, TransactionId};
use tally_types::{Amount, Timestamp};

/// A locked stake, keyed in its wallet by the id of the creating transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeObject {
    pub amount: Amount,
    pub duration: u64,
    pub timestamp: Timestamp,
    pub redeemable_timestamp: Timestamp,
    /// Weight granted once the stake powers up.
    pub power: Amount,
    /// Current contribution to the owner's stake weight.
    pub weight: Amount,
    pub redeemed: bool,
    pub halved: bool,
    pub active: bool,
    pub canceled: bool,
}

impl StakeObject {
    pub fn new(asset: &StakeCreateAsset, weight: Amount) -> Self {
        Self {
            amount: asset.amount.clone(),
            duration: asset.duration,
            timestamp: asset.timestamp,
            redeemable_timestamp: asset.redeemable_timestamp(),
            power: weight.clone(),
            weight,
            redeemed: false,
            halved: false,
            active: false,
            canceled: false,
        }
    }

    /// Whether the halving sweep at `now` picks this stake up.
    ///
    /// The window test is `now - window > redeemable || now + window > redeemable`,
    /// which the network has always evaluated in this form.
    pub fn is_halvable(&self, now: Timestamp, window_secs: u64) -> bool {
        let redeemable = self.redeemable_timestamp;
        let in_window =
            now.minus_secs(window_secs) > redeemable || now.plus_secs(window_secs) > redeemable;
        in_window && !self.redeemed && !self.halved
    }

    /// Whether a scheduled power-up may still activate this stake.
    pub fn can_power_up(&self) -> bool {
        !self.halved && !self.canceled && !self.active
    }
}

/// Key of a stake inside its owner's wallet.
pub type StakeKey = TransactionId;

#[cfg(test)]
mod tests {
    use super::*;

    fn stake(redeemable_at: u64) -> StakeObject {
        let asset = StakeCreateAsset {
            duration: redeemable_at,
            amount: Amount::from(1000),
            timestamp: Timestamp::EPOCH,
        };
        StakeObject::new(&asset, Amount::from(500))
    }

    #[test]
    fn new_stake_starts_inactive() {
        let s = stake(100);
        assert_eq!(s.redeemable_timestamp, Timestamp::new(100));
        assert_eq!(s.power, s.weight);
        assert!(s.can_power_up());
    }

    #[test]
    fn halving_window() {
        let s = stake(1_000);
        assert!(!s.is_halvable(Timestamp::new(500), 120));
        assert!(s.is_halvable(Timestamp::new(881), 120));
        assert!(s.is_halvable(Timestamp::new(5_000), 120));
    }

    #[test]
    fn halved_or_redeemed_stakes_are_skipped() {
        let mut s = stake(10);
        s.halved = true;
        assert!(!s.is_halvable(Timestamp::new(1_000), 120));
        assert!(!s.can_power_up());
        let mut s = stake(10);
        s.redeemed = true;
        assert!(!s.is_halvable(Timestamp::new(1_000), 120));
    }
}
