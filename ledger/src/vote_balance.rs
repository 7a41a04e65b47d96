//! Delegate vote-balance maintenance.
//!
//! Runs after a transaction handler has applied (or reverted) a transaction and
//! moves the weight of every balance change onto the delegates the affected wallets
//! vote for. A delegate's vote balance is the multiplier-weighted balance plus stake
//! weight of its voters; every apply branch below has an exactly inverse revert
//! branch computed from the same operands.

use crate::error::LedgerError;
use crate::handlers::stake_weight;
use crate::index::{WalletId, WalletIndex};
use tally_transactions::{Transaction, VoteToken};
use tally_types::{Amount, Milestone, Multiplier, Timestamp};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

impl Direction {
    fn is_revert(self) -> bool {
        self == Self::Revert
    }
}

pub struct VoteBalanceUpdater<'a> {
    milestone: &'a Milestone,
    now: Timestamp,
    halving_window_secs: u64,
}

impl<'a> VoteBalanceUpdater<'a> {
    pub fn new(milestone: &'a Milestone, now: Timestamp, halving_window_secs: u64) -> Self {
        Self {
            milestone,
            now,
            halving_window_secs,
        }
    }

    fn balance_multiplier(&self) -> &Multiplier {
        &self.milestone.stake_levels.balance
    }

    pub fn update(
        &self,
        index: &mut WalletIndex,
        sender: WalletId,
        recipient: Option<WalletId>,
        tx: &Transaction,
        direction: Direction,
    ) -> Result<(), LedgerError> {
        self.sweep_halvings(index, sender);

        if let Some(stake) = tx.stake_create() {
            let weight = stake_weight(stake, self.milestone)?;
            let locked = (&stake.amount + &tx.fee).times(self.balance_multiplier());
            if let Some(delegate) = voted_delegate(index, sender) {
                let vote_balance = &mut index[delegate].vote_balance;
                match direction {
                    Direction::Apply => {
                        *vote_balance -= &locked;
                        *vote_balance += &weight;
                    }
                    Direction::Revert => {
                        *vote_balance -= &weight;
                        *vote_balance += &locked;
                    }
                }
            }
            return Ok(());
        }

        match tx.vote()? {
            Some(vote) => self.update_for_vote(index, sender, tx, &vote, direction),
            None => self.update_for_transfer(index, sender, recipient, tx, direction),
        }
        Ok(())
    }

    /// Halve every stake of `sender` that has reached its halving window.
    ///
    /// The delegate's view of the sender's stake weight is swapped out wholesale:
    /// the old weight is removed before the stake changes and the new one added after.
    fn sweep_halvings(&self, index: &mut WalletIndex, sender: WalletId) {
        let due: Vec<_> = index[sender]
            .stakes
            .iter()
            .filter(|(_, stake)| stake.is_halvable(self.now, self.halving_window_secs))
            .map(|(key, _)| key.clone())
            .collect();
        if due.is_empty() {
            return;
        }

        let delegate = voted_delegate(index, sender);
        for key in due {
            if let Some(delegate) = delegate {
                let old_weight = index[sender].stake_weight.clone();
                index[delegate].vote_balance -= &old_weight;
            }

            let wallet = &mut index[sender];
            if let Some(stake) = wallet.stakes.get_mut(&key) {
                let halved = stake.weight.halved();
                wallet.stake_weight -= &stake.weight;
                wallet.stake_weight += &halved;
                stake.weight = halved;
                stake.halved = true;
            }

            if let Some(delegate) = delegate {
                let new_weight = index[sender].stake_weight.clone();
                index[delegate].vote_balance += &new_weight;
            }
            info!(
                stake = %key,
                wallet = %index[sender].address,
                "stake weight halved"
            );
        }
    }

    fn update_for_transfer(
        &self,
        index: &mut WalletIndex,
        sender: WalletId,
        recipient: Option<WalletId>,
        tx: &Transaction,
        direction: Direction,
    ) {
        let m = self.balance_multiplier();
        if let Some(delegate) = voted_delegate(index, sender) {
            let weight = tx.total_debit().times(m);
            adjust(&mut index[delegate].vote_balance, &weight, direction.is_revert());
        }
        if let Some(delegate) = recipient.and_then(|r| voted_delegate(index, r)) {
            let weight = tx.amount.times(m);
            adjust(&mut index[delegate].vote_balance, &weight, !direction.is_revert());
        }
    }

    /// Vote weight moves with the sender's balance as it stands after the handler
    /// ran: post-fee on apply, pre-fee on revert.
    fn update_for_vote(
        &self,
        index: &mut WalletIndex,
        sender: WalletId,
        tx: &Transaction,
        vote: &VoteToken,
        direction: Direction,
    ) {
        let m = self.balance_multiplier();
        let wallet = &index[sender];
        let stake_weight = wallet.stake_weight.clone();
        let weight = match (vote, direction) {
            (VoteToken::Cast(_), Direction::Apply) | (VoteToken::Uncast(_), Direction::Revert) => {
                wallet.balance.times(m)
            }
            (VoteToken::Cast(_), Direction::Revert) => (&wallet.balance - &tx.fee).times(m),
            (VoteToken::Uncast(_), Direction::Apply) => (&wallet.balance + &tx.fee).times(m),
        };
        let weight = weight + stake_weight;
        let add = vote.is_cast() != direction.is_revert();

        let delegate = index.find_by_public_key(vote.delegate());
        adjust(&mut index[delegate].vote_balance, &weight, add);
        debug!(
            delegate = %vote.delegate(),
            %weight,
            add,
            "vote balance updated"
        );
    }
}

fn adjust(vote_balance: &mut Amount, weight: &Amount, add: bool) {
    if add {
        *vote_balance += weight;
    } else {
        *vote_balance -= weight;
    }
}

/// The delegate `wallet` votes for, resolved (and created if needed) by public key.
fn voted_delegate(index: &mut WalletIndex, wallet: WalletId) -> Option<WalletId> {
    let vote = index[wallet].vote.clone()?;
    Some(index.find_by_public_key(&vote))
}
