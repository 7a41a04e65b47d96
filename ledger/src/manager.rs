//! Block and transaction orchestration over the wallet index.
//!
//! The manager owns the wallet index and applies or reverts whole blocks against
//! it. A block either applies completely or leaves the index as it found it: any
//! failure part-way through rolls back everything the block had already done, in
//! reverse order.

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::handlers::{HandlerContext, HandlerRegistry};
use crate::hooks::{ExceptionRegistry, NoRedistribution, RewardRedistribution};
use crate::index::{WalletId, WalletIndex};
use crate::power_up::PowerUpSchedule;
use crate::ranking::{build_delegate_ranking, DelegateRanking};
use crate::stake::StakeKey;
use crate::vote_balance::{Direction, VoteBalanceUpdater};
use crate::wallet::Wallet;
use std::sync::Arc;
use tally_crypto::derive_address;
use tally_transactions::{Block, Transaction};
use tally_types::{
    Address, Amount, BlockData, Clock, Milestone, Milestones, Multiplier, PublicKey, RoundInfo,
    Timestamp,
};
use tally_utils::format_duration;
use tracing::{debug, error, info, warn};

/// Owns the wallet index and every collaborator needed to move it between blocks.
#[derive(Clone)]
pub struct WalletManager {
    index: WalletIndex,
    registry: Arc<HandlerRegistry>,
    milestones: Arc<Milestones>,
    clock: Arc<dyn Clock>,
    redistribution: Arc<dyn RewardRedistribution>,
    exceptions: Arc<dyn ExceptionRegistry>,
    halving_window_secs: u64,
    power_up_delay_secs: u64,
    power_ups: PowerUpSchedule,
    height: u64,
}

impl WalletManager {
    /// A manager with the built-in handlers, no reward redistribution and the
    /// configured exception list.
    pub fn new(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            index: WalletIndex::new(),
            registry: Arc::new(HandlerRegistry::with_defaults()),
            milestones: Arc::new(config.milestones.clone()),
            clock,
            redistribution: Arc::new(NoRedistribution),
            exceptions: Arc::new(config.exception_list()),
            halving_window_secs: config.halving_window_secs,
            power_up_delay_secs: config.power_up_delay_secs,
            power_ups: PowerUpSchedule::new(),
            height: 0,
        }
    }

    pub fn with_registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_redistribution(mut self, redistribution: Arc<dyn RewardRedistribution>) -> Self {
        self.redistribution = redistribution;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Arc<dyn ExceptionRegistry>) -> Self {
        self.exceptions = exceptions;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn index(&self) -> &WalletIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut WalletIndex {
        &mut self.index
    }

    pub fn wallet(&self, id: WalletId) -> Option<&Wallet> {
        self.index.get(id)
    }

    /// Height of the chain tip: the last block applied, or one below the last block
    /// reverted. A rejected block leaves it unchanged.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn pending_power_ups(&self) -> usize {
        self.power_ups.len()
    }

    pub fn find_by_address(&mut self, address: &Address) -> WalletId {
        self.index.find_by_address(address)
    }

    pub fn find_by_public_key(&mut self, public_key: &PublicKey) -> WalletId {
        self.index.find_by_public_key(public_key)
    }

    pub fn find_by_username(&self, username: &str) -> Option<WalletId> {
        self.index.find_by_username(username)
    }

    /// Whether `public_key` belongs to a registered delegate.
    pub fn is_delegate(&self, public_key: &PublicKey) -> bool {
        self.index
            .get_by_public_key(public_key)
            .and_then(|id| self.index.get(id))
            .is_some_and(Wallet::is_delegate)
    }

    pub fn can_be_purged(&self, id: WalletId) -> bool {
        self.index.get(id).is_some_and(Wallet::can_be_purged)
    }

    pub fn purge_empty_non_delegates(&mut self) -> usize {
        self.index.purge_empty_non_delegates()
    }

    /// An independent deep copy sharing only the immutable collaborators.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Clear every wallet and pending power-up.
    pub fn reset(&mut self) {
        self.index.reset();
        self.power_ups = PowerUpSchedule::new();
        self.height = 0;
    }

    fn milestones(&self) -> Arc<Milestones> {
        Arc::clone(&self.milestones)
    }

    // ── Blocks ───────────────────────────────────────────────────────────

    /// Apply every transaction of `block`, then the generator reward and the
    /// reward redistribution.
    ///
    /// On failure the index is restored to its state before the call and the
    /// triggering error is returned. [`LedgerError::UnknownGenerator`] is fatal.
    pub fn apply_block(&mut self, block: &Block) -> Result<(), LedgerError> {
        let data = &block.data;

        let generator = match self.index.get_by_public_key(&data.generator_public_key) {
            Some(id) => id,
            None if data.is_genesis() => self.index.find_by_public_key(&data.generator_public_key),
            None => {
                error!(
                    generator = %data.generator_public_key,
                    block = %data.id,
                    height = data.height,
                    "failed to look up block generator"
                );
                return Err(LedgerError::UnknownGenerator {
                    public_key: data.generator_public_key.clone(),
                    block: data.id.clone(),
                });
            }
        };

        let mut applied: Vec<&Transaction> = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            if let Err(e) = self.apply_transaction_at(tx, data.height) {
                error!(
                    block = %data.id,
                    tx = %tx.id,
                    applied = applied.len(),
                    "failed to apply all transactions in block, reverting previous transactions"
                );
                self.roll_back(&applied, data.height);
                return Err(e);
            }
            applied.push(tx);
        }

        if self.apply_generator_reward(generator, data) {
            if let Err(e) = self.redistribution.apply_reward(data, &mut self.index) {
                error!(block = %data.id, error = %e, "reward redistribution failed, reverting block");
                self.revert_generator_reward(generator, data);
                self.roll_back(&applied, data.height);
                return Err(e);
            }
        }

        self.height = data.height;
        debug!(
            block = %data.id,
            height = data.height,
            transactions = block.transactions.len(),
            "applied block"
        );
        Ok(())
    }

    /// Undo [`WalletManager::apply_block`] in strict inverse order: redistribution,
    /// generator reward, then transactions last to first.
    ///
    /// If a transaction fails to revert, everything already reverted is re-applied
    /// and [`LedgerError::RevertFailure`] is returned.
    pub fn revert_block(&mut self, block: &Block) -> Result<(), LedgerError> {
        let data = &block.data;

        let Some(generator) = self.index.get_by_public_key(&data.generator_public_key) else {
            error!(
                generator = %data.generator_public_key,
                block = %data.id,
                "failed to look up block generator"
            );
            return Err(LedgerError::UnknownGenerator {
                public_key: data.generator_public_key.clone(),
                block: data.id.clone(),
            });
        };

        let rewarded = self
            .index
            .get(generator)
            .is_some_and(|w| w.public_key.as_ref() == Some(&data.generator_public_key));
        if rewarded {
            if let Err(e) = self.redistribution.revert_reward(data, &mut self.index) {
                error!(block = %data.id, error = %e, "failed to revert reward redistribution");
                return Err(LedgerError::RevertFailure {
                    block: data.id.clone(),
                    source: Box::new(e),
                });
            }
            self.revert_generator_reward(generator, data);
        }

        let mut reverted: Vec<&Transaction> = Vec::with_capacity(block.transactions.len());
        for tx in block.transactions.iter().rev() {
            if let Err(e) = self.revert_transaction_at(tx, data.height) {
                error!(
                    block = %data.id,
                    tx = %tx.id,
                    error = %e,
                    "failed to revert all transactions in block, applying previous transactions"
                );
                for tx in reverted.iter().rev() {
                    if let Err(reapply) = self.apply_transaction_at(tx, data.height) {
                        error!(tx = %tx.id, error = %reapply, "failed to re-apply transaction");
                    }
                }
                if rewarded {
                    self.apply_generator_reward(generator, data);
                    if let Err(reapply) = self.redistribution.apply_reward(data, &mut self.index) {
                        error!(block = %data.id, error = %reapply, "failed to re-apply redistribution");
                    }
                }
                return Err(LedgerError::RevertFailure {
                    block: data.id.clone(),
                    source: Box::new(e),
                });
            }
            reverted.push(tx);
        }

        self.height = data.height.saturating_sub(1);
        debug!(block = %data.id, height = data.height, "reverted block");
        Ok(())
    }

    /// Credit the generator and move the reward onto the delegate it votes for.
    fn apply_generator_reward(&mut self, generator: WalletId, block: &BlockData) -> bool {
        if !self.index[generator].apply_block(block) {
            return false;
        }
        self.shift_reward_vote_weight(generator, block, true);
        true
    }

    fn revert_generator_reward(&mut self, generator: WalletId, block: &BlockData) -> bool {
        if !self.index[generator].revert_block(block) {
            return false;
        }
        self.shift_reward_vote_weight(generator, block, false);
        true
    }

    fn shift_reward_vote_weight(&mut self, generator: WalletId, block: &BlockData, add: bool) {
        let Some(vote) = self.index[generator].vote.clone() else {
            return;
        };
        let milestones = self.milestones();
        let weight = block
            .total_reward()
            .times(&milestones.at(block.height).stake_levels.balance);
        let delegate = self.index.find_by_public_key(&vote);
        let vote_balance = &mut self.index[delegate].vote_balance;
        if add {
            *vote_balance += &weight;
        } else {
            *vote_balance -= &weight;
        }
    }

    fn roll_back(&mut self, applied: &[&Transaction], height: u64) {
        for tx in applied.iter().rev() {
            if let Err(e) = self.revert_transaction_at(tx, height) {
                error!(tx = %tx.id, error = %e, "failed to roll back transaction");
            }
        }
    }

    // ── Transactions ─────────────────────────────────────────────────────

    /// Validate and apply one transaction, then update vote balances.
    ///
    /// Listed exceptions skip validation. A transaction that fails validation
    /// leaves every wallet balance untouched. The milestone is the one in force at
    /// [`WalletManager::height`].
    pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        self.apply_transaction_at(tx, self.height)
    }

    fn apply_transaction_at(&mut self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let registry = Arc::clone(&self.registry);
        let handler = registry.get(tx.transaction_type())?;
        let sender = self.index.find_by_public_key(&tx.sender_public_key);
        let recipient = tx
            .recipient_id
            .as_ref()
            .map(|address| self.index.find_by_address(address));

        let is_exception = self.exceptions.is_exception(tx);
        if is_exception {
            warn!(
                tx = %tx.id,
                sender = %self.index[sender].address,
                "transaction is an exception, applying without validation"
            );
        } else if let Err(source) = handler.can_be_applied(tx, &self.index[sender], &self.index) {
            let wallet = &self.index[sender];
            error!(
                tx = %tx.id,
                sender = %wallet.address,
                error = %source,
                "can't apply transaction"
            );
            debug!(
                audit = %serde_json::to_string(&wallet.audit_apply(tx)).unwrap_or_default(),
                "audit"
            );
            return Err(LedgerError::Validation {
                id: tx.id.clone(),
                sender: wallet.address.clone(),
                source,
            });
        }

        let milestones = self.milestones();
        let milestone = milestones.at(height);
        let ctx = HandlerContext {
            milestone,
            allow_overdraft: is_exception,
        };
        handler.apply(tx, &mut self.index, &ctx)?;

        if let Err(e) = self
            .updater(milestone)
            .update(&mut self.index, sender, recipient, tx, Direction::Apply)
        {
            if let Err(undo) = handler.revert(tx, &mut self.index, &ctx) {
                error!(tx = %tx.id, error = %undo, "failed to undo handler after vote update error");
            }
            return Err(e);
        }

        if let Some(stake) = tx.stake_create() {
            let due = stake.timestamp.plus_secs(self.power_up_delay_secs);
            self.power_ups
                .schedule(tx.id.clone(), tx.sender_public_key.clone(), due);
            debug!(
                stake = %tx.id,
                %due,
                lock = %format_duration(stake.duration),
                "scheduled stake power-up"
            );
        }
        Ok(())
    }

    /// Undo a previously applied transaction. No validation is performed.
    ///
    /// Reverting a stake that already powered up also takes its power back off the
    /// voted delegate.
    pub fn revert_transaction(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        self.revert_transaction_at(tx, self.height)
    }

    fn revert_transaction_at(&mut self, tx: &Transaction, height: u64) -> Result<(), LedgerError> {
        let registry = Arc::clone(&self.registry);
        let handler = registry.get(tx.transaction_type())?;
        let sender = self.index.find_by_public_key(&tx.sender_public_key);
        let recipient = tx
            .recipient_id
            .as_ref()
            .map(|address| self.index.find_by_address(address));

        let milestones = self.milestones();
        let milestone = milestones.at(height);
        // Re-applying a reverted transaction restores a state that already existed.
        let ctx = HandlerContext {
            milestone,
            allow_overdraft: true,
        };
        let powered = self.index[sender]
            .stakes
            .get(&tx.id)
            .filter(|stake| tx.stake_create().is_some() && stake.active)
            .map(|stake| stake.power.clone());
        handler.revert(tx, &mut self.index, &ctx)?;

        if let Err(e) = self
            .updater(milestone)
            .update(&mut self.index, sender, recipient, tx, Direction::Revert)
        {
            match handler.apply(tx, &mut self.index, &ctx) {
                Ok(()) if powered.is_some() => {
                    self.activate_stake(sender, &tx.id);
                }
                Ok(()) => {}
                Err(redo) => {
                    error!(tx = %tx.id, error = %redo, "failed to redo handler after vote update error");
                }
            }
            return Err(e);
        }

        if let Some(stake) = tx.stake_create() {
            if let Some(power) = &powered {
                self.power_down(sender, &stake.amount, power);
            }
            self.power_ups.remove(&tx.id);
        }
        Ok(())
    }

    fn updater<'a>(&self, milestone: &'a Milestone) -> VoteBalanceUpdater<'a> {
        VoteBalanceUpdater::new(milestone, self.clock.now(), self.halving_window_secs)
    }

    // ── Delegates ────────────────────────────────────────────────────────

    /// Rank delegates, writing each one's rank back to its wallet.
    pub fn build_delegate_ranking(
        &mut self,
        round: Option<&RoundInfo>,
    ) -> Result<DelegateRanking, LedgerError> {
        build_delegate_ranking(&mut self.index, round)
    }

    /// The ranked active delegate set for `round`. Fewer registered delegates than
    /// the round needs is fatal.
    pub fn load_active_delegate_list(
        &mut self,
        round: &RoundInfo,
    ) -> Result<DelegateRanking, LedgerError> {
        let ranking = build_delegate_ranking(&mut self.index, Some(round))?;
        debug!(
            round = round.round,
            delegates = ranking.delegates.len(),
            "loaded active delegates"
        );
        Ok(ranking)
    }

    /// Add every voter's contribution to its delegate's vote balance: stake weight
    /// plus a tenth of its liquid balance.
    ///
    /// Used once after bulk-loading wallets; vote balances are assumed to start at
    /// zero. Voters whose delegate is unknown are skipped with a warning.
    pub fn build_vote_balances(&mut self) {
        let fraction = Multiplier::decimal(1, 1);
        let mut contributions: Vec<(WalletId, Amount)> = Vec::new();
        for (_, voter) in self.index.all_by_public_key() {
            let Some(vote) = &voter.vote else {
                continue;
            };
            match self.index.get_by_public_key(vote) {
                Some(delegate) => {
                    let weight = &voter.stake_weight + &voter.balance.times(&fraction);
                    contributions.push((delegate, weight));
                }
                None => warn!(
                    voter = %voter.address,
                    delegate = %vote,
                    "voter's delegate is unknown, skipping"
                ),
            }
        }
        for (delegate, weight) in contributions {
            self.index[delegate].vote_balance += &weight;
        }
    }

    // ── Stake power-ups ──────────────────────────────────────────────────

    /// Power up every scheduled stake due at or before `until`.
    ///
    /// Stakes that no longer qualify (reverted, halved, canceled or already active)
    /// are dropped from the schedule. Returns the keys that powered up.
    pub fn process_power_ups(&mut self, until: Timestamp) -> Vec<StakeKey> {
        let due = self.power_ups.take_due(until);
        if due.is_empty() {
            return Vec::new();
        }
        info!(count = due.len(), "processing stake power-ups");

        let mut powered = Vec::new();
        for entry in due {
            let owner = self.index.get_by_public_key(&entry.owner);
            let qualifies = owner
                .and_then(|id| self.index[id].stakes.get(&entry.stake))
                .is_some_and(|stake| stake.can_power_up());
            match owner {
                Some(id) if qualifies => {
                    self.power_up(id, &entry.stake);
                    info!(stake = %entry.stake, wallet = %self.index[id].address, "stake powered up");
                    powered.push(entry.stake);
                }
                _ => info!(
                    stake = %entry.stake,
                    owner = %derive_address(&entry.owner),
                    "unknown or ineligible stake dropped from power-up schedule"
                ),
            }
        }
        powered
    }

    fn power_up(&mut self, id: WalletId, key: &StakeKey) {
        let Some((amount, power)) = self.activate_stake(id, key) else {
            return;
        };
        if let Some(vote) = self.index[id].vote.clone() {
            let delegate = self.index.find_by_public_key(&vote);
            let vote_balance = &mut self.index[delegate].vote_balance;
            *vote_balance -= &amount;
            *vote_balance += &power;
        }
    }

    /// Mark the stake active and add its power to the owner, leaving the delegate
    /// alone. Returns the stake's amount and power.
    fn activate_stake(&mut self, id: WalletId, key: &StakeKey) -> Option<(Amount, Amount)> {
        let wallet = &mut self.index[id];
        let stake = wallet.stakes.get_mut(key)?;
        stake.active = true;
        let amount = stake.amount.clone();
        let power = stake.power.clone();
        wallet.stake_power += &power;
        Some((amount, power))
    }

    /// Move a reverted stake's power-up back off the owner's delegate. The stake
    /// itself is already gone.
    fn power_down(&mut self, id: WalletId, amount: &Amount, power: &Amount) {
        let Some(vote) = self.index[id].vote.clone() else {
            return;
        };
        let delegate = self.index.find_by_public_key(&vote);
        let vote_balance = &mut self.index[delegate].vote_balance;
        *vote_balance -= power;
        *vote_balance += amount;
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("wallets", &self.index.len())
            .field("height", &self.height)
            .field("registry", &self.registry)
            .field("pending_power_ups", &self.power_ups.len())
            .finish()
    }
}
