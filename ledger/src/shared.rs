//! Thread-safe handle to a [`WalletManager`].
//!
//! Block application needs exclusive access; queries may run concurrently with
//! each other.

use crate::error::LedgerError;
use crate::manager::WalletManager;
use crate::ranking::DelegateRanking;
use crate::stake::StakeKey;
use parking_lot::RwLock;
use std::sync::Arc;
use tally_transactions::{Block, Transaction};
use tally_types::{RoundInfo, Timestamp};

#[derive(Clone, Debug)]
pub struct SharedWalletManager {
    inner: Arc<RwLock<WalletManager>>,
}

impl SharedWalletManager {
    pub fn new(manager: WalletManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&WalletManager) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut WalletManager) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn apply_block(&self, block: &Block) -> Result<(), LedgerError> {
        self.inner.write().apply_block(block)
    }

    pub fn revert_block(&self, block: &Block) -> Result<(), LedgerError> {
        self.inner.write().revert_block(block)
    }

    pub fn apply_transaction(&self, tx: &Transaction) -> Result<(), LedgerError> {
        self.inner.write().apply_transaction(tx)
    }

    pub fn revert_transaction(&self, tx: &Transaction) -> Result<(), LedgerError> {
        self.inner.write().revert_transaction(tx)
    }

    pub fn build_delegate_ranking(
        &self,
        round: Option<&RoundInfo>,
    ) -> Result<DelegateRanking, LedgerError> {
        self.inner.write().build_delegate_ranking(round)
    }

    pub fn process_power_ups(&self, until: Timestamp) -> Vec<StakeKey> {
        self.inner.write().process_power_ups(until)
    }

    /// A detached copy of the current state.
    pub fn fork(&self) -> WalletManager {
        self.inner.read().fork()
    }
}
