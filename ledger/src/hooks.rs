//! Collaborator seams invoked by the wallet manager.

use crate::error::LedgerError;
use crate::index::WalletIndex;
use std::collections::HashSet;
use tally_transactions::{Transaction, TransactionId};
use tally_types::BlockData;

/// Post-reward redistribution run after the generator has been credited.
///
/// `revert_reward` must exactly undo `apply_reward` for the same block.
pub trait RewardRedistribution: Send + Sync {
    fn apply_reward(&self, block: &BlockData, index: &mut WalletIndex) -> Result<(), LedgerError>;
    fn revert_reward(&self, block: &BlockData, index: &mut WalletIndex)
        -> Result<(), LedgerError>;
}

/// Redistribution that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRedistribution;

impl RewardRedistribution for NoRedistribution {
    fn apply_reward(&self, _: &BlockData, _: &mut WalletIndex) -> Result<(), LedgerError> {
        Ok(())
    }

    fn revert_reward(&self, _: &BlockData, _: &mut WalletIndex) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Historical transactions that are applied without validation.
pub trait ExceptionRegistry: Send + Sync {
    fn is_exception(&self, tx: &Transaction) -> bool;
}

/// Exceptions listed by transaction id.
#[derive(Debug, Default, Clone)]
pub struct ExceptionList {
    ids: HashSet<TransactionId>,
}

impl ExceptionList {
    pub fn new(ids: impl IntoIterator<Item = TransactionId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ExceptionRegistry for ExceptionList {
    fn is_exception(&self, tx: &Transaction) -> bool {
        self.ids.contains(&tx.id)
    }
}
