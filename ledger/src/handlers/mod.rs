//! Per-type transaction handlers.
//!
//! A handler owns everything a transaction does to wallets *except* vote balances,
//! which the vote-balance updater adjusts afterwards. `apply` and `revert` must be
//! exact inverses for any transaction `can_be_applied` accepted.

mod business;
mod delegate;
mod multi_signature;
mod registry;
mod second_signature;
mod stake;
mod transfer;
mod vote;

pub use business::BusinessRegistrationHandler;
pub use delegate::{DelegateRegistrationHandler, DelegateResignationHandler};
pub use multi_signature::MultiSignatureHandler;
pub use registry::HandlerRegistry;
pub use second_signature::SecondSignatureHandler;
pub use stake::StakeCreateHandler;
pub use transfer::TransferHandler;
pub use vote::VoteHandler;

pub(crate) use stake::stake_weight;

use crate::error::HandlerError;
use crate::index::{WalletId, WalletIndex};
use crate::wallet::Wallet;
use tally_transactions::{validate_transaction, Transaction, TransactionType};
use tally_types::{Amount, Milestone};

/// Chain parameters in force for the block being processed.
#[derive(Clone, Copy, Debug)]
pub struct HandlerContext<'a> {
    pub milestone: &'a Milestone,
    /// Set for exception transactions, which may drive the sender negative.
    pub allow_overdraft: bool,
}

impl<'a> HandlerContext<'a> {
    pub fn new(milestone: &'a Milestone) -> Self {
        Self {
            milestone,
            allow_overdraft: false,
        }
    }
}

pub trait TransactionHandler: Send + Sync {
    fn transaction_type(&self) -> TransactionType;

    /// Stateful checks against the sender wallet.
    ///
    /// The default runs stateless validation plus the nonce and balance checks
    /// every transaction needs.
    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError>;

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError>;
}

pub(crate) fn check_sender(
    tx: &Transaction,
    sender: &Wallet,
    debit: &Amount,
) -> Result<(), HandlerError> {
    let expected = sender.nonce.next();
    if tx.nonce != expected {
        return Err(HandlerError::UnexpectedNonce {
            expected,
            got: tx.nonce.clone(),
        });
    }
    if &sender.balance < debit {
        return Err(HandlerError::InsufficientBalance {
            needed: debit.clone(),
            available: sender.balance.clone(),
        });
    }
    Ok(())
}

/// Debit the sender and advance its nonce.
///
/// Checks everything before touching the wallet, so an error leaves it unchanged.
pub(crate) fn apply_to_sender(
    tx: &Transaction,
    index: &mut WalletIndex,
    debit: &Amount,
    ctx: &HandlerContext<'_>,
) -> Result<WalletId, HandlerError> {
    let id = index.find_by_public_key(&tx.sender_public_key);
    let sender = &mut index[id];
    if !ctx.allow_overdraft && &sender.balance < debit {
        return Err(HandlerError::InsufficientBalance {
            needed: debit.clone(),
            available: sender.balance.clone(),
        });
    }
    sender.balance -= debit;
    sender.nonce.increment();
    Ok(id)
}

pub(crate) fn revert_for_sender(
    tx: &Transaction,
    index: &mut WalletIndex,
    debit: &Amount,
) -> Result<WalletId, HandlerError> {
    let id = index.find_by_public_key(&tx.sender_public_key);
    let sender = &mut index[id];
    if sender.nonce != tx.nonce {
        return Err(HandlerError::UnexpectedNonce {
            expected: sender.nonce.clone(),
            got: tx.nonce.clone(),
        });
    }
    sender.nonce.decrement()?;
    sender.balance += debit;
    Ok(id)
}

pub(crate) fn apply_to_recipient(tx: &Transaction, index: &mut WalletIndex) {
    if let Some(address) = &tx.recipient_id {
        let id = index.find_by_address(address);
        index[id].balance += &tx.amount;
    }
}

pub(crate) fn revert_for_recipient(tx: &Transaction, index: &mut WalletIndex) {
    if let Some(address) = &tx.recipient_id {
        let id = index.find_by_address(address);
        index[id].balance -= &tx.amount;
    }
}
