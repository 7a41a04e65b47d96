use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, Asset, Transaction, TransactionError, TransactionType,
};

fn username(tx: &Transaction) -> Result<&str, HandlerError> {
    match &tx.asset {
        Asset::DelegateRegistration { username } => Ok(username),
        _ => Err(TransactionError::Other("not a delegate registration".into()).into()),
    }
}

/// Claims a username and makes the sender a delegate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegateRegistrationHandler;

impl TransactionHandler for DelegateRegistrationHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::DelegateRegistration
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        let name = username(tx)?;
        if sender.is_delegate() {
            return Err(HandlerError::AlreadyDelegate);
        }
        if index.has_by_username(name) {
            return Err(HandlerError::UsernameTaken(name.to_string()));
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let name = username(tx)?.to_string();
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].username = Some(name);
        index.reindex(id);
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let name = username(tx)?;
        let id = revert_for_sender(tx, index, &tx.total_debit())?;
        let wallet = &mut index[id];
        wallet.username = None;
        wallet.rate = None;
        index.forget_by_username(name);
        Ok(())
    }
}

/// Removes the sender from future delegate rankings.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegateResignationHandler;

impl TransactionHandler for DelegateResignationHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::DelegateResignation
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        if !sender.is_delegate() {
            return Err(HandlerError::NotDelegate);
        }
        if sender.resigned {
            return Err(HandlerError::AlreadyResigned);
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].resigned = true;
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let id = revert_for_sender(tx, index, &tx.total_debit())?;
        index[id].resigned = false;
        Ok(())
    }
}
