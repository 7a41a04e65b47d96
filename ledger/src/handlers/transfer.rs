use super::{
    apply_to_recipient, apply_to_sender, check_sender, revert_for_recipient, revert_for_sender,
    HandlerContext, TransactionHandler,
};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{validate_transaction, Transaction, TransactionError, TransactionType};

/// Moves `amount` from sender to recipient.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransferHandler;

impl TransactionHandler for TransferHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Transfer
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        if tx.recipient_id.is_none() {
            return Err(TransactionError::MissingRecipient("transfer").into());
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        apply_to_recipient(tx, index);
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        revert_for_sender(tx, index, &tx.total_debit())?;
        revert_for_recipient(tx, index);
        Ok(())
    }
}
