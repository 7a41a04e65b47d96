use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, Asset, Transaction, TransactionError, TransactionType,
};
use tally_types::PublicKey;

fn second_key(tx: &Transaction) -> Result<&PublicKey, HandlerError> {
    match &tx.asset {
        Asset::SecondSignature { public_key } => Ok(public_key),
        _ => Err(TransactionError::Other("not a second signature registration".into()).into()),
    }
}

/// Registers a second signing key on the sender.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecondSignatureHandler;

impl TransactionHandler for SecondSignatureHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::SecondSignature
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        if sender.has_second_signature() {
            return Err(HandlerError::SecondSignatureAlreadyRegistered);
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let key = second_key(tx)?.clone();
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].attributes.second_public_key = Some(key);
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let key = second_key(tx)?;
        let id = index.find_by_public_key(&tx.sender_public_key);
        if index[id].attributes.second_public_key.as_ref() != Some(key) {
            return Err(HandlerError::RevertMismatch("second public key"));
        }
        revert_for_sender(tx, index, &tx.total_debit())?;
        index[id].attributes.second_public_key = None;
        Ok(())
    }
}
