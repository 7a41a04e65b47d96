use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, Asset, BusinessAsset, Transaction, TransactionError, TransactionType,
};

fn asset(tx: &Transaction) -> Result<&BusinessAsset, HandlerError> {
    match &tx.asset {
        Asset::BusinessRegistration(asset) => Ok(asset),
        _ => Err(TransactionError::Other("not a business registration".into()).into()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BusinessRegistrationHandler;

impl TransactionHandler for BusinessRegistrationHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::BusinessRegistration
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        if sender.attributes.business.is_some() {
            return Err(HandlerError::BusinessAlreadyRegistered);
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let business = asset(tx)?.clone();
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].attributes.business = Some(business);
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        asset(tx)?;
        let id = revert_for_sender(tx, index, &tx.total_debit())?;
        index[id].attributes.business = None;
        Ok(())
    }
}
