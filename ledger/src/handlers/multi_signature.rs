use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, Asset, MultiSignatureAsset, Transaction, TransactionError,
    TransactionType,
};

fn asset(tx: &Transaction) -> Result<&MultiSignatureAsset, HandlerError> {
    match &tx.asset {
        Asset::MultiSignature(asset) => Ok(asset),
        _ => Err(TransactionError::Other("not a multi-signature registration".into()).into()),
    }
}

/// Registers a multi-signature group on the sender.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiSignatureHandler;

impl TransactionHandler for MultiSignatureHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::MultiSignature
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        if sender.has_multi_signature() {
            return Err(HandlerError::MultiSignatureAlreadyRegistered);
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let group = asset(tx)?.clone();
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].attributes.multi_signature = Some(group);
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
        index[id].attributes.multi_signature = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use tally_types::Milestone;

    #[test]
    fn registration_round_trip() {
        let milestone = Milestone::default();
        let ctx = HandlerContext::new(&milestone);
        let mut index = WalletIndex::new();
        let id = funded(&mut index, "aa", 100);
        let t = tx(
            "aa",
            1,
            Asset::MultiSignature(MultiSignatureAsset {
                min: 2,
                public_keys: vec![key("01"), key("02"), key("03")],
            }),
        );
        MultiSignatureHandler
            .can_be_applied(&t, &index[id], &index)
            .unwrap();
        MultiSignatureHandler.apply(&t, &mut index, &ctx).unwrap();
        assert!(index[id].has_multi_signature());
        assert!(!index[id].can_be_purged());
        MultiSignatureHandler.revert(&t, &mut index, &ctx).unwrap();
        assert!(!index[id].has_multi_signature());
    }
}
