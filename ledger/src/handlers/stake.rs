use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::stake::StakeObject;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, StakeCreateAsset, Transaction, TransactionError, TransactionType,
};
use tally_types::{Amount, Milestone};

fn asset(tx: &Transaction) -> Result<&StakeCreateAsset, HandlerError> {
    tx.stake_create()
        .ok_or_else(|| TransactionError::Other("not a stake creation".into()).into())
}

/// Weight a stake contributes: its amount times the milestone's tier multiplier.
pub(crate) fn stake_weight(
    asset: &StakeCreateAsset,
    milestone: &Milestone,
) -> Result<Amount, HandlerError> {
    let level = asset
        .level()
        .ok_or(TransactionError::StakeDurationTooShort(asset.duration))?;
    Ok(asset.amount.times(level.multiplier(&milestone.stake_levels)))
}

/// Locks part of the sender's balance as a stake.
///
/// The staked amount leaves the liquid balance together with the fee; the stake's
/// weight is added to the sender's stake weight.
#[derive(Debug, Default, Clone, Copy)]
pub struct StakeCreateHandler;

impl TransactionHandler for StakeCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakeCreate
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        _index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        let stake = asset(tx)?;
        if sender.stakes.contains_key(&tx.id) {
            return Err(HandlerError::StakeExists(tx.id.clone()));
        }
        check_sender(tx, sender, &(&tx.fee + &stake.amount))
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let stake = asset(tx)?;
        let weight = stake_weight(stake, ctx.milestone)?;
        if let Some(id) = index.get_by_public_key(&tx.sender_public_key) {
            if index[id].stakes.contains_key(&tx.id) {
                return Err(HandlerError::StakeExists(tx.id.clone()));
            }
        }

        let id = apply_to_sender(tx, index, &(&tx.fee + &stake.amount), ctx)?;
        let sender = &mut index[id];
        sender.stake_weight += &weight;
        sender
            .stakes
            .insert(tx.id.clone(), StakeObject::new(stake, weight));
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let stake = asset(tx)?;
        let id = index.find_by_public_key(&tx.sender_public_key);
        if !index[id].stakes.contains_key(&tx.id) {
            return Err(HandlerError::UnknownStake(tx.id.clone()));
        }

        revert_for_sender(tx, index, &(&tx.fee + &stake.amount))?;
        let sender = &mut index[id];
        if let Some(object) = sender.stakes.remove(&tx.id) {
            sender.stake_weight -= &object.weight;
            if object.active {
                sender.stake_power -= &object.power;
            }
        }
        Ok(())
    }
}
