use super::{apply_to_sender, check_sender, revert_for_sender, HandlerContext, TransactionHandler};
use crate::error::HandlerError;
use crate::index::WalletIndex;
use crate::wallet::Wallet;
use tally_transactions::{
    validate_transaction, Transaction, TransactionError, TransactionType, VoteToken,
};

/// Casts or removes the sender's single delegate vote.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoteHandler;

fn token(tx: &Transaction) -> Result<VoteToken, HandlerError> {
    tx.vote()?
        .ok_or_else(|| TransactionError::Other("not a vote transaction".into()).into())
}

impl TransactionHandler for VoteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Vote
    }

    fn can_be_applied(
        &self,
        tx: &Transaction,
        sender: &Wallet,
        index: &WalletIndex,
    ) -> Result<(), HandlerError> {
        validate_transaction(tx)?;
        match token(tx)? {
            VoteToken::Cast(delegate) => {
                if let Some(current) = &sender.vote {
                    return Err(HandlerError::AlreadyVoted(current.clone()));
                }
                let wallet = index
                    .get_by_public_key(&delegate)
                    .and_then(|id| index.get(id))
                    .filter(|w| w.is_delegate())
                    .ok_or_else(|| HandlerError::UnknownDelegate(delegate.clone()))?;
                if wallet.resigned {
                    return Err(HandlerError::DelegateResigned(delegate));
                }
            }
            VoteToken::Uncast(delegate) => match &sender.vote {
                None => return Err(HandlerError::NoVote),
                Some(current) if *current != delegate => {
                    return Err(HandlerError::VoteMismatch {
                        voted: current.clone(),
                        requested: delegate,
                    })
                }
                Some(_) => {}
            },
        }
        check_sender(tx, sender, &tx.total_debit())
    }

    fn apply(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let vote = token(tx)?;
        let id = apply_to_sender(tx, index, &tx.total_debit(), ctx)?;
        index[id].vote = match vote {
            VoteToken::Cast(delegate) => Some(delegate),
            VoteToken::Uncast(_) => None,
        };
        Ok(())
    }

    fn revert(
        &self,
        tx: &Transaction,
        index: &mut WalletIndex,
        _ctx: &HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let vote = token(tx)?;
        let id = revert_for_sender(tx, index, &tx.total_debit())?;
        index[id].vote = match vote {
            VoteToken::Cast(_) => None,
            VoteToken::Uncast(delegate) => Some(delegate),
        };
        Ok(())
    }
}
