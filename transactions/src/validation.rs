//! Transaction validation logic.

use crate::error::TransactionError;
use crate::{Asset, BusinessAsset, MultiSignatureAsset, StakeLevel, Transaction};
use std::collections::HashSet;

/// Longest delegate username accepted.
pub const MAX_USERNAME_LEN: usize = 20;

/// Validate a transaction's structure (amounts, asset shape).
///
/// This performs stateless validation only. Stateful checks (balance sufficiency,
/// nonce, delegate existence, etc.) are done by the ledger's transaction handlers.
pub fn validate_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.amount.is_negative() {
        return Err(TransactionError::NegativeAmount);
    }
    if tx.fee.is_negative() {
        return Err(TransactionError::NegativeFee);
    }

    match &tx.asset {
        Asset::Transfer => {
            if tx.amount.is_zero() {
                return Err(TransactionError::ZeroAmount);
            }
            if tx.recipient_id.is_none() {
                return Err(TransactionError::MissingRecipient("transfer"));
            }
        }
        Asset::Vote { .. } => {
            no_amount(tx, "vote")?;
            tx.vote()?;
        }
        Asset::DelegateRegistration { username } => {
            no_amount(tx, "delegate registration")?;
            validate_username(username)?;
        }
        Asset::MultiSignature(asset) => {
            no_amount(tx, "multi-signature")?;
            validate_multi_signature(asset)?;
        }
        Asset::BusinessRegistration(asset) => {
            no_amount(tx, "business registration")?;
            validate_business(asset)?;
        }
        Asset::StakeCreate(asset) => {
            no_amount(tx, "stake")?;
            if asset.amount.is_negative() || asset.amount.is_zero() {
                return Err(TransactionError::ZeroAmount);
            }
            if StakeLevel::from_duration(asset.duration).is_none() {
                return Err(TransactionError::StakeDurationTooShort(asset.duration));
            }
        }
        Asset::SecondSignature { .. } => no_amount(tx, "second signature")?,
        Asset::DelegateResignation => no_amount(tx, "delegate resignation")?,
    }

    Ok(())
}

fn no_amount(tx: &Transaction, kind: &'static str) -> Result<(), TransactionError> {
    if !tx.amount.is_zero() {
        return Err(TransactionError::UnexpectedAmount { kind });
    }
    Ok(())
}

/// Usernames are 1-20 characters of lowercase letters, digits, `!@$&_.`.
pub fn validate_username(username: &str) -> Result<(), TransactionError> {
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "!@$&_.".contains(c);
    if username.is_empty() || username.len() > MAX_USERNAME_LEN || !username.chars().all(allowed) {
        return Err(TransactionError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

fn validate_multi_signature(asset: &MultiSignatureAsset) -> Result<(), TransactionError> {
    if asset.public_keys.len() < 2 {
        return Err(TransactionError::MultiSignature(
            "at least two participants are required".into(),
        ));
    }
    if asset.min == 0 || asset.min as usize > asset.public_keys.len() {
        return Err(TransactionError::MultiSignature(format!(
            "min {} out of range for {} participants",
            asset.min,
            asset.public_keys.len()
        )));
    }
    let mut seen = HashSet::new();
    for key in &asset.public_keys {
        if !seen.insert(key) {
            return Err(TransactionError::MultiSignature(format!(
                "duplicate participant {key}"
            )));
        }
    }
    Ok(())
}

fn validate_business(asset: &BusinessAsset) -> Result<(), TransactionError> {
    if asset.name.trim().is_empty() {
        return Err(TransactionError::Business("name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stake::{StakeCreateAsset, THREE_MONTHS_SECS};
    use crate::TransactionId;
    use tally_types::{Address, Amount, Nonce, PublicKey, Timestamp};

    fn tx(asset: Asset, amount: i64, recipient: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::new("tx"),
            sender_public_key: PublicKey::from_hex("aa").unwrap(),
            recipient_id: recipient.map(Address::from),
            amount: Amount::from(amount),
            fee: Amount::from(10),
            nonce: Nonce::from(1),
            timestamp: Timestamp::EPOCH,
            asset,
        }
    }

    #[test]
    fn transfer_requires_amount_and_recipient() {
        assert!(validate_transaction(&tx(Asset::Transfer, 100, Some("tly_r"))).is_ok());
        assert_eq!(
            validate_transaction(&tx(Asset::Transfer, 0, Some("tly_r"))),
            Err(TransactionError::ZeroAmount)
        );
        assert_eq!(
            validate_transaction(&tx(Asset::Transfer, 100, None)),
            Err(TransactionError::MissingRecipient("transfer"))
        );
        assert_eq!(
            validate_transaction(&tx(Asset::Transfer, -1, Some("tly_r"))),
            Err(TransactionError::NegativeAmount)
        );
    }

    #[test]
    fn vote_without_prefix_fails() {
        let vote = Asset::Vote {
            votes: vec!["bb".into()],
        };
        assert_eq!(
            validate_transaction(&tx(vote, 0, None)),
            Err(TransactionError::InvalidVote("bb".into()))
        );
    }

    #[test]
    fn vote_with_amount_fails() {
        let vote = Asset::Vote {
            votes: vec!["+bb".into()],
        };
        assert!(matches!(
            validate_transaction(&tx(vote, 5, None)),
            Err(TransactionError::UnexpectedAmount { .. })
        ));
    }

    #[test]
    fn usernames() {
        assert!(validate_username("genesis_1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("UPPER").is_err());
        assert!(validate_username(&"a".repeat(21)).is_err());
    }

    #[test]
    fn short_stake_rejected() {
        let stake = |duration| {
            Asset::StakeCreate(StakeCreateAsset {
                duration,
                amount: Amount::from(100),
                timestamp: Timestamp::EPOCH,
            })
        };
        assert_eq!(
            validate_transaction(&tx(stake(THREE_MONTHS_SECS - 1), 0, None)),
            Err(TransactionError::StakeDurationTooShort(THREE_MONTHS_SECS - 1))
        );
        assert!(validate_transaction(&tx(stake(THREE_MONTHS_SECS), 0, None)).is_ok());
    }

    #[test]
    fn multi_signature_bounds() {
        let keys = vec![
            PublicKey::from_hex("01").unwrap(),
            PublicKey::from_hex("02").unwrap(),
        ];
        let ok = Asset::MultiSignature(MultiSignatureAsset {
            min: 2,
            public_keys: keys.clone(),
        });
        let too_many = Asset::MultiSignature(MultiSignatureAsset {
            min: 3,
            public_keys: keys.clone(),
        });
        let duplicate = Asset::MultiSignature(MultiSignatureAsset {
            min: 1,
            public_keys: vec![keys[0].clone(), keys[0].clone()],
        });
        assert!(validate_transaction(&tx(ok, 0, None)).is_ok());
        assert!(validate_transaction(&tx(too_many, 0, None)).is_err());
        assert!(validate_transaction(&tx(duplicate, 0, None)).is_err());
    }
}
