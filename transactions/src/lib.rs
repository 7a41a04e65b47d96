//! Decoded transaction model and stateless validation.
//!
//! Transaction kinds:
//! - **Transfer**: move `amount` from sender to recipient
//! - **SecondSignature**: register a second signing key
//! - **DelegateRegistration**: claim a delegate username
//! - **Vote**: cast or remove a single delegate vote
//! - **MultiSignature**: register a multi-signature group
//! - **DelegateResignation**: leave the delegate ranking
//! - **BusinessRegistration**: attach business details to a wallet
//! - **StakeCreate**: lock an amount for a duration in exchange for vote weight
//!
//! Signatures and wire encoding are handled upstream; this crate only deals with
//! already-decoded data.

pub mod block;
pub mod error;
pub mod stake;
pub mod validation;
pub mod vote;

pub use block::Block;
pub use error::TransactionError;
pub use stake::{StakeCreateAsset, StakeLevel};
pub use validation::validate_transaction;
pub use vote::VoteToken;

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_types::{Address, Amount, Nonce, PublicKey, Timestamp};

/// Transaction identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag used to look up a transaction handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    Transfer,
    SecondSignature,
    DelegateRegistration,
    Vote,
    MultiSignature,
    DelegateResignation,
    BusinessRegistration,
    StakeCreate,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::SecondSignature => "secondSignature",
            Self::DelegateRegistration => "delegateRegistration",
            Self::Vote => "vote",
            Self::MultiSignature => "multiSignature",
            Self::DelegateResignation => "delegateResignation",
            Self::BusinessRegistration => "businessRegistration",
            Self::StakeCreate => "stakeCreate",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignatureAsset {
    /// Signatures required out of `public_keys`.
    pub min: u8,
    pub public_keys: Vec<PublicKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessAsset {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
}

/// Type-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Asset {
    Transfer,
    #[serde(rename_all = "camelCase")]
    SecondSignature {
        public_key: PublicKey,
    },
    DelegateRegistration {
        username: String,
    },
    Vote {
        /// Raw vote tokens; parsed and checked by [`validate_transaction`].
        votes: Vec<String>,
    },
    MultiSignature(MultiSignatureAsset),
    DelegateResignation,
    BusinessRegistration(BusinessAsset),
    StakeCreate(StakeCreateAsset),
}

/// A decoded, signature-checked transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub sender_public_key: PublicKey,
    #[serde(default)]
    pub recipient_id: Option<Address>,
    #[serde(default)]
    pub amount: Amount,
    pub fee: Amount,
    pub nonce: Nonce,
    #[serde(default)]
    pub timestamp: Timestamp,
    pub asset: Asset,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        match &self.asset {
            Asset::Transfer => TransactionType::Transfer,
            Asset::SecondSignature { .. } => TransactionType::SecondSignature,
            Asset::DelegateRegistration { .. } => TransactionType::DelegateRegistration,
            Asset::Vote { .. } => TransactionType::Vote,
            Asset::MultiSignature(_) => TransactionType::MultiSignature,
            Asset::DelegateResignation => TransactionType::DelegateResignation,
            Asset::BusinessRegistration(_) => TransactionType::BusinessRegistration,
            Asset::StakeCreate(_) => TransactionType::StakeCreate,
        }
    }

    /// The single vote token of a vote transaction.
    pub fn vote(&self) -> Result<Option<VoteToken>, TransactionError> {
        match &self.asset {
            Asset::Vote { votes } => match votes.as_slice() {
                [single] => VoteToken::parse(single).map(Some),
                other => Err(TransactionError::VoteCount(other.len())),
            },
            _ => Ok(None),
        }
    }

    pub fn stake_create(&self) -> Option<&StakeCreateAsset> {
        match &self.asset {
            Asset::StakeCreate(asset) => Some(asset),
            _ => None,
        }
    }

    /// Amount plus fee, the total debited from the sender.
    pub fn total_debit(&self) -> Amount {
        &self.amount + &self.fee
    }
}
