//! Vote tokens: `+publicKey` casts a vote, `-publicKey` removes it.

use crate::error::TransactionError;
use std::fmt;
use tally_types::PublicKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteToken {
    Cast(PublicKey),
    Uncast(PublicKey),
}

impl VoteToken {
    /// Parse a raw vote token. The sign prefix strictly selects the branch.
    pub fn parse(raw: &str) -> Result<Self, TransactionError> {
        let invalid = || TransactionError::InvalidVote(raw.to_string());
        let (sign, key) = raw.split_at_checked(1).ok_or_else(invalid)?;
        let key = PublicKey::from_hex(key).map_err(|_| invalid())?;
        match sign {
            "+" => Ok(Self::Cast(key)),
            "-" => Ok(Self::Uncast(key)),
            _ => Err(invalid()),
        }
    }

    /// The delegate this token refers to.
    pub fn delegate(&self) -> &PublicKey {
        match self {
            Self::Cast(key) | Self::Uncast(key) => key,
        }
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, Self::Cast(_))
    }
}

impl fmt::Display for VoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cast(key) => write!(f, "+{key}"),
            Self::Uncast(key) => write!(f, "-{key}"),
        }
    }
}
