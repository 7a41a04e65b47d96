//! Wallet address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet address, the primary key of the ledger.
///
/// Addresses for known public keys are derived by `tally_crypto::derive_address`;
/// recipients may also be referenced by an address whose key has never been seen.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The prefix carried by every derived address.
    pub const PREFIX: &'static str = "tly_";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
