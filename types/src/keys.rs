//! Public key identity of a wallet.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A public key in canonical lowercase hex.
///
/// Ordering is plain byte order of the hex text, which for lowercase hex equals the
/// byte order of the decoded key. Delegate tie-breaks depend on this being identical
/// on every node, so it never goes through a locale-aware comparison.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(String);

impl PublicKey {
    /// Parse a hex encoded public key. Upper-case input is normalised.
    pub fn from_hex(raw: &str) -> Result<Self, TypesError> {
        let normalised = raw.trim().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(TypesError::InvalidPublicKey("empty".into()));
        }
        hex::decode(&normalised).map_err(|e| TypesError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded key bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Validated on construction.
        hex::decode(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for PublicKey {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
