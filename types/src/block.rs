//! Block header data consumed by the state engine.

use crate::amount::Amount;
use crate::keys::PublicKey;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of the genesis block.
pub const GENESIS_HEIGHT: u64 = 1;

/// Block identifier as produced by the block serializer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The already-decoded header of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: Timestamp,
    pub generator_public_key: PublicKey,
    pub reward: Amount,
    pub total_fee: Amount,
}

impl BlockData {
    pub fn is_genesis(&self) -> bool {
        self.height == GENESIS_HEIGHT
    }

    /// Reward plus fees credited to the generator.
    pub fn total_reward(&self) -> Amount {
        &self.reward + &self.total_fee
    }
}
