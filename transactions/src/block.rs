//! A decoded block: header plus its ordered transactions.

use crate::Transaction;
use serde::{Deserialize, Serialize};
use tally_types::BlockData;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub data: BlockData,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(data: BlockData, transactions: Vec<Transaction>) -> Self {
        Self { data, transactions }
    }
}
