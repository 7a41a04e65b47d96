//! Replay input: an optional wallet snapshot followed by the blocks to apply.

use anyhow::ensure;
use serde::Deserialize;
use std::path::Path;
use tally_crypto::{derive_address, validate_address};
use tally_ledger::Wallet;
use tally_transactions::Block;

#[derive(Debug, Default, Deserialize)]
pub struct ReplayInput {
    /// Wallets loaded before the first block; vote balances are rebuilt from them.
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ReplayInput {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Parse the input and check every address it carries. Snapshot wallets with a
    /// public key must sit at the address derived from it.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let mut input: Self = serde_json::from_str(s)?;
        input.check_addresses()?;
        input.blocks.sort_by_key(|b| b.data.height);
        Ok(input)
    }

    fn check_addresses(&self) -> anyhow::Result<()> {
        for wallet in &self.wallets {
            ensure!(
                validate_address(wallet.address.as_str()),
                "snapshot wallet has invalid address {}",
                wallet.address
            );
            if let Some(public_key) = &wallet.public_key {
                ensure!(
                    derive_address(public_key) == wallet.address,
                    "snapshot wallet {} does not belong to public key {public_key}",
                    wallet.address
                );
            }
        }
        for block in &self.blocks {
            for tx in &block.transactions {
                if let Some(recipient) = &tx.recipient_id {
                    ensure!(
                        validate_address(recipient.as_str()),
                        "transaction {} in block {} has invalid recipient {recipient}",
                        tx.id,
                        block.data.id
                    );
                }
            }
        }
        Ok(())
    }
}
