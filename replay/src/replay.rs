//! Drives a wallet manager through a replay input and collects the report.

use crate::input::ReplayInput;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use tally_ledger::{
    AttributeKey, AttributeValue, DelegateRanking, StakeKey, WalletManager, WalletSummary,
};
use tally_types::{RoundInfo, Timestamp};
use tracing::info;

#[derive(Debug, Default)]
pub struct ReplayOptions {
    /// Drop empty non-delegate wallets once every block is applied.
    pub purge: bool,
    /// Power up every stake scheduled at or before this time.
    pub power_ups_until: Option<Timestamp>,
    /// Load the active delegate list for this round instead of a full ranking.
    pub round: Option<RoundInfo>,
    pub attributes: Vec<AttributeKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub height: u64,
    pub blocks: usize,
    pub purged: usize,
    pub powered_up: Vec<StakeKey>,
    pub ranking: DelegateRanking,
    pub wallets: Vec<WalletSummary>,
    /// Requested attributes by wallet address; absent attributes are omitted.
    pub attributes: BTreeMap<String, BTreeMap<String, AttributeValue>>,
}

pub fn replay(
    manager: &mut WalletManager,
    input: ReplayInput,
    options: &ReplayOptions,
) -> anyhow::Result<ReplayReport> {
    if !input.wallets.is_empty() {
        let loaded = manager.index_mut().index_wallets(input.wallets).len();
        manager.build_vote_balances();
        info!(wallets = loaded, "loaded wallet snapshot");
    }

    for block in &input.blocks {
        manager.apply_block(block).with_context(|| {
            format!(
                "failed to apply block {} at height {}",
                block.data.id, block.data.height
            )
        })?;
    }
    info!(blocks = input.blocks.len(), height = manager.height(), "replayed blocks");

    let powered_up = match options.power_ups_until {
        Some(until) => manager.process_power_ups(until),
        None => Vec::new(),
    };
    let purged = if options.purge {
        manager.purge_empty_non_delegates()
    } else {
        0
    };

    let ranking = match &options.round {
        Some(round) => manager.load_active_delegate_list(round)?,
        None => manager.build_delegate_ranking(None)?,
    };

    let mut wallets: Vec<WalletSummary> = manager
        .index()
        .wallets()
        .map(|(_, wallet)| wallet.summary())
        .collect();
    wallets.sort_by(|a, b| a.address.cmp(&b.address));

    let mut attributes = BTreeMap::new();
    if !options.attributes.is_empty() {
        for (_, wallet) in manager.index().wallets() {
            let values: BTreeMap<String, AttributeValue> = options
                .attributes
                .iter()
                .filter_map(|key| Some((key.to_string(), wallet.get_attribute(*key)?)))
                .collect();
            if !values.is_empty() {
                attributes.insert(wallet.address.to_string(), values);
            }
        }
    }

    Ok(ReplayReport {
        height: manager.height(),
        blocks: input.blocks.len(),
        purged,
        powered_up,
        ranking,
        wallets,
        attributes,
    })
}
