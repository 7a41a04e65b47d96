//! Builders shared by the ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use tally_ledger::{LedgerConfig, WalletId, WalletManager};
use tally_nullables::NullClock;
use tally_transactions::{Asset, Block, StakeCreateAsset, Transaction, TransactionId};
use tally_types::{Address, Amount, BlockData, BlockId, Nonce, PublicKey, Timestamp};

pub fn key(hex: &str) -> PublicKey {
    PublicKey::from_hex(hex).expect("valid hex key")
}

pub fn manager() -> (WalletManager, Arc<NullClock>) {
    manager_with(LedgerConfig::default())
}

pub fn manager_with(config: LedgerConfig) -> (WalletManager, Arc<NullClock>) {
    let clock = Arc::new(NullClock::new(0));
    (WalletManager::new(&config, clock.clone()), clock)
}

pub fn block(id: &str, height: u64, generator: &str, txs: Vec<Transaction>) -> Block {
    let total_fee = txs.iter().fold(Amount::zero(), |sum, tx| sum + tx.fee.clone());
    Block::new(
        BlockData {
            id: BlockId::new(id),
            height,
            timestamp: Timestamp::new(height * 8),
            generator_public_key: key(generator),
            reward: Amount::zero(),
            total_fee,
        },
        txs,
    )
}

pub fn tx(sender: &str, nonce: u64, fee: i64, asset: Asset) -> Transaction {
    Transaction {
        id: TransactionId::new(format!("{sender}:{nonce}")),
        sender_public_key: key(sender),
        recipient_id: None,
        amount: Amount::zero(),
        fee: Amount::from(fee),
        nonce: Nonce::from(nonce),
        timestamp: Timestamp::EPOCH,
        asset,
    }
}

pub fn transfer(sender: &str, nonce: u64, to: &Address, amount: i64, fee: i64) -> Transaction {
    Transaction {
        recipient_id: Some(to.clone()),
        amount: Amount::from(amount),
        ..tx(sender, nonce, fee, Asset::Transfer)
    }
}

pub fn vote(sender: &str, nonce: u64, token: &str) -> Transaction {
    tx(
        sender,
        nonce,
        10,
        Asset::Vote {
            votes: vec![token.to_string()],
        },
    )
}

pub fn stake(sender: &str, nonce: u64, amount: i64, duration: u64, start: u64) -> Transaction {
    tx(
        sender,
        nonce,
        10,
        Asset::StakeCreate(StakeCreateAsset {
            duration,
            amount: Amount::from(amount),
            timestamp: Timestamp::new(start),
        }),
    )
}

/// A wallet indexed by public key with the given balance.
pub fn seed(manager: &mut WalletManager, hex: &str, balance: i64) -> WalletId {
    let id = manager.find_by_public_key(&key(hex));
    manager.index_mut()[id].balance = Amount::from(balance);
    id
}

pub fn seed_delegate(manager: &mut WalletManager, hex: &str, username: &str) -> WalletId {
    let id = manager.find_by_public_key(&key(hex));
    let index = manager.index_mut();
    index[id].username = Some(username.to_string());
    index.reindex(id);
    id
}

pub fn balance(manager: &WalletManager, id: WalletId) -> Amount {
    manager.index()[id].balance.clone()
}

pub fn vote_balance(manager: &WalletManager, id: WalletId) -> Amount {
    manager.index()[id].vote_balance.clone()
}

/// Every wallet in the index, ordered by address, for whole-state comparisons.
pub fn snapshot(manager: &WalletManager) -> Vec<tally_ledger::Wallet> {
    let mut wallets: Vec<_> = manager.index().wallets().map(|(_, w)| w.clone()).collect();
    wallets.sort_by(|a, b| a.address.cmp(&b.address));
    wallets
}
