//! The per-address wallet record.

use crate::stake::{StakeKey, StakeObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_crypto::derive_address;
use tally_transactions::{Asset, BusinessAsset, MultiSignatureAsset, Transaction, VoteToken};
use tally_types::{Address, Amount, BlockData, BlockId, Nonce, PublicKey};

/// Block production statistics of a generator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgingStats {
    pub produced_blocks: u64,
    pub forged_fees: Amount,
    pub forged_rewards: Amount,
    pub last_block: Option<BlockId>,
}

/// Optional registrations attached to a wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAttributes {
    pub second_public_key: Option<PublicKey>,
    pub multi_signature: Option<MultiSignatureAsset>,
    pub business: Option<BusinessAsset>,
    pub forging: ForgingStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: Address,
    pub public_key: Option<PublicKey>,
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub nonce: Nonce,
    /// Public key of the delegate this wallet votes for.
    pub vote: Option<PublicKey>,
    /// Set iff the wallet is a registered delegate.
    pub username: Option<String>,
    #[serde(default)]
    pub vote_balance: Amount,
    /// 1-based position in the last delegate ranking.
    pub rate: Option<u32>,
    #[serde(default)]
    pub resigned: bool,
    #[serde(default)]
    pub stakes: BTreeMap<StakeKey, StakeObject>,
    #[serde(default)]
    pub stake_power: Amount,
    #[serde(default)]
    pub stake_weight: Amount,
    #[serde(default)]
    pub attributes: WalletAttributes,
}

impl Wallet {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            public_key: None,
            balance: Amount::zero(),
            nonce: Nonce::zero(),
            vote: None,
            username: None,
            vote_balance: Amount::zero(),
            rate: None,
            resigned: false,
            stakes: BTreeMap::new(),
            stake_power: Amount::zero(),
            stake_weight: Amount::zero(),
            attributes: WalletAttributes::default(),
        }
    }

    /// A fresh wallet owning `public_key` at its derived address.
    pub fn from_public_key(public_key: PublicKey) -> Self {
        let mut wallet = Self::new(derive_address(&public_key));
        wallet.public_key = Some(public_key);
        wallet
    }

    pub fn is_delegate(&self) -> bool {
        self.username.is_some()
    }

    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }

    pub fn has_second_signature(&self) -> bool {
        self.attributes.second_public_key.is_some()
    }

    pub fn has_multi_signature(&self) -> bool {
        self.attributes.multi_signature.is_some()
    }

    /// Wallets with nothing worth keeping: no balance, no registrations, no stakes.
    pub fn can_be_purged(&self) -> bool {
        self.balance.is_zero()
            && !self.has_second_signature()
            && !self.has_multi_signature()
            && !self.is_delegate()
            && self.stakes.is_empty()
    }

    fn is_generator_of(&self, block: &BlockData) -> bool {
        self.public_key.as_ref() == Some(&block.generator_public_key)
            || self.address == derive_address(&block.generator_public_key)
    }

    /// Credit the block reward and fees if this wallet generated `block`.
    ///
    /// Returns whether the block belonged to this wallet.
    pub fn apply_block(&mut self, block: &BlockData) -> bool {
        if !self.is_generator_of(block) {
            return false;
        }
        self.balance += &block.total_reward();
        let forging = &mut self.attributes.forging;
        forging.produced_blocks += 1;
        forging.forged_fees += &block.total_fee;
        forging.forged_rewards += &block.reward;
        forging.last_block = Some(block.id.clone());
        true
    }

    /// Undo [`Wallet::apply_block`].
    ///
    /// The previous last block is not recoverable from the wallet alone, so it is
    /// cleared.
    pub fn revert_block(&mut self, block: &BlockData) -> bool {
        if !self.is_generator_of(block) {
            return false;
        }
        self.balance -= &block.total_reward();
        let forging = &mut self.attributes.forging;
        forging.produced_blocks = forging.produced_blocks.saturating_sub(1);
        forging.forged_fees -= &block.total_fee;
        forging.forged_rewards -= &block.reward;
        forging.last_block = None;
        true
    }

    /// Itemised pre-apply checks for a transaction, for diagnostics when a
    /// transaction is rejected.
    pub fn audit_apply(&self, tx: &Transaction) -> Vec<AuditEntry> {
        let mut audit = vec![
            AuditEntry::new(
                "nonce",
                format!("wallet {}, transaction {}", self.nonce, tx.nonce),
                tx.nonce == self.nonce.next(),
            ),
            AuditEntry::new(
                "balance",
                format!("{} available, {} required", self.balance, debit(tx)),
                self.balance >= debit(tx),
            ),
        ];

        if let Some(second) = &self.attributes.second_public_key {
            audit.push(AuditEntry::new("second signature", second.to_string(), true));
        }

        match &tx.asset {
            Asset::DelegateRegistration { username } => audit.push(AuditEntry::new(
                "delegate registration",
                username.clone(),
                !self.is_delegate(),
            )),
            Asset::DelegateResignation => audit.push(AuditEntry::new(
                "delegate resignation",
                self.username.clone().unwrap_or_default(),
                self.is_delegate() && !self.resigned,
            )),
            Asset::Vote { .. } => {
                let (detail, passed) = match tx.vote() {
                    Ok(Some(VoteToken::Cast(pk))) => (format!("+{pk}"), self.vote.is_none()),
                    Ok(Some(VoteToken::Uncast(pk))) => {
                        let passed = self.vote.as_ref() == Some(&pk);
                        (format!("-{pk}"), passed)
                    }
                    Ok(None) => (String::new(), false),
                    Err(e) => (e.to_string(), false),
                };
                audit.push(AuditEntry::new("vote", detail, passed));
            }
            Asset::SecondSignature { .. } => audit.push(AuditEntry::new(
                "second signature registration",
                String::new(),
                !self.has_second_signature(),
            )),
            Asset::MultiSignature(_) => audit.push(AuditEntry::new(
                "multi-signature registration",
                String::new(),
                !self.has_multi_signature(),
            )),
            Asset::BusinessRegistration(asset) => audit.push(AuditEntry::new(
                "business registration",
                asset.name.clone(),
                self.attributes.business.is_none(),
            )),
            Asset::StakeCreate(asset) => audit.push(AuditEntry::new(
                "stake",
                format!("{} for {}s", asset.amount, asset.duration),
                !self.stakes.contains_key(&tx.id),
            )),
            Asset::Transfer => {}
        }

        audit
    }

    /// Flattened view used when reporting a wallet.
    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            address: self.address.clone(),
            public_key: self.public_key.clone(),
            nonce: self.nonce.clone(),
            balance: self.balance.clone(),
            is_delegate: self.is_delegate(),
            is_resigned: self.resigned,
            username: self.username.clone(),
            vote: self.vote.clone(),
            vote_balance: self.vote_balance.clone(),
            rate: self.rate,
            stake_power: self.stake_power.clone(),
            power: &self.stake_power + &self.balance,
            stakes: self.stakes.len(),
        }
    }
}

fn debit(tx: &Transaction) -> Amount {
    match tx.stake_create() {
        Some(stake) => &tx.fee + &stake.amount,
        None => tx.total_debit(),
    }
}

/// One line of [`Wallet::audit_apply`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub check: &'static str,
    pub detail: String,
    pub passed: bool,
}

impl AuditEntry {
    fn new(check: &'static str, detail: String, passed: bool) -> Self {
        Self {
            check,
            detail,
            passed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub address: Address,
    pub public_key: Option<PublicKey>,
    pub nonce: Nonce,
    pub balance: Amount,
    pub is_delegate: bool,
    pub is_resigned: bool,
    pub username: Option<String>,
    pub vote: Option<PublicKey>,
    pub vote_balance: Amount,
    pub rate: Option<u32>,
    pub stake_power: Amount,
    /// Stake power plus liquid balance.
    pub power: Amount,
    pub stakes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_transactions::TransactionId;
    use tally_types::Timestamp;

    fn key(hex: &str) -> PublicKey {
        PublicKey::from_hex(hex).unwrap()
    }

    fn block(generator: &PublicKey) -> BlockData {
        BlockData {
            id: BlockId::new("b2"),
            height: 2,
            timestamp: Timestamp::new(10),
            generator_public_key: generator.clone(),
            reward: Amount::from(200),
            total_fee: Amount::from(30),
        }
    }

    #[test]
    fn from_public_key_uses_derived_address() {
        let wallet = Wallet::from_public_key(key("aa"));
        assert_eq!(wallet.address, derive_address(&key("aa")));
        assert_eq!(wallet.public_key, Some(key("aa")));
    }

    #[test]
    fn apply_and_revert_block_are_inverse() {
        let mut wallet = Wallet::from_public_key(key("aa"));
        let before = wallet.clone();
        assert!(wallet.apply_block(&block(&key("aa"))));
        assert_eq!(wallet.balance, Amount::from(230));
        assert_eq!(wallet.attributes.forging.produced_blocks, 1);
        assert_eq!(wallet.attributes.forging.last_block, Some(BlockId::new("b2")));
        assert!(wallet.revert_block(&block(&key("aa"))));
        assert_eq!(wallet, before);
    }

    #[test]
    fn foreign_block_is_ignored() {
        let mut wallet = Wallet::from_public_key(key("aa"));
        assert!(!wallet.apply_block(&block(&key("bb"))));
        assert!(wallet.balance.is_zero());
    }

    #[test]
    fn generator_matched_by_address_alone() {
        let mut wallet = Wallet::new(derive_address(&key("cc")));
        assert!(wallet.apply_block(&block(&key("cc"))));
    }

    #[test]
    fn purge_eligibility() {
        let mut wallet = Wallet::new(Address::from("tly_x"));
        assert!(wallet.can_be_purged());
        wallet.username = Some("d".into());
        assert!(!wallet.can_be_purged());
        wallet.username = None;
        wallet.balance = Amount::from(1);
        assert!(!wallet.can_be_purged());
        wallet.balance = Amount::zero();
        wallet.attributes.second_public_key = Some(key("bb"));
        assert!(!wallet.can_be_purged());
    }

    #[test]
    fn audit_flags_bad_nonce_and_balance() {
        let wallet = Wallet::from_public_key(key("aa"));
        let tx = Transaction {
            id: TransactionId::new("t"),
            sender_public_key: key("aa"),
            recipient_id: Some(Address::from("tly_r")),
            amount: Amount::from(5),
            fee: Amount::from(1),
            nonce: Nonce::from(3),
            timestamp: Timestamp::EPOCH,
            asset: Asset::Transfer,
        };
        let audit = wallet.audit_apply(&tx);
        assert_eq!(audit.len(), 2);
        assert!(audit.iter().all(|entry| !entry.passed));
    }

    #[test]
    fn summary_power_includes_balance() {
        let mut wallet = Wallet::from_public_key(key("aa"));
        wallet.balance = Amount::from(70);
        wallet.stake_power = Amount::from(30);
        assert_eq!(wallet.summary().power, Amount::from(100));
    }
}
