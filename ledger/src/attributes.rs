//! Dotted-path access to wallet attributes.
//!
//! Wallet fields are typed, but external tooling addresses them by the dotted names
//! the network has always used (`delegate.voteBalance`, `business.name`, ...). Each
//! known path maps to exactly one field; unknown paths fail to parse.

use crate::error::LedgerError;
use crate::stake::{StakeKey, StakeObject};
use crate::wallet::Wallet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tally_transactions::{BusinessAsset, MultiSignatureAsset};
use tally_types::{Amount, BlockId, PublicKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Vote,
    SecondPublicKey,
    MultiSignature,
    Stakes,
    StakePower,
    StakeWeight,
    DelegateUsername,
    DelegateVoteBalance,
    DelegateRank,
    DelegateResigned,
    DelegateProducedBlocks,
    DelegateForgedFees,
    DelegateForgedRewards,
    DelegateLastBlock,
    BusinessName,
    BusinessWebsite,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 16] = [
        Self::Vote,
        Self::SecondPublicKey,
        Self::MultiSignature,
        Self::Stakes,
        Self::StakePower,
        Self::StakeWeight,
        Self::DelegateUsername,
        Self::DelegateVoteBalance,
        Self::DelegateRank,
        Self::DelegateResigned,
        Self::DelegateProducedBlocks,
        Self::DelegateForgedFees,
        Self::DelegateForgedRewards,
        Self::DelegateLastBlock,
        Self::BusinessName,
        Self::BusinessWebsite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::SecondPublicKey => "secondPublicKey",
            Self::MultiSignature => "multiSignature",
            Self::Stakes => "stakes",
            Self::StakePower => "stakePower",
            Self::StakeWeight => "stakeWeight",
            Self::DelegateUsername => "delegate.username",
            Self::DelegateVoteBalance => "delegate.voteBalance",
            Self::DelegateRank => "delegate.rank",
            Self::DelegateResigned => "delegate.resigned",
            Self::DelegateProducedBlocks => "delegate.producedBlocks",
            Self::DelegateForgedFees => "delegate.forgedFees",
            Self::DelegateForgedRewards => "delegate.forgedRewards",
            Self::DelegateLastBlock => "delegate.lastBlock",
            Self::BusinessName => "business.name",
            Self::BusinessWebsite => "business.website",
        }
    }
}

impl FromStr for AttributeKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| LedgerError::Attribute {
                key: s.to_string(),
                reason: "unknown attribute".into(),
            })
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Count(u64),
    Amount(Amount),
    Text(String),
    PublicKey(PublicKey),
    Block(BlockId),
    MultiSignature(MultiSignatureAsset),
    Stakes(BTreeMap<StakeKey, StakeObject>),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Count(_) => "count",
            Self::Amount(_) => "amount",
            Self::Text(_) => "text",
            Self::PublicKey(_) => "public key",
            Self::Block(_) => "block id",
            Self::MultiSignature(_) => "multi-signature",
            Self::Stakes(_) => "stakes",
        }
    }
}

fn mismatch(key: AttributeKey, value: &AttributeValue) -> LedgerError {
    LedgerError::Attribute {
        key: key.to_string(),
        reason: format!("cannot store a {} value", value.kind()),
    }
}

impl Wallet {
    /// Current value at `key`, or `None` when the attribute is absent.
    ///
    /// Counters and amounts are absent while they hold their zero value.
    pub fn get_attribute(&self, key: AttributeKey) -> Option<AttributeValue> {
        let forging = &self.attributes.forging;
        let amount = |a: &Amount| (!a.is_zero()).then(|| AttributeValue::Amount(a.clone()));
        match key {
            AttributeKey::Vote => self.vote.clone().map(AttributeValue::PublicKey),
            AttributeKey::SecondPublicKey => self
                .attributes
                .second_public_key
                .clone()
                .map(AttributeValue::PublicKey),
            AttributeKey::MultiSignature => self
                .attributes
                .multi_signature
                .clone()
                .map(AttributeValue::MultiSignature),
            AttributeKey::Stakes => {
                (!self.stakes.is_empty()).then(|| AttributeValue::Stakes(self.stakes.clone()))
            }
            AttributeKey::StakePower => amount(&self.stake_power),
            AttributeKey::StakeWeight => amount(&self.stake_weight),
            AttributeKey::DelegateUsername => self.username.clone().map(AttributeValue::Text),
            AttributeKey::DelegateVoteBalance => amount(&self.vote_balance),
            AttributeKey::DelegateRank => self.rate.map(|r| AttributeValue::Count(r.into())),
            AttributeKey::DelegateResigned => self.resigned.then_some(AttributeValue::Bool(true)),
            AttributeKey::DelegateProducedBlocks => (forging.produced_blocks > 0)
                .then_some(AttributeValue::Count(forging.produced_blocks)),
            AttributeKey::DelegateForgedFees => amount(&forging.forged_fees),
            AttributeKey::DelegateForgedRewards => amount(&forging.forged_rewards),
            AttributeKey::DelegateLastBlock => {
                forging.last_block.clone().map(AttributeValue::Block)
            }
            AttributeKey::BusinessName => self
                .attributes
                .business
                .as_ref()
                .map(|b| AttributeValue::Text(b.name.clone())),
            AttributeKey::BusinessWebsite => self
                .attributes
                .business
                .as_ref()
                .and_then(|b| b.website.clone())
                .map(AttributeValue::Text),
        }
    }

    /// Like [`Wallet::get_attribute`] but falling back to `default` when absent.
    pub fn get_attribute_or(&self, key: AttributeKey, default: AttributeValue) -> AttributeValue {
        self.get_attribute(key).unwrap_or(default)
    }

    pub fn has_attribute(&self, key: AttributeKey) -> bool {
        self.get_attribute(key).is_some()
    }

    /// Store `value` at `key`.
    ///
    /// Fails when the value kind does not fit the attribute, or when setting a
    /// business website on a wallet without a business.
    pub fn set_attribute(
        &mut self,
        key: AttributeKey,
        value: AttributeValue,
    ) -> Result<(), LedgerError> {
        let forging = &mut self.attributes.forging;
        match (key, value) {
            (AttributeKey::Vote, AttributeValue::PublicKey(pk)) => self.vote = Some(pk),
            (AttributeKey::SecondPublicKey, AttributeValue::PublicKey(pk)) => {
                self.attributes.second_public_key = Some(pk)
            }
            (AttributeKey::MultiSignature, AttributeValue::MultiSignature(asset)) => {
                self.attributes.multi_signature = Some(asset)
            }
            (AttributeKey::Stakes, AttributeValue::Stakes(stakes)) => self.stakes = stakes,
            (AttributeKey::StakePower, AttributeValue::Amount(a)) => self.stake_power = a,
            (AttributeKey::StakeWeight, AttributeValue::Amount(a)) => self.stake_weight = a,
            (AttributeKey::DelegateUsername, AttributeValue::Text(name)) => {
                self.username = Some(name)
            }
            (AttributeKey::DelegateVoteBalance, AttributeValue::Amount(a)) => {
                self.vote_balance = a
            }
            (AttributeKey::DelegateRank, AttributeValue::Count(rank)) => {
                let rank = u32::try_from(rank).map_err(|_| LedgerError::Attribute {
                    key: key.to_string(),
                    reason: format!("rank {rank} out of range"),
                })?;
                self.rate = Some(rank);
            }
            (AttributeKey::DelegateResigned, AttributeValue::Bool(b)) => self.resigned = b,
            (AttributeKey::DelegateProducedBlocks, AttributeValue::Count(n)) => {
                forging.produced_blocks = n
            }
            (AttributeKey::DelegateForgedFees, AttributeValue::Amount(a)) => forging.forged_fees = a,
            (AttributeKey::DelegateForgedRewards, AttributeValue::Amount(a)) => {
                forging.forged_rewards = a
            }
            (AttributeKey::DelegateLastBlock, AttributeValue::Block(id)) => {
                forging.last_block = Some(id)
            }
            (AttributeKey::BusinessName, AttributeValue::Text(name)) => {
                match &mut self.attributes.business {
                    Some(business) => business.name = name,
                    None => {
                        self.attributes.business = Some(BusinessAsset {
                            name,
                            website: None,
                        })
                    }
                }
            }
            (AttributeKey::BusinessWebsite, AttributeValue::Text(site)) => {
                let business =
                    self.attributes
                        .business
                        .as_mut()
                        .ok_or_else(|| LedgerError::Attribute {
                            key: key.to_string(),
                            reason: "wallet has no business".into(),
                        })?;
                business.website = Some(site);
            }
            (key, value) => return Err(mismatch(key, &value)),
        }
        Ok(())
    }

    /// Reset `key` to its absent state.
    pub fn forget_attribute(&mut self, key: AttributeKey) {
        let forging = &mut self.attributes.forging;
        match key {
            AttributeKey::Vote => self.vote = None,
            AttributeKey::SecondPublicKey => self.attributes.second_public_key = None,
            AttributeKey::MultiSignature => self.attributes.multi_signature = None,
            AttributeKey::Stakes => self.stakes.clear(),
            AttributeKey::StakePower => self.stake_power = Amount::zero(),
            AttributeKey::StakeWeight => self.stake_weight = Amount::zero(),
            AttributeKey::DelegateUsername => self.username = None,
            AttributeKey::DelegateVoteBalance => self.vote_balance = Amount::zero(),
            AttributeKey::DelegateRank => self.rate = None,
            AttributeKey::DelegateResigned => self.resigned = false,
            AttributeKey::DelegateProducedBlocks => forging.produced_blocks = 0,
            AttributeKey::DelegateForgedFees => forging.forged_fees = Amount::zero(),
            AttributeKey::DelegateForgedRewards => forging.forged_rewards = Amount::zero(),
            AttributeKey::DelegateLastBlock => forging.last_block = None,
            AttributeKey::BusinessName => self.attributes.business = None,
            AttributeKey::BusinessWebsite => {
                if let Some(business) = &mut self.attributes.business {
                    business.website = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::Address;

    fn wallet() -> Wallet {
        Wallet::new(Address::from("tly_w"))
    }

    #[test]
    fn every_key_parses_back() {
        for key in AttributeKey::ALL {
            assert_eq!(key.as_str().parse::<AttributeKey>().unwrap(), key);
        }
        assert!("delegate.bogus".parse::<AttributeKey>().is_err());
    }

    #[test]
    fn absent_until_set() {
        let mut w = wallet();
        assert!(!w.has_attribute(AttributeKey::DelegateVoteBalance));
        w.set_attribute(
            AttributeKey::DelegateVoteBalance,
            AttributeValue::Amount(Amount::from(40)),
        )
        .unwrap();
        assert_eq!(w.vote_balance, Amount::from(40));
        assert_eq!(
            w.get_attribute(AttributeKey::DelegateVoteBalance),
            Some(AttributeValue::Amount(Amount::from(40)))
        );
        w.forget_attribute(AttributeKey::DelegateVoteBalance);
        assert!(!w.has_attribute(AttributeKey::DelegateVoteBalance));
    }

    #[test]
    fn get_or_default() {
        let w = wallet();
        assert_eq!(
            w.get_attribute_or(AttributeKey::StakePower, AttributeValue::Amount(Amount::zero())),
            AttributeValue::Amount(Amount::zero())
        );
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut w = wallet();
        let err = w
            .set_attribute(AttributeKey::Vote, AttributeValue::Bool(true))
            .unwrap_err();
        assert!(err.to_string().contains("vote"));
    }

    #[test]
    fn business_paths() {
        let mut w = wallet();
        assert!(w
            .set_attribute(AttributeKey::BusinessWebsite, AttributeValue::Text("x.io".into()))
            .is_err());
        w.set_attribute(AttributeKey::BusinessName, AttributeValue::Text("acme".into()))
            .unwrap();
        w.set_attribute(AttributeKey::BusinessWebsite, AttributeValue::Text("x.io".into()))
            .unwrap();
        assert_eq!(
            w.get_attribute(AttributeKey::BusinessWebsite),
            Some(AttributeValue::Text("x.io".into()))
        );
        w.forget_attribute(AttributeKey::BusinessName);
        assert!(w.attributes.business.is_none());
    }

    #[test]
    fn values_serialize_untagged() {
        let value = AttributeValue::Amount(Amount::from(12));
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"12\"");
    }
}
