//! Deterministic delegate ranking.
//!
//! Delegates are ordered by vote balance (descending), ties broken by public key
//! (ascending, byte order). Every node must produce the identical order, so the
//! comparison never depends on map iteration order or locale.

use crate::error::LedgerError;
use crate::index::{WalletId, WalletIndex};
use serde::Serialize;
use tally_types::{Address, Amount, PublicKey, RoundInfo};
use tally_utils::{format_amount, DEFAULT_DECIMALS};
use tracing::warn;

/// A delegate's position in the ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateSnapshot {
    pub rank: u32,
    /// Round the ranking was built for, 0 when built without one.
    pub round: u64,
    pub username: String,
    pub public_key: PublicKey,
    pub address: Address,
    pub vote_balance: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollidingDelegate {
    pub username: String,
    pub public_key: PublicKey,
}

/// Delegates sharing one vote balance, in tie-break order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCollision {
    pub vote_balance: Amount,
    pub delegates: Vec<CollidingDelegate>,
    /// Rank of the first delegate in the group.
    pub first_rank: u32,
}

impl VoteCollision {
    fn last_rank(&self) -> u32 {
        self.first_rank + self.delegates.len() as u32 - 1
    }

    /// Whether any member made the active set of `max_delegates`.
    pub fn touches_active_set(&self, max_delegates: usize) -> bool {
        self.first_rank as usize <= max_delegates
    }

    /// Whether the tie-break decided who made the active set.
    pub fn crosses_boundary(&self, max_delegates: usize) -> bool {
        self.touches_active_set(max_delegates) && self.last_rank() as usize > max_delegates
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRanking {
    pub delegates: Vec<DelegateSnapshot>,
    pub collisions: Vec<VoteCollision>,
}

struct Candidate {
    id: WalletId,
    username: String,
    public_key: PublicKey,
    vote_balance: Amount,
}

/// Rank every non-resigned delegate and write each one's 1-based rank back to its
/// wallet.
///
/// With a `round`, the result is truncated to the round's delegate count and vote
/// collisions reaching the active set are logged; fewer delegates than the round
/// needs is fatal.
pub fn build_delegate_ranking(
    index: &mut WalletIndex,
    round: Option<&RoundInfo>,
) -> Result<DelegateRanking, LedgerError> {
    let mut candidates = Vec::new();
    for (id, wallet) in index.all_by_username() {
        if wallet.resigned {
            continue;
        }
        let username = wallet.username.clone().unwrap_or_default();
        let public_key = wallet
            .public_key
            .clone()
            .ok_or_else(|| LedgerError::MissingDelegatePublicKey {
                username: username.clone(),
            })?;
        candidates.push(Candidate {
            id,
            username,
            public_key,
            vote_balance: wallet.vote_balance.clone(),
        });
    }

    candidates.sort_by(|a, b| {
        b.vote_balance
            .cmp(&a.vote_balance)
            .then_with(|| a.public_key.cmp(&b.public_key))
    });

    let mut collisions = Vec::new();
    let mut start = 0;
    for group in candidates.chunk_by(|a, b| a.vote_balance == b.vote_balance) {
        if group.len() > 1 {
            if let Some(pair) = group.windows(2).find(|w| w[0].public_key == w[1].public_key) {
                return Err(LedgerError::DuplicateDelegate {
                    username: pair[1].username.clone(),
                    public_key: pair[1].public_key.clone(),
                });
            }
            collisions.push(VoteCollision {
                vote_balance: group[0].vote_balance.clone(),
                delegates: group
                    .iter()
                    .map(|c| CollidingDelegate {
                        username: c.username.clone(),
                        public_key: c.public_key.clone(),
                    })
                    .collect(),
                first_rank: start as u32 + 1,
            });
        }
        start += group.len();
    }

    for (i, candidate) in candidates.iter().enumerate() {
        index[candidate.id].rate = Some(i as u32 + 1);
    }

    let mut delegates: Vec<DelegateSnapshot> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| DelegateSnapshot {
            rank: i as u32 + 1,
            round: round.map_or(0, |r| r.round),
            address: index[c.id].address.clone(),
            username: c.username,
            public_key: c.public_key,
            vote_balance: c.vote_balance,
        })
        .collect();

    if let Some(round) = round {
        if delegates.len() < round.max_delegates {
            return Err(LedgerError::InsufficientDelegates {
                expected: round.max_delegates,
                found: delegates.len(),
            });
        }
        delegates.truncate(round.max_delegates);

        for collision in collisions
            .iter()
            .filter(|c| c.touches_active_set(round.max_delegates))
        {
            let names: Vec<_> = collision
                .delegates
                .iter()
                .map(|d| d.username.as_str())
                .collect();
            warn!(
                round = round.round,
                vote_balance = %format_amount(&collision.vote_balance, DEFAULT_DECIMALS),
                delegates = %names.join(", "),
                crosses_boundary = collision.crosses_boundary(round.max_delegates),
                "delegates share a vote balance; ordered by public key"
            );
        }
    }

    Ok(DelegateRanking {
        delegates,
        collisions,
    })
}
