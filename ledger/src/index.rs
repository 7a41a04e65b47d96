//! Wallet arena with lookup by address, public key and username.
//!
//! Wallets live in a slot arena; the three lookup maps hold [`WalletId`] handles
//! into it, so one wallet is reachable under several keys and a mutation through any
//! handle is visible through all of them. Each slot counts how many map entries point
//! at it and is released when the last one is forgotten.

use crate::wallet::Wallet;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use tally_crypto::derive_address;
use tally_types::{Address, PublicKey};
use tracing::debug;

/// Handle to a wallet slot in a [`WalletIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletId(usize);

#[derive(Clone, Debug)]
struct Slot {
    wallet: Wallet,
    refs: usize,
}

#[derive(Clone, Debug, Default)]
pub struct WalletIndex {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    by_address: HashMap<Address, WalletId>,
    by_public_key: HashMap<PublicKey, WalletId>,
    by_username: HashMap<String, WalletId>,
}

impl WalletIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live wallets.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: WalletId) -> Option<&Wallet> {
        self.slots.get(id.0)?.as_ref().map(|slot| &slot.wallet)
    }

    pub fn get_mut(&mut self, id: WalletId) -> Option<&mut Wallet> {
        self.slots.get_mut(id.0)?.as_mut().map(|slot| &mut slot.wallet)
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    /// The wallet at `address`, created empty if unknown.
    pub fn find_by_address(&mut self, address: &Address) -> WalletId {
        if let Some(&id) = self.by_address.get(address) {
            return id;
        }
        let id = self.allocate(Wallet::new(address.clone()));
        bind(&mut self.by_address, &mut self.slots, &mut self.free, address.clone(), id);
        id
    }

    /// The wallet owning `public_key`.
    ///
    /// Unknown keys resolve through their derived address (creating the wallet if
    /// needed); the wallet learns its public key and is indexed under it.
    pub fn find_by_public_key(&mut self, public_key: &PublicKey) -> WalletId {
        if let Some(&id) = self.by_public_key.get(public_key) {
            return id;
        }
        let id = self.find_by_address(&derive_address(public_key));
        self[id].public_key = Some(public_key.clone());
        bind(
            &mut self.by_public_key,
            &mut self.slots,
            &mut self.free,
            public_key.clone(),
            id,
        );
        id
    }

    pub fn find_by_username(&self, username: &str) -> Option<WalletId> {
        self.by_username.get(username).copied()
    }

    /// Lookup by address without creating a wallet.
    pub fn get_by_address(&self, address: &Address) -> Option<WalletId> {
        self.by_address.get(address).copied()
    }

    /// Lookup by public key without creating a wallet.
    pub fn get_by_public_key(&self, public_key: &PublicKey) -> Option<WalletId> {
        self.by_public_key.get(public_key).copied()
    }

    pub fn has_by_address(&self, address: &Address) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn has_by_public_key(&self, public_key: &PublicKey) -> bool {
        self.by_public_key.contains_key(public_key)
    }

    pub fn has_by_username(&self, username: &str) -> bool {
        self.by_username.contains_key(username)
    }

    /// Whether `key` is a known address or a known public key.
    pub fn has(&self, key: &str) -> bool {
        self.has_by_address(&Address::from(key))
            || PublicKey::from_hex(key).is_ok_and(|pk| self.has_by_public_key(&pk))
    }

    // ── Indexing ─────────────────────────────────────────────────────────

    /// Add a wallet built elsewhere and index it under its current keys.
    pub fn insert(&mut self, wallet: Wallet) -> WalletId {
        let id = self.allocate(wallet);
        self.reindex(id);
        id
    }

    /// Insert every wallet in `wallets`.
    pub fn index_wallets(&mut self, wallets: impl IntoIterator<Item = Wallet>) -> Vec<WalletId> {
        wallets.into_iter().map(|w| self.insert(w)).collect()
    }

    /// Bind the wallet's current address, public key and username to `id`.
    ///
    /// Bindings under stale keys are left alone; forget them before renaming.
    pub fn reindex(&mut self, id: WalletId) {
        let Some(wallet) = self.get(id) else {
            return;
        };
        let address = wallet.address.clone();
        let public_key = wallet.public_key.clone();
        let username = wallet.username.clone();

        bind(&mut self.by_address, &mut self.slots, &mut self.free, address, id);
        if let Some(public_key) = public_key {
            bind(&mut self.by_public_key, &mut self.slots, &mut self.free, public_key, id);
        }
        if let Some(username) = username {
            bind(&mut self.by_username, &mut self.slots, &mut self.free, username, id);
        }
    }

    pub fn forget_by_address(&mut self, address: &Address) {
        unbind(&mut self.by_address, &mut self.slots, &mut self.free, address);
    }

    pub fn forget_by_public_key(&mut self, public_key: &PublicKey) {
        unbind(&mut self.by_public_key, &mut self.slots, &mut self.free, public_key);
    }

    pub fn forget_by_username(&mut self, username: &str) {
        unbind(&mut self.by_username, &mut self.slots, &mut self.free, username);
    }

    // ── Enumeration ──────────────────────────────────────────────────────

    pub fn all_by_address(&self) -> impl Iterator<Item = (WalletId, &Wallet)> {
        self.entries(self.by_address.values())
    }

    pub fn all_by_public_key(&self) -> impl Iterator<Item = (WalletId, &Wallet)> {
        self.entries(self.by_public_key.values())
    }

    pub fn all_by_username(&self) -> impl Iterator<Item = (WalletId, &Wallet)> {
        self.entries(self.by_username.values())
    }

    /// Every live wallet, once each, in slot order.
    pub fn wallets(&self) -> impl Iterator<Item = (WalletId, &Wallet)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (WalletId(i), &s.wallet)))
    }

    fn entries<'a>(
        &'a self,
        ids: impl Iterator<Item = &'a WalletId> + 'a,
    ) -> impl Iterator<Item = (WalletId, &'a Wallet)> + 'a {
        ids.filter_map(|&id| self.get(id).map(|w| (id, w)))
    }

    // ── Maintenance ──────────────────────────────────────────────────────

    /// Drop every wallet that [`Wallet::can_be_purged`] from the address and
    /// public-key maps. Returns how many wallets were purged.
    pub fn purge_empty_non_delegates(&mut self) -> usize {
        let purgeable: Vec<(WalletId, Address, Option<PublicKey>)> = self
            .wallets()
            .filter(|(_, w)| w.can_be_purged())
            .map(|(id, w)| (id, w.address.clone(), w.public_key.clone()))
            .collect();

        for (id, address, public_key) in &purgeable {
            if self.by_address.get(address) == Some(id) {
                self.forget_by_address(address);
            }
            if let Some(public_key) = public_key {
                if self.by_public_key.get(public_key) == Some(id) {
                    self.forget_by_public_key(public_key);
                }
            }
        }

        if !purgeable.is_empty() {
            debug!(purged = purgeable.len(), "purged empty non-delegate wallets");
        }
        purgeable.len()
    }

    /// Remove every wallet and binding.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn allocate(&mut self, wallet: Wallet) -> WalletId {
        let slot = Some(Slot { wallet, refs: 0 });
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = slot;
                WalletId(i)
            }
            None => {
                self.slots.push(slot);
                WalletId(self.slots.len() - 1)
            }
        }
    }
}

/// Point `key` at `id`, adjusting the reference counts of both the new and any
/// displaced slot.
fn bind<K: Eq + std::hash::Hash>(
    map: &mut HashMap<K, WalletId>,
    slots: &mut [Option<Slot>],
    free: &mut Vec<usize>,
    key: K,
    id: WalletId,
) {
    match map.insert(key, id) {
        Some(previous) if previous == id => {}
        previous => {
            if let Some(Some(slot)) = slots.get_mut(id.0) {
                slot.refs += 1;
            }
            if let Some(previous) = previous {
                release(slots, free, previous);
            }
        }
    }
}

fn unbind<K, Q>(
    map: &mut HashMap<K, WalletId>,
    slots: &mut [Option<Slot>],
    free: &mut Vec<usize>,
    key: &Q,
) where
    K: Eq + std::hash::Hash + std::borrow::Borrow<Q>,
    Q: Eq + std::hash::Hash + ?Sized,
{
    if let Some(id) = map.remove(key) {
        release(slots, free, id);
    }
}

fn release(slots: &mut [Option<Slot>], free: &mut Vec<usize>, id: WalletId) {
    let Some(entry) = slots.get_mut(id.0) else {
        return;
    };
    let emptied = match entry {
        Some(slot) => {
            slot.refs = slot.refs.saturating_sub(1);
            slot.refs == 0
        }
        None => false,
    };
    if emptied {
        *entry = None;
        free.push(id.0);
    }
}

impl Index<WalletId> for WalletIndex {
    type Output = Wallet;

    /// Panics on a handle whose wallet has been released.
    fn index(&self, id: WalletId) -> &Wallet {
        match self.get(id) {
            Some(wallet) => wallet,
            None => panic!("stale wallet handle {id:?}"),
        }
    }
}

impl IndexMut<WalletId> for WalletIndex {
    fn index_mut(&mut self, id: WalletId) -> &mut Wallet {
        match self.get_mut(id) {
            Some(wallet) => wallet,
            None => panic!("stale wallet handle {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::Amount;

    fn key(hex: &str) -> PublicKey {
        PublicKey::from_hex(hex).unwrap()
    }

    #[test]
    fn find_by_address_creates_once() {
        let mut index = WalletIndex::new();
        let a = index.find_by_address(&Address::from("tly_a"));
        let b = index.find_by_address(&Address::from("tly_a"));
        assert_eq!(a, b);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn public_key_and_address_share_one_wallet() {
        let mut index = WalletIndex::new();
        let by_address = index.find_by_address(&derive_address(&key("aa")));
        index[by_address].balance = Amount::from(50);

        let by_key = index.find_by_public_key(&key("aa"));
        assert_eq!(by_key, by_address);
        assert_eq!(index[by_key].balance, Amount::from(50));
        assert_eq!(index[by_key].public_key, Some(key("aa")));
        assert!(index.has(key("aa").as_str()));
        assert!(index.has(derive_address(&key("aa")).as_str()));
    }

    #[test]
    fn reindex_registers_username() {
        let mut index = WalletIndex::new();
        let id = index.find_by_public_key(&key("aa"));
        index[id].username = Some("alice".into());
        assert!(!index.has_by_username("alice"));
        index.reindex(id);
        assert_eq!(index.find_by_username("alice"), Some(id));
        assert_eq!(index.all_by_username().count(), 1);
    }

    #[test]
    fn slot_released_after_last_binding_forgotten() {
        let mut index = WalletIndex::new();
        let id = index.find_by_public_key(&key("aa"));
        let address = index[id].address.clone();

        index.forget_by_address(&address);
        assert!(index.get(id).is_some());
        index.forget_by_public_key(&key("aa"));
        assert!(index.get(id).is_none());
        assert!(index.is_empty());

        let reused = index.find_by_address(&Address::from("tly_new"));
        assert_eq!(reused, id);
    }

    #[test]
    fn purge_keeps_funded_and_delegate_wallets() {
        let mut index = WalletIndex::new();
        index.find_by_address(&Address::from("tly_empty"));
        let funded = index.find_by_address(&Address::from("tly_funded"));
        index[funded].balance = Amount::from(1);
        let delegate = index.find_by_public_key(&key("dd"));
        index[delegate].username = Some("dee".into());
        index.reindex(delegate);

        assert_eq!(index.purge_empty_non_delegates(), 1);
        assert!(!index.has_by_address(&Address::from("tly_empty")));
        assert!(index.has_by_address(&Address::from("tly_funded")));
        assert_eq!(index.purge_empty_non_delegates(), 0);
    }

    #[test]
    fn insert_indexes_all_keys() {
        let mut index = WalletIndex::new();
        let mut wallet = Wallet::from_public_key(key("bb"));
        wallet.username = Some("bob".into());
        let ids = index.index_wallets(vec![wallet]);
        assert_eq!(index.get_by_public_key(&key("bb")), Some(ids[0]));
        assert_eq!(index.find_by_username("bob"), Some(ids[0]));
    }

    #[test]
    fn clone_is_independent() {
        let mut index = WalletIndex::new();
        let id = index.find_by_address(&Address::from("tly_a"));
        let mut fork = index.clone();
        fork[id].balance = Amount::from(9);
        assert!(index[id].balance.is_zero());
    }

    #[test]
    fn reset_clears_everything() {
        let mut index = WalletIndex::new();
        index.find_by_public_key(&key("aa"));
        index.reset();
        assert!(index.is_empty());
        assert!(!index.has_by_public_key(&key("aa")));
    }
}
