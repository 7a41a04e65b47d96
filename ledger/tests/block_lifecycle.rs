//! Whole-block apply and revert against a live wallet manager.

mod common;

use common::*;
use std::sync::Arc;
use tally_crypto::derive_address;
use tally_ledger::{LedgerConfig, LedgerError, SharedWalletManager};
use tally_nullables::RecordingRedistribution;
use tally_transactions::stake::{THREE_MONTHS_SECS, TWO_YEARS_SECS};
use tally_transactions::TransactionId;
use tally_types::{Address, Amount, Nonce, RoundInfo, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GENERATOR: &str = "ff";

/// A manager with a registered generator, two delegates and two voters:
/// `aa` (1000) votes `d1`, `bb` (0) votes `d2`.
fn two_delegate_network() -> WalletManagerFixture {
    let (mut manager, clock) = manager();
    let generator = seed_delegate(&mut manager, GENERATOR, "forger");
    let d1 = seed_delegate(&mut manager, "d1", "one");
    let d2 = seed_delegate(&mut manager, "d2", "two");
    let sender = seed(&mut manager, "aa", 1_000);
    let recipient = seed(&mut manager, "bb", 0);
    manager.index_mut()[sender].vote = Some(key("d1"));
    manager.index_mut()[recipient].vote = Some(key("d2"));
    WalletManagerFixture {
        manager,
        clock,
        generator,
        d1,
        d2,
        sender,
        recipient,
    }
}

struct WalletManagerFixture {
    manager: tally_ledger::WalletManager,
    clock: Arc<tally_nullables::NullClock>,
    generator: tally_ledger::WalletId,
    d1: tally_ledger::WalletId,
    d2: tally_ledger::WalletId,
    sender: tally_ledger::WalletId,
    recipient: tally_ledger::WalletId,
}

fn bb_address() -> Address {
    derive_address(&key("bb"))
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[test]
fn genesis_creates_unknown_generator() {
    let (mut manager, _clock) = manager();
    manager.apply_block(&block("genesis", 1, "ab", vec![])).unwrap();

    let id = manager.index().get_by_public_key(&key("ab")).unwrap();
    let wallet = manager.wallet(id).unwrap();
    assert_eq!(wallet.address, derive_address(&key("ab")));
    assert_eq!(wallet.attributes.forging.produced_blocks, 1);
}

#[test]
fn unknown_generator_after_genesis_is_fatal() {
    let (mut manager, _clock) = manager();
    let err = manager
        .apply_block(&block("b2", 2, "ab", vec![]))
        .unwrap_err();

    assert!(matches!(err, LedgerError::UnknownGenerator { .. }));
    assert!(err.is_fatal());
    assert!(manager.index().is_empty());
}

// ---------------------------------------------------------------------------
// Transfers and votes
// ---------------------------------------------------------------------------

#[test]
fn transfer_moves_vote_weight_and_reverts_cleanly() {
    let mut f = two_delegate_network();
    let before = snapshot(&f.manager);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );

    f.manager.apply_block(&b).unwrap();
    assert_eq!(balance(&f.manager, f.sender), Amount::from(890));
    assert_eq!(balance(&f.manager, f.recipient), Amount::from(100));
    assert_eq!(balance(&f.manager, f.generator), Amount::from(10));
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(-110));
    assert_eq!(vote_balance(&f.manager, f.d2), Amount::from(100));
    assert_eq!(f.manager.index()[f.sender].nonce, Nonce::from(1));

    f.manager.revert_block(&b).unwrap();
    assert_eq!(snapshot(&f.manager), before);
}

#[test]
fn vote_cast_adds_post_fee_balance_and_stake_weight() {
    let (mut manager, _clock) = manager();
    seed_delegate(&mut manager, GENERATOR, "forger");
    let delegate = seed_delegate(&mut manager, "d1", "one");
    let voter = seed(&mut manager, "aa", 1_000);
    manager.index_mut()[voter].stake_weight = Amount::from(50);
    let b = block("b2", 2, GENERATOR, vec![vote("aa", 1, "+d1")]);

    manager.apply_block(&b).unwrap();
    assert_eq!(vote_balance(&manager, delegate), Amount::from(1_040));
    assert_eq!(manager.index()[voter].vote, Some(key("d1")));

    manager.revert_block(&b).unwrap();
    assert!(vote_balance(&manager, delegate).is_zero());
    assert_eq!(manager.index()[voter].vote, None);
    assert_eq!(balance(&manager, voter), Amount::from(1_000));
    assert_eq!(manager.index()[voter].nonce, Nonce::zero());
}

#[test]
fn failed_transaction_rolls_back_whole_block() {
    let mut f = two_delegate_network();
    let before = snapshot(&f.manager);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![
            transfer("aa", 1, &bb_address(), 100, 10),
            // skips nonce 2
            transfer("aa", 3, &bb_address(), 100, 10),
        ],
    );

    let err = f.manager.apply_block(&b).unwrap_err();
    assert!(!err.is_fatal());
    match err {
        LedgerError::Validation { id, .. } => assert_eq!(id, TransactionId::new("aa:3")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(snapshot(&f.manager), before);
}

#[test]
fn height_follows_applied_and_reverted_blocks() {
    let mut f = two_delegate_network();
    assert_eq!(f.manager.height(), 0);

    let b2 = block("b2", 2, GENERATOR, vec![]);
    f.manager.apply_block(&b2).unwrap();
    assert_eq!(f.manager.height(), 2);

    let b3 = block(
        "b3",
        3,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 5_000, 10)],
    );
    assert!(f.manager.apply_block(&b3).is_err());
    assert_eq!(f.manager.height(), 2);

    f.manager.revert_block(&b2).unwrap();
    assert_eq!(f.manager.height(), 1);
}

#[test]
fn insufficient_balance_leaves_wallets_untouched() {
    let mut f = two_delegate_network();
    let before = snapshot(&f.manager);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 1_000, 10)],
    );

    assert!(matches!(
        f.manager.apply_block(&b),
        Err(LedgerError::Validation { .. })
    ));
    assert_eq!(snapshot(&f.manager), before);
}

// ---------------------------------------------------------------------------
// Reward redistribution
// ---------------------------------------------------------------------------

fn with_pool(f: WalletManagerFixture) -> (WalletManagerFixture, Arc<RecordingRedistribution>) {
    let pool = Arc::new(RecordingRedistribution::new(
        Address::from("tly_pool"),
        Amount::from(5),
    ));
    let manager = f.manager.with_redistribution(pool.clone());
    (WalletManagerFixture { manager, ..f }, pool)
}

#[test]
fn redistribution_applied_once_and_reverted() {
    let (mut f, pool) = with_pool(two_delegate_network());
    let b = block("b2", 2, GENERATOR, vec![]);

    f.manager.apply_block(&b).unwrap();
    let beneficiary = f.manager.find_by_address(&Address::from("tly_pool"));
    assert_eq!(balance(&f.manager, beneficiary), Amount::from(5));
    assert_eq!(pool.applied(), 1);
    assert_eq!(pool.blocks(), vec![b.data.id.clone()]);

    f.manager.revert_block(&b).unwrap();
    assert!(balance(&f.manager, beneficiary).is_zero());
    assert_eq!(pool.reverted(), 1);
    assert!(pool.blocks().is_empty());
}

#[test]
fn redistribution_failure_reverts_block() {
    let (mut f, pool) = with_pool(two_delegate_network());
    pool.fail_on_apply(true);
    let before = snapshot(&f.manager);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );

    let err = f.manager.apply_block(&b).unwrap_err();
    assert!(matches!(err, LedgerError::Redistribution(_)));
    assert!(!err.is_fatal());
    assert_eq!(snapshot(&f.manager), before);
    assert_eq!(pool.applied(), 0);
}

#[test]
fn redistribution_revert_failure_changes_nothing() {
    let (mut f, pool) = with_pool(two_delegate_network());
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );
    f.manager.apply_block(&b).unwrap();
    let applied = snapshot(&f.manager);

    pool.fail_on_revert(true);
    assert!(matches!(
        f.manager.revert_block(&b),
        Err(LedgerError::RevertFailure { .. })
    ));
    assert_eq!(snapshot(&f.manager), applied);
}

#[test]
fn failed_transaction_revert_reapplies_block() {
    let (mut f, pool) = with_pool(two_delegate_network());
    let carol = Address::from("tly_carol");
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![
            transfer("aa", 1, &bb_address(), 100, 10),
            transfer("bb", 1, &carol, 50, 10),
        ],
    );
    f.manager.apply_block(&b).unwrap();

    // A nonce no revert can match makes the first transaction unrevertable.
    f.manager.index_mut()[f.sender].nonce = Nonce::from(5);
    let before = snapshot(&f.manager);

    let err = f.manager.revert_block(&b).unwrap_err();
    assert!(matches!(err, LedgerError::RevertFailure { .. }));
    assert_eq!(snapshot(&f.manager), before);
    assert_eq!(pool.applied(), 2);
    assert_eq!(pool.reverted(), 1);
}

// ---------------------------------------------------------------------------
// Stakes
// ---------------------------------------------------------------------------

#[test]
fn stake_halves_on_next_sender_transaction_in_window() {
    let mut f = two_delegate_network();
    f.manager.index_mut()[f.sender].balance = Amount::from(2_000);

    let create = block(
        "b2",
        2,
        GENERATOR,
        vec![stake("aa", 1, 1_000, THREE_MONTHS_SECS, 0)],
    );
    f.manager.apply_block(&create).unwrap();
    // -(1000 + 10) + 1000 × 0.5
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(-510));
    assert_eq!(f.manager.index()[f.sender].stake_weight, Amount::from(500));

    f.clock.set(7_890_400);
    let spend = block(
        "b3",
        3,
        GENERATOR,
        vec![transfer("aa", 2, &bb_address(), 100, 10)],
    );
    f.manager.apply_block(&spend).unwrap();

    let wallet = &f.manager.index()[f.sender];
    let stake = &wallet.stakes[&TransactionId::new("aa:1")];
    assert!(stake.halved);
    assert_eq!(stake.weight, Amount::from(250));
    assert_eq!(wallet.stake_weight, Amount::from(250));
    // -510 - 500 + 250 - 110
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(-870));
}

#[test]
fn power_up_swaps_locked_amount_for_stake_power() {
    let mut f = two_delegate_network();
    f.manager.index_mut()[f.sender].balance = Amount::from(2_000);
    let create = block(
        "b2",
        2,
        GENERATOR,
        vec![stake("aa", 1, 1_000, TWO_YEARS_SECS, 50)],
    );
    f.manager.apply_block(&create).unwrap();
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(990));
    assert_eq!(f.manager.pending_power_ups(), 1);

    assert!(f.manager.process_power_ups(Timestamp::new(49)).is_empty());
    let powered = f.manager.process_power_ups(Timestamp::new(50));
    assert_eq!(powered, vec![TransactionId::new("aa:1")]);

    let wallet = &f.manager.index()[f.sender];
    assert!(wallet.stakes[&TransactionId::new("aa:1")].active);
    assert_eq!(wallet.stake_power, Amount::from(2_000));
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(1_990));
    assert_eq!(f.manager.pending_power_ups(), 0);
}

#[test]
fn stake_revert_unschedules_power_up() {
    let mut f = two_delegate_network();
    let before = snapshot(&f.manager);
    let create = block(
        "b2",
        2,
        GENERATOR,
        vec![stake("aa", 1, 500, TWO_YEARS_SECS, 50)],
    );
    f.manager.apply_block(&create).unwrap();
    assert_eq!(f.manager.pending_power_ups(), 1);

    f.manager.revert_block(&create).unwrap();
    assert_eq!(f.manager.pending_power_ups(), 0);
    assert!(f.manager.process_power_ups(Timestamp::new(1_000)).is_empty());
    assert_eq!(snapshot(&f.manager), before);
}

#[test]
fn reverting_powered_up_stake_restores_delegate() {
    let mut f = two_delegate_network();
    f.manager.index_mut()[f.sender].balance = Amount::from(2_000);
    let before = snapshot(&f.manager);
    let create = block(
        "b2",
        2,
        GENERATOR,
        vec![stake("aa", 1, 1_000, TWO_YEARS_SECS, 50)],
    );
    f.manager.apply_block(&create).unwrap();
    f.manager.process_power_ups(Timestamp::new(50));
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::from(1_990));

    f.manager.revert_block(&create).unwrap();
    let wallet = &f.manager.index()[f.sender];
    assert_eq!(wallet.stake_power, Amount::zero());
    assert_eq!(vote_balance(&f.manager, f.d1), Amount::zero());
    assert_eq!(snapshot(&f.manager), before);
}

// ---------------------------------------------------------------------------
// Exceptions
// ---------------------------------------------------------------------------

#[test]
fn exception_skips_validation_and_may_overdraft() {
    let config = LedgerConfig {
        exceptions: vec![TransactionId::new("aa:1")],
        ..LedgerConfig::default()
    };
    let (mut manager, _clock) = manager_with(config);
    seed_delegate(&mut manager, GENERATOR, "forger");
    let sender = seed(&mut manager, "aa", 0);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );

    manager.apply_block(&b).unwrap();
    assert_eq!(balance(&manager, sender), Amount::from(-110));

    manager.revert_block(&b).unwrap();
    assert!(balance(&manager, sender).is_zero());
}

#[test]
fn non_exception_overdraft_is_rejected() {
    let (mut manager, _clock) = manager();
    seed_delegate(&mut manager, GENERATOR, "forger");
    seed(&mut manager, "aa", 0);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );
    assert!(matches!(
        manager.apply_block(&b),
        Err(LedgerError::Validation { .. })
    ));
}

// ---------------------------------------------------------------------------
// Delegates
// ---------------------------------------------------------------------------

#[test]
fn active_delegate_list_breaks_ties_by_public_key() {
    let (mut manager, _clock) = manager();
    for (hex, vote_balance) in [("cc", 90), ("bb", 100), ("aa", 100)] {
        let id = seed_delegate(&mut manager, hex, hex);
        manager.index_mut()[id].vote_balance = Amount::from(vote_balance);
    }

    let ranking = manager
        .load_active_delegate_list(&RoundInfo::new(7, 2))
        .unwrap();
    let names: Vec<_> = ranking.delegates.iter().map(|d| d.username.as_str()).collect();
    assert_eq!(names, ["aa", "bb"]);
    assert!(ranking.delegates.iter().all(|d| d.round == 7));
    assert_eq!(ranking.collisions.len(), 1);
    assert_eq!(ranking.collisions[0].first_rank, 1);

    let cc = manager.find_by_username("cc").unwrap();
    assert_eq!(manager.index()[cc].rate, Some(3));
}

#[test]
fn too_few_delegates_is_fatal() {
    let (mut manager, _clock) = manager();
    seed_delegate(&mut manager, "aa", "solo");
    let err = manager
        .load_active_delegate_list(&RoundInfo::new(1, 3))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientDelegates {
            expected: 3,
            found: 1
        }
    ));
    assert!(err.is_fatal());
}

#[test]
fn vote_balances_built_from_loaded_wallets() {
    let (mut manager, _clock) = manager();
    let delegate = seed_delegate(&mut manager, "d1", "one");
    let voter = seed(&mut manager, "aa", 1_000);
    manager.index_mut()[voter].stake_weight = Amount::from(20);
    manager.index_mut()[voter].vote = Some(key("d1"));
    let stray = seed(&mut manager, "bb", 500);
    manager.index_mut()[stray].vote = Some(key("ee"));
    let wallets = manager.index().len();

    manager.build_vote_balances();
    // 20 + 1000 × 0.1
    assert_eq!(vote_balance(&manager, delegate), Amount::from(120));
    assert_eq!(manager.index().len(), wallets);
    assert!(manager.index().get_by_public_key(&key("ee")).is_none());
}

// ---------------------------------------------------------------------------
// Housekeeping
// ---------------------------------------------------------------------------

#[test]
fn purge_is_idempotent() {
    let mut f = two_delegate_network();
    let before = f.manager.index().len();
    assert!(f.manager.can_be_purged(f.recipient));
    assert!(!f.manager.can_be_purged(f.d1));

    assert_eq!(f.manager.purge_empty_non_delegates(), 1);
    assert_eq!(f.manager.index().len(), before - 1);
    assert_eq!(f.manager.purge_empty_non_delegates(), 0);
    assert!(f.manager.index().get_by_public_key(&key("bb")).is_none());
    assert!(f.manager.is_delegate(&key("d2")));
}

#[test]
fn fork_is_independent() {
    let f = two_delegate_network();
    let mut fork = f.manager.fork();
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );

    fork.apply_block(&b).unwrap();
    assert_eq!(balance(&fork, f.sender), Amount::from(890));
    assert_eq!(balance(&f.manager, f.sender), Amount::from(1_000));
    assert!(vote_balance(&f.manager, f.d2).is_zero());
}

#[test]
fn shared_manager_serializes_writers() {
    let f = two_delegate_network();
    let sender = f.sender;
    let shared = SharedWalletManager::new(f.manager);
    let b = block(
        "b2",
        2,
        GENERATOR,
        vec![transfer("aa", 1, &bb_address(), 100, 10)],
    );

    std::thread::scope(|scope| {
        let writer = shared.clone();
        scope.spawn(move || writer.apply_block(&b).unwrap());
    });

    let after = shared.read(|m| balance(m, sender));
    assert_eq!(after, Amount::from(890));
    let fork = shared.fork();
    assert_eq!(balance(&fork, sender), after);
}
