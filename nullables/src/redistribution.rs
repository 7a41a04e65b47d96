//! Nullable reward redistribution: moves a fixed bonus and records every call.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tally_ledger::{LedgerError, RewardRedistribution, WalletIndex};
use tally_types::{Address, Amount, BlockData, BlockId};

/// Credits `bonus` to `beneficiary` for every block, and can be told to fail.
#[derive(Debug)]
pub struct RecordingRedistribution {
    beneficiary: Address,
    bonus: Amount,
    fail_apply: AtomicBool,
    fail_revert: AtomicBool,
    applied: AtomicUsize,
    reverted: AtomicUsize,
    blocks: Mutex<Vec<BlockId>>,
}

impl RecordingRedistribution {
    pub fn new(beneficiary: Address, bonus: Amount) -> Self {
        Self {
            beneficiary,
            bonus,
            fail_apply: AtomicBool::new(false),
            fail_revert: AtomicBool::new(false),
            applied: AtomicUsize::new(0),
            reverted: AtomicUsize::new(0),
            blocks: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn fail_on_revert(&self, fail: bool) {
        self.fail_revert.store(fail, Ordering::SeqCst);
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn reverted(&self) -> usize {
        self.reverted.load(Ordering::SeqCst)
    }

    /// Blocks currently holding a bonus, in application order.
    pub fn blocks(&self) -> Vec<BlockId> {
        self.blocks.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl RewardRedistribution for RecordingRedistribution {
    fn apply_reward(&self, block: &BlockData, index: &mut WalletIndex) -> Result<(), LedgerError> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(LedgerError::Redistribution(format!(
                "refusing to redistribute block {}",
                block.id
            )));
        }
        let id = index.find_by_address(&self.beneficiary);
        index[id].balance += &self.bonus;
        self.applied.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut blocks) = self.blocks.lock() {
            blocks.push(block.id.clone());
        }
        Ok(())
    }

    fn revert_reward(&self, block: &BlockData, index: &mut WalletIndex) -> Result<(), LedgerError> {
        if self.fail_revert.load(Ordering::SeqCst) {
            return Err(LedgerError::Redistribution(format!(
                "refusing to revert redistribution of block {}",
                block.id
            )));
        }
        let id = index.find_by_address(&self.beneficiary);
        index[id].balance -= &self.bonus;
        self.reverted.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut blocks) = self.blocks.lock() {
            blocks.retain(|b| b != &block.id);
        }
        Ok(())
    }
}
