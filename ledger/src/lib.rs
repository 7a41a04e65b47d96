//! Wallet state engine for a delegated proof-of-stake chain.
//!
//! Maintains every wallet's balance, nonce, vote, delegate registration and stakes,
//! applies and reverts blocks atomically, keeps each delegate's vote balance in step
//! with its voters, and produces the deterministic delegate ranking.
//!
//! - [`WalletIndex`]: arena of wallets looked up by address, public key, username
//! - [`HandlerRegistry`]: per-type transaction handlers
//! - [`VoteBalanceUpdater`]: vote-weight bookkeeping after each transaction
//! - [`build_delegate_ranking`]: delegate order and vote collisions
//! - [`WalletManager`]: block/transaction orchestration

pub mod attributes;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod index;
pub mod manager;
pub mod power_up;
pub mod ranking;
pub mod shared;
pub mod stake;
pub mod vote_balance;
pub mod wallet;

pub use attributes::{AttributeKey, AttributeValue};
pub use config::LedgerConfig;
pub use error::{HandlerError, LedgerError};
pub use handlers::{HandlerContext, HandlerRegistry, TransactionHandler};
pub use hooks::{ExceptionList, ExceptionRegistry, NoRedistribution, RewardRedistribution};
pub use index::{WalletId, WalletIndex};
pub use manager::WalletManager;
pub use power_up::{DuePowerUp, PowerUpSchedule};
pub use ranking::{build_delegate_ranking, DelegateRanking, DelegateSnapshot, VoteCollision};
pub use shared::SharedWalletManager;
pub use stake::{StakeKey, StakeObject};
pub use vote_balance::{Direction, VoteBalanceUpdater};
pub use wallet::{AuditEntry, Wallet, WalletSummary};
