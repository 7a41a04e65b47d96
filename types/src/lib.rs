//! Fundamental types for the tally account-state engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, public keys, exact monetary amounts and multipliers, timestamps and the
//! clock seam, block headers, round descriptors, and the per-height network milestones.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod keys;
pub mod multiplier;
pub mod nonce;
pub mod params;
pub mod round;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use block::{BlockData, BlockId};
pub use error::TypesError;
pub use keys::PublicKey;
pub use multiplier::Multiplier;
pub use nonce::Nonce;
pub use params::{Milestone, Milestones, StakeLevels};
pub use round::RoundInfo;
pub use time::{Clock, SystemClock, Timestamp};
