//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators of the wallet manager (the clock and the reward
//! redistribution hook) are abstracted behind traits. This crate provides
//! test-friendly implementations that return deterministic values and can be
//! controlled programmatically.

pub mod clock;
pub mod redistribution;

pub use clock::NullClock;
pub use redistribution::RecordingRedistribution;
