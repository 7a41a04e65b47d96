//! Cryptographic primitives for the tally ledger.
//!
//! - **Blake2b** for hashing
//! - Address derivation with `tly_` prefix and base32 encoding
//!
//! Signature verification is consumed upstream as a trusted primitive and is not
//! part of the state engine.

pub mod address;
pub mod hash;

pub use address::{derive_address, validate_address};
pub use hash::{blake2b_160, blake2b_256};
