//! Blake2b hashing.

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute a 160-bit Blake2b hash, used as the account identifier.
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Blake2b160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}
