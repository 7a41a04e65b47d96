//! Wallet address derivation from public keys.
//!
//! Address format: `tly_` + base32(account_id, 32 chars) + base32(checksum, 8 chars)
//!
//! The account id is Blake2b-160(public_key); the checksum is the first 5 bytes of
//! Blake2b-256(account_id).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total address length: 4 (prefix) + 32 + 8 = 44 characters.

use crate::hash::{blake2b_160, blake2b_256};
use tally_types::{Address, PublicKey};

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Expected length of the encoded part (after the prefix): 32 id + 8 checksum.
const ENCODED_LEN: usize = 40;
/// Number of base32 characters for the account id (160 bits → 32).
const ACCOUNT_ID_CHARS: usize = 32;

fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return None;
    }
    Some(result)
}

/// Derive the wallet address owning a public key.
///
/// Deterministic: the same key always yields the same address on every node.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let account_id = blake2b_160(&public_key.to_bytes());
    let checksum = blake2b_256(&account_id);
    Address::new(format!(
        "{}{}{}",
        Address::PREFIX,
        encode_base32(&account_id),
        encode_base32(&checksum[..5])
    ))
}

/// Extract the account id from a well-formed address.
///
/// Returns `None` if the address is malformed or has an invalid checksum.
fn decode_address(address: &str) -> Option<[u8; 20]> {
    let encoded = address.strip_prefix(Address::PREFIX)?;
    if encoded.len() != ENCODED_LEN {
        return None;
    }

    let (id_encoded, checksum_encoded) = encoded.split_at(ACCOUNT_ID_CHARS);
    let account_id: [u8; 20] = decode_base32_fixed(id_encoded)?;
    let checksum: [u8; 5] = decode_base32_fixed(checksum_encoded)?;

    if checksum != blake2b_256(&account_id)[..5] {
        return None;
    }
    Some(account_id)
}

/// Validate that an address string is well-formed and its checksum is correct.
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}
