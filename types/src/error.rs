//! Parse and construction errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid multiplier: {0}")]
    InvalidMultiplier(String),

    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    #[error("nonce underflow: cannot decrement below zero")]
    NonceUnderflow,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("milestone list must not be empty")]
    NoMilestones,
}
