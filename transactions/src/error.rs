use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid vote token {0:?}: expected '+' or '-' followed by a public key")]
    InvalidVote(String),

    #[error("a vote transaction must carry exactly one vote, found {0}")]
    VoteCount(usize),

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("fee must not be negative")]
    NegativeFee,

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("{kind} transaction must not carry an amount")]
    UnexpectedAmount { kind: &'static str },

    #[error("{0} transaction requires a recipient")]
    MissingRecipient(&'static str),

    #[error("stake duration {0}s is below the shortest stake level")]
    StakeDurationTooShort(u64),

    #[error("invalid delegate username {0:?}")]
    InvalidUsername(String),

    #[error("invalid multi-signature asset: {0}")]
    MultiSignature(String),

    #[error("invalid business asset: {0}")]
    Business(String),

    #[error("{0}")]
    Other(String),
}
