use tally_transactions::{TransactionError, TransactionId, TransactionType};
use tally_types::{Address, Amount, BlockId, Nonce, PublicKey, TypesError};
use thiserror::Error;

/// Errors raised by transaction handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    #[error("invalid transaction: {0}")]
    Transaction(#[from] TransactionError),

    #[error("no handler registered for {0} transactions")]
    NotRegistered(TransactionType),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("unexpected nonce: expected {expected}, got {got}")]
    UnexpectedNonce { expected: Nonce, got: Nonce },

    #[error("nonce error: {0}")]
    Nonce(#[from] TypesError),

    #[error("wallet already votes for {0}")]
    AlreadyVoted(PublicKey),

    #[error("wallet has no vote to remove")]
    NoVote,

    #[error("wallet votes for {voted}, not {requested}")]
    VoteMismatch { voted: PublicKey, requested: PublicKey },

    #[error("{0} is not a registered delegate")]
    UnknownDelegate(PublicKey),

    #[error("delegate {0} has resigned")]
    DelegateResigned(PublicKey),

    #[error("username {0} is already taken")]
    UsernameTaken(String),

    #[error("wallet is already a delegate")]
    AlreadyDelegate,

    #[error("wallet is not a delegate")]
    NotDelegate,

    #[error("delegate has already resigned")]
    AlreadyResigned,

    #[error("second signature already registered")]
    SecondSignatureAlreadyRegistered,

    #[error("multi-signature already registered")]
    MultiSignatureAlreadyRegistered,

    #[error("business already registered")]
    BusinessAlreadyRegistered,

    #[error("wallet state does not match the transaction being reverted: {0}")]
    RevertMismatch(&'static str),

    #[error("stake {0} already exists")]
    StakeExists(TransactionId),

    #[error("stake {0} not found")]
    UnknownStake(TransactionId),
}

/// Errors raised by the wallet manager.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("can't apply transaction {id} from {sender}: {source}")]
    Validation {
        id: TransactionId,
        sender: Address,
        #[source]
        source: HandlerError,
    },

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("failed to look up generator {public_key} of block {block}")]
    UnknownGenerator { public_key: PublicKey, block: BlockId },

    #[error("delegate {username} ({public_key}) appears twice in the ranking")]
    DuplicateDelegate {
        username: String,
        public_key: PublicKey,
    },

    #[error("delegate {username} has no public key")]
    MissingDelegatePublicKey { username: String },

    #[error("expected {expected} active delegates, found {found}")]
    InsufficientDelegates { expected: usize, found: usize },

    #[error("failed to revert block {block}: {source}")]
    RevertFailure {
        block: BlockId,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("reward redistribution failed: {0}")]
    Redistribution(String),

    #[error("attribute {key}: {reason}")]
    Attribute { key: String, reason: String },

    #[error("config error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Errors after which the wallet state can no longer be trusted.
    ///
    /// The library never terminates the process; callers that see a fatal error are
    /// expected to halt block processing.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::UnknownGenerator { .. }
            | Self::DuplicateDelegate { .. }
            | Self::MissingDelegatePublicKey { .. }
            | Self::InsufficientDelegates { .. } => true,
            Self::RevertFailure { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}
