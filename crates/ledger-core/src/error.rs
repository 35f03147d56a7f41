use serde::Serialize;
use thiserror::Error;

/// Errors returned synchronously by ledger operations. The caller corrects
/// and resubmits; nothing is queued for retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("insufficient funds for {address}: available {available}, requested {requested}")]
    InsufficientFunds {
        address: String,
        available: i64,
        requested: u64,
    },

    #[error("transaction is already pending")]
    DuplicateTransaction,

    #[error("block {0} not found")]
    BlockNotFound(u64),

    #[error("mining failed: {0}")]
    Mining(#[from] MiningError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sender address is required")]
    MissingSender,

    #[error("recipient address is required")]
    MissingRecipient,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("mining reward records are created by the miner only")]
    ReservedKind,

    #[error("difficulty {0} is outside 1..=10")]
    DifficultyOutOfRange(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The search itself cannot fail; it can only be stopped, or finish against
/// a tip that moved while it ran.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MiningError {
    #[error("mining was cancelled")]
    Cancelled,

    /// Every nonce in `u64` failed. Unreachable for difficulty 1..=10,
    /// which [`LedgerConfig::validate`](crate::LedgerConfig::validate) enforces.
    #[error("nonce space exhausted without meeting difficulty")]
    NonceSpaceExhausted,

    #[error("chain tip moved during mining: expected {expected}, found {actual}")]
    StaleTip { expected: String, actual: String },
}

/// What went wrong with a block during chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityFault {
    BadGenesis,
    IndexGap,
    HashMismatch,
    BrokenLink,
    InsufficientWork,
}

/// First (or each) failing block found by validation. Reported as data.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("block {index} failed validation: {fault:?}")]
pub struct IntegrityError {
    pub index: u64,
    pub fault: IntegrityFault,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("unexpected csv header: {0}")]
    Header(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: cannot parse {field}: {value}")]
    Field {
        line: usize,
        field: &'static str,
        value: String,
    },
}
