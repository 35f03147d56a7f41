use serde::{Deserialize, Serialize};
use std::hash::{Hash as StdHash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod mine;
pub mod observer;
pub mod pool;
pub mod pow;
pub mod report;
pub mod reward;

pub use block::{Block, MiningOutcome};
pub use chain::{Chain, ChainInfo, MinedBlock, MiningJob, MiningResult, Page};
pub use config::LedgerConfig;
pub use constants::{COIN, SYSTEM_ADDRESS};
pub use error::{
    IntegrityError, IntegrityFault, LedgerError, MiningError, ReportError, ValidationError,
};
pub use observer::{MiningObserver, NoopObserver, TracingObserver};
pub use pool::{PoolStats, TransactionPool};
pub use pow::CancelToken;

/// Raw SHA-256 digest.
pub type Hash = [u8; 32];

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Transfer,
    MiningReward,
}

/// A value transfer. Amounts are base units (see [`COIN`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn transfer(from: impl Into<String>, to: impl Into<String>, amount: u64, timestamp: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp,
            kind: TransactionKind::Transfer,
        }
    }

    /// Reward paid out of thin air to whoever mined the block.
    pub fn mining_reward(to: impl Into<String>, amount: u64, timestamp: u64) -> Self {
        Self {
            from: SYSTEM_ADDRESS.to_string(),
            to: to.into(),
            amount,
            timestamp,
            kind: TransactionKind::MiningReward,
        }
    }

    pub fn is_system(&self) -> bool {
        self.from == SYSTEM_ADDRESS
    }

    pub fn touches(&self, address: &str) -> bool {
        self.from == address || self.to == address
    }
}

// Identity is (from, to, amount, timestamp); the kind does not take part.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.amount == other.amount
            && self.from == other.from
            && self.to == other.to
    }
}

impl Eq for Transaction {}

impl StdHash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.amount.hash(state);
        self.timestamp.hash(state);
    }
}
