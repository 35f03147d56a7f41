use crate::{
    constants::GENESIS_PREVIOUS_HASH,
    error::MiningError,
    observer::{MiningObserver, NoopObserver},
    pow::{self, CancelToken},
    Transaction, TransactionKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Instant;

/// One ledger entry. `hash`, `nonce`, `difficulty` and `miner` are fixed
/// when the proof-of-work search succeeds; after that the block is never
/// modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64,
    /// Leading zero hex digits this block was mined against. The genesis
    /// block carries no work and records 0.
    pub difficulty: u32,
    #[serde(default)]
    pub miner: Option<String>,
}

/// What a successful search reports back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MiningOutcome {
    pub hash: String,
    pub nonce: u64,
    pub elapsed_ms: u64,
    pub miner: String,
}

impl Block {
    /// Candidate block with `nonce = 0` and its initial hash.
    pub fn new(
        index: u64,
        timestamp: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        difficulty: u32,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
            difficulty,
            miner: None,
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn genesis(timestamp: u64) -> Self {
        Self::new(0, timestamp, Vec::new(), GENESIS_PREVIOUS_HASH, 0)
    }

    /// Everything that goes into the hash except the nonce, in order:
    /// index, previous hash, timestamp, JSON of the transactions.
    pub(crate) fn preimage_prefix(&self) -> String {
        // Vec<Transaction> holds only strings, integers and unit enums.
        let payload =
            serde_json::to_string(&self.transactions).expect("transactions serialize to json");
        format!(
            "{}{}{}{}",
            self.index, self.previous_hash, self.timestamp, payload
        )
    }

    /// Hex SHA-256 of the block's fields and current nonce.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.preimage_prefix().as_bytes());
        hasher.update(self.nonce.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Stored hash still matches the block's contents.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Stored hash meets the difficulty stored on this block.
    pub fn meets_target(&self) -> bool {
        pow::hex_meets_difficulty(&self.hash, self.difficulty)
    }

    pub fn reward(&self) -> u64 {
        self.transactions
            .iter()
            .find(|tx| tx.kind == TransactionKind::MiningReward)
            .map(|tx| tx.amount)
            .unwrap_or(0)
    }

    /// Searches for the smallest nonce meeting `difficulty`, then seals the
    /// block for `miner`. Runs until it succeeds.
    pub fn mine(&mut self, difficulty: u32, miner: &str) -> Result<MiningOutcome, MiningError> {
        self.mine_with(difficulty, miner, &CancelToken::new(), &NoopObserver)
    }

    /// Like [`Block::mine`], but checks `cancel` before every attempt. A
    /// cancelled search leaves the block exactly as it was.
    pub fn mine_with(
        &mut self,
        difficulty: u32,
        miner: &str,
        cancel: &CancelToken,
        observer: &dyn MiningObserver,
    ) -> Result<MiningOutcome, MiningError> {
        let started = Instant::now();
        let (nonce, hash) = pow::search(
            &self.preimage_prefix(),
            difficulty,
            self.index,
            cancel,
            observer,
        )?;
        Ok(self.seal(nonce, &hash, difficulty, miner, started))
    }

    pub(crate) fn seal(
        &mut self,
        nonce: u64,
        hash: &crate::Hash,
        difficulty: u32,
        miner: &str,
        started: Instant,
    ) -> MiningOutcome {
        self.nonce = nonce;
        self.hash = hex::encode(hash);
        self.difficulty = difficulty;
        self.miner = Some(miner.to_string());
        MiningOutcome {
            hash: self.hash.clone(),
            nonce,
            elapsed_ms: started.elapsed().as_millis() as u64,
            miner: miner.to_string(),
        }
    }
}
