use crate::constants::{
    DEFAULT_DIFFICULTY, DEFAULT_HALVING_INTERVAL, DEFAULT_INITIAL_REWARD, DEFAULT_POOL_MAX_SIZE,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Tunables for a fresh [`crate::Chain`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of the next block.
    pub difficulty: u32,
    /// Reward of the first block, in base units.
    pub initial_reward: u64,
    /// Blocks between reward halvings.
    pub halving_interval: u64,
    /// Pending records kept before the oldest is evicted.
    pub pool_max_size: usize,
    /// Upper bound on pool records packed into one block; `None` takes all.
    pub block_tx_limit: Option<usize>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            initial_reward: DEFAULT_INITIAL_REWARD,
            halving_interval: DEFAULT_HALVING_INTERVAL,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            block_tx_limit: None,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_difficulty(self.difficulty)?;
        if self.initial_reward == 0 {
            return Err(ValidationError::InvalidConfig(
                "initial_reward must be positive".into(),
            ));
        }
        if self.halving_interval == 0 {
            return Err(ValidationError::InvalidConfig(
                "halving_interval must be positive".into(),
            ));
        }
        if self.pool_max_size == 0 {
            return Err(ValidationError::InvalidConfig(
                "pool_max_size must be positive".into(),
            ));
        }
        if self.block_tx_limit == Some(0) {
            return Err(ValidationError::InvalidConfig(
                "block_tx_limit must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_difficulty(level: u32) -> Result<(), ValidationError> {
    if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&level) {
        Ok(())
    } else {
        Err(ValidationError::DifficultyOutOfRange(level))
    }
}
