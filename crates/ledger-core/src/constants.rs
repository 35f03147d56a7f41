pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Base units per coin.
pub const COIN: u64 = 100_000_000;

pub const SYSTEM_ADDRESS: &str = "system";
pub const GENESIS_PREVIOUS_HASH: &str = "0";

pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 10;
pub const DEFAULT_DIFFICULTY: u32 = 4;

pub const DEFAULT_INITIAL_REWARD: u64 = 50 * COIN;
pub const DEFAULT_HALVING_INTERVAL: u64 = 210;
pub const DEFAULT_POOL_MAX_SIZE: usize = 1000;

/// Observers hear about the search every this many nonces.
pub const NONCE_MILESTONE: u64 = 10_000;
