//! Block reward halving schedule.

/// Reward for the block mined when the chain holds `chain_length` blocks:
/// `initial_reward / 2^floor(chain_length / halving_interval)`.
///
/// Amounts are integral base units, so every halving is a right shift; the
/// reward reaches zero once 64 halvings have elapsed. A zero interval is
/// treated as "never halve".
pub fn reward(chain_length: u64, initial_reward: u64, halving_interval: u64) -> u64 {
    let halvings = halvings(chain_length, halving_interval);
    if halvings >= u64::BITS as u64 {
        0
    } else {
        initial_reward >> halvings
    }
}

pub fn halvings(chain_length: u64, halving_interval: u64) -> u64 {
    chain_length.checked_div(halving_interval).unwrap_or(0)
}

/// Blocks remaining until the reward halves again.
pub fn blocks_until_halving(chain_length: u64, halving_interval: u64) -> u64 {
    if halving_interval == 0 {
        return u64::MAX;
    }
    halving_interval - chain_length % halving_interval
}
