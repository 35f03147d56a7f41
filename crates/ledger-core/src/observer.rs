use crate::block::MiningOutcome;
use tracing::{debug, info};

/// Hooks into mining progress. Every method defaults to doing nothing.
pub trait MiningObserver: Send + Sync {
    /// Called each time the nonce crosses a multiple of
    /// [`crate::constants::NONCE_MILESTONE`].
    fn on_nonce_milestone(&self, _block_index: u64, _nonce: u64) {}

    fn on_block_mined(&self, _block_index: u64, _outcome: &MiningOutcome) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl MiningObserver for NoopObserver {}

/// Reports progress through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl MiningObserver for TracingObserver {
    fn on_nonce_milestone(&self, block_index: u64, nonce: u64) {
        debug!(block = block_index, nonce, "still mining");
    }

    fn on_block_mined(&self, block_index: u64, outcome: &MiningOutcome) {
        info!(
            block = block_index,
            nonce = outcome.nonce,
            elapsed_ms = outcome.elapsed_ms,
            miner = %outcome.miner,
            "mined block with hash {}",
            outcome.hash
        );
    }
}
