use crate::{
    block::{Block, MiningOutcome},
    constants::NONCE_MILESTONE,
    error::MiningError,
    observer::MiningObserver,
    pow::{digest_with_nonce, meets_difficulty, prefix_state, CancelToken},
};
use rayon::prelude::*;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use tracing::info;

/// Mines `block` by searching nonces in parallel. The search is ordered, so
/// the nonce found is the same smallest nonce the serial search returns.
/// Milestones report the number of nonces tried so far across all threads.
/// Cancellation leaves `block` untouched.
pub fn mine_block_parallel(
    block: &mut Block,
    difficulty: u32,
    miner: &str,
    cancel: &CancelToken,
    observer: &dyn MiningObserver,
) -> Result<MiningOutcome, MiningError> {
    let started = Instant::now();
    let index = block.index;
    let state = prefix_state(&block.preimage_prefix());
    let tried = AtomicU64::new(0);

    // Rayon splits the range across threads; find_map_first still yields the
    // leftmost hit. Once cancelled, every probe reports Some(None).
    let found = (0u64..u64::MAX)
        .into_par_iter()
        .find_map_first(|nonce| {
            if cancel.is_cancelled() {
                return Some(None);
            }
            let attempts = tried.fetch_add(1, Ordering::Relaxed) + 1;
            if attempts % NONCE_MILESTONE == 0 {
                observer.on_nonce_milestone(index, attempts);
            }
            let hash = digest_with_nonce(&state, nonce);
            meets_difficulty(&hash, difficulty).then_some(Some((nonce, hash)))
        });

    let (nonce, hash) = match found {
        Some(Some(hit)) => hit,
        Some(None) => return Err(MiningError::Cancelled),
        None => return Err(MiningError::NonceSpaceExhausted),
    };

    let outcome = block.seal(nonce, &hash, difficulty, miner, started);
    info!(
        "Mined block {} with nonce {} and hash {}",
        index, outcome.nonce, outcome.hash
    );
    Ok(outcome)
}
