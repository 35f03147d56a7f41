//! Proof-of-work search over a fixed hash preimage.
//!
//! A block's preimage is everything but the nonce, followed by the nonce in
//! decimal. The fixed part is absorbed once into a SHA-256 state and cloned
//! per attempt, and the target is checked on raw digest bits instead of on
//! hex strings.

use crate::{
    constants::NONCE_MILESTONE, error::MiningError, observer::MiningObserver, Hash,
};
use sha2::{Digest, Sha256};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative stop signal shared between a miner and whoever started it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 8;
        } else {
            total += b.leading_zeros();
            break;
        }
    }
    total
}

/// `difficulty` leading hex digits of the digest are zero.
pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    count_leading_zero_bits(hash) >= difficulty * 4
}

/// Same check over an already hex-encoded hash.
pub fn hex_meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let d = difficulty as usize;
    hash.len() >= d && hash.as_bytes()[..d].iter().all(|c| *c == b'0')
}

/// SHA-256 state with the fixed part of a preimage already absorbed.
pub fn prefix_state(prefix: &str) -> Sha256 {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher
}

pub fn digest_with_nonce(state: &Sha256, nonce: u64) -> Hash {
    let mut buf = [0u8; 20];
    let mut hasher = state.clone();
    hasher.update(nonce_digits(nonce, &mut buf));
    hasher.finalize().into()
}

/// Decimal digits of `n` without allocating.
fn nonce_digits(mut n: u64, buf: &mut [u8; 20]) -> &[u8] {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[i..]
}

/// Tries nonces 0, 1, 2, ... until one meets `difficulty`. There is no
/// iteration cap; the only way out besides success is `cancel`.
pub fn search(
    prefix: &str,
    difficulty: u32,
    block_index: u64,
    cancel: &CancelToken,
    observer: &dyn MiningObserver,
) -> Result<(u64, Hash), MiningError> {
    let state = prefix_state(prefix);
    let mut nonce = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(MiningError::Cancelled);
        }
        let hash = digest_with_nonce(&state, nonce);
        if meets_difficulty(&hash, difficulty) {
            return Ok((nonce, hash));
        }
        nonce = nonce
            .checked_add(1)
            .ok_or(MiningError::NonceSpaceExhausted)?;
        if nonce % NONCE_MILESTONE == 0 {
            observer.on_nonce_milestone(block_index, nonce);
        }
    }
}
