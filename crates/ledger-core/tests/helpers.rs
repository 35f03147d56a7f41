use ledger_core::{Chain, LedgerConfig, Transaction};
use rand::{rngs::StdRng, Rng};

pub fn fresh_chain(difficulty: u32) -> Chain {
    Chain::new(LedgerConfig::default().with_difficulty(difficulty))
        .expect("Failed to build chain")
}

/// Credits `address` with `amount` through a mined block.
pub fn fund(chain: &mut Chain, address: &str, amount: u64, timestamp: u64) {
    chain
        .add_transaction(Transaction::transfer("system", address, amount, timestamp))
        .expect("Failed to admit funding transaction");
    chain
        .mine_pending_transactions("faucet-miner")
        .expect("Failed to mine funding block");
}

pub fn random_system_transfer(rng: &mut StdRng, timestamp: u64) -> Transaction {
    let to = format!("user-{}", rng.gen_range(0..16));
    Transaction::transfer("system", to, rng.gen_range(1..1_000), timestamp)
}
