mod api;
mod constants;

use api::AppState;
use clap::Parser;
use ledger_core::{
    constants::{
        DEFAULT_DIFFICULTY, DEFAULT_HALVING_INTERVAL, DEFAULT_INITIAL_REWARD,
        DEFAULT_POOL_MAX_SIZE,
    },
    Chain, LedgerConfig,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, env = "LEDGER_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// Leading zero hex digits required of new blocks (1-10)
    #[arg(long, env = "INITIAL_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Reward of the first block, in base units
    #[arg(long, env = "MINING_REWARD", default_value_t = DEFAULT_INITIAL_REWARD)]
    initial_reward: u64,

    /// Blocks between reward halvings
    #[arg(long, env = "HALVING_INTERVAL", default_value_t = DEFAULT_HALVING_INTERVAL)]
    halving_interval: u64,

    /// Pending transactions kept before the oldest is evicted
    #[arg(long, env = "POOL_MAX_SIZE", default_value_t = DEFAULT_POOL_MAX_SIZE)]
    pool_max_size: usize,

    /// Most pending transactions packed into one block
    #[arg(long, env = "BLOCK_TX_LIMIT")]
    block_tx_limit: Option<usize>,

    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,
}

impl Args {
    fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            difficulty: self.difficulty,
            initial_reward: self.initial_reward,
            halving_interval: self.halving_interval,
            pool_max_size: self.pool_max_size,
            block_tx_limit: self.block_tx_limit,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = args.ledger_config();
    let chain = Chain::new(config.clone())?;
    info!(?config, "ledger initialised with genesis block");

    let state = AppState::new(chain, args.parallel);
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = args.listen.parse()?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
