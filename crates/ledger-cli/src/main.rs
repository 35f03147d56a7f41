use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, env = "LEDGER_NODE", default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction
    Submit {
        /// Sender ("system" mints)
        #[arg(long)]
        from: String,
        /// Recipient
        #[arg(long)]
        to: String,
        /// Amount in base units
        #[arg(long)]
        amount: u64,
        /// Creation time in ms since the epoch; the node fills it in if absent
        #[arg(long)]
        timestamp: Option<u64>,
    },
    /// Mine the pending pool into a new block
    Mine {
        /// Address credited with the block reward
        #[arg(long)]
        miner: String,
    },
    /// Abort the block currently being mined
    Cancel,
    /// Chain summary
    Info,
    /// Projected balance of an address
    Balance { address: String },
    /// One block by index
    Block { index: u64 },
    /// Newest-first page of blocks
    Blocks {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Pending transactions and pool statistics
    Pool,
    /// Change the difficulty of future blocks (1-10)
    Difficulty { level: u32 },
    /// Check hashes, links and proof of work of every block
    Validate,
    /// Print the chain as CSV
    Export,
}

#[derive(Serialize)]
struct Tx {
    from: String,
    to: String,
    amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u64>,
}

#[derive(Serialize)]
struct Mine {
    miner: String,
}

#[derive(Serialize)]
struct Difficulty {
    difficulty: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/').to_string();
    let client = Client::new();

    let res = match cli.cmd {
        Command::Submit {
            from,
            to,
            amount,
            timestamp,
        } => {
            let tx = Tx {
                from,
                to,
                amount,
                timestamp,
            };
            client.post(format!("{node}/tx")).json(&tx).send().await?
        }
        Command::Mine { miner } => {
            client
                .post(format!("{node}/mine"))
                .json(&Mine { miner })
                .send()
                .await?
        }
        Command::Cancel => client.post(format!("{node}/mine/cancel")).send().await?,
        Command::Info => client.get(format!("{node}/chain")).send().await?,
        Command::Balance { address } => {
            client.get(format!("{node}/balance/{address}")).send().await?
        }
        Command::Block { index } => {
            client
                .get(format!("{node}/chain/blocks/{index}"))
                .send()
                .await?
        }
        Command::Blocks { page, limit } => {
            client
                .get(format!("{node}/chain/blocks"))
                .query(&[("page", page), ("limit", limit)])
                .send()
                .await?
        }
        Command::Pool => client.get(format!("{node}/pool")).send().await?,
        Command::Difficulty { level } => {
            client
                .post(format!("{node}/difficulty"))
                .json(&Difficulty { difficulty: level })
                .send()
                .await?
        }
        Command::Validate => client.get(format!("{node}/chain/validate")).send().await?,
        Command::Export => {
            let res = client.get(format!("{node}/chain/export")).send().await?;
            let status = res.status();
            let body = res.text().await?;
            if !status.is_success() {
                bail!("export failed ({status}): {body}");
            }
            print!("{body}");
            return Ok(());
        }
    };
    print_json(res).await
}

async fn print_json(res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, "node responded");
    let pretty = match serde_json::from_str::<Value>(&body) {
        Ok(v) => serde_json::to_string_pretty(&v)?,
        Err(_) => body,
    };
    if !status.is_success() {
        bail!("request failed ({status}): {pretty}");
    }
    println!("{pretty}");
    Ok(())
}
