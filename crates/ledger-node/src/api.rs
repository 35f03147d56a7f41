//! HTTP surface over a single [`Chain`].
//!
//! The chain lives behind one `RwLock`: reads share it, every mutation takes
//! it exclusively for the length of the call. Proof-of-work runs on a
//! blocking worker between a read-locked `prepare_mining` and a write-locked
//! `commit_mined`, so admission and reads stay responsive while mining.

use crate::constants::{BLOCKS_PER_BATCH, CSV_CONTENT_TYPE, MAX_BLOCKS_PER_REQUEST};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{
    now_millis, report, Block, CancelToken, Chain, ChainInfo, IntegrityError, LedgerError,
    MiningError, MiningResult, Page, PoolStats, TracingObserver, Transaction, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    chain: Arc<RwLock<Chain>>,
    /// Token of the search in flight, if any. One search at a time.
    mining: Arc<Mutex<Option<CancelToken>>>,
    parallel: bool,
}

impl AppState {
    pub fn new(chain: Chain, parallel: bool) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
            mining: Arc::new(Mutex::new(None)),
            parallel,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("a block is already being mined")]
    Busy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MiningError> for ApiError {
    fn from(err: MiningError) -> Self {
        Self::Ledger(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Ledger(LedgerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::InsufficientFunds { .. }) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Ledger(LedgerError::BlockNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Ledger(LedgerError::DuplicateTransaction | LedgerError::Mining(_))
            | ApiError::Busy => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Head {
    height: u64,
    hash: String,
}

#[derive(Deserialize)]
struct TxIn {
    from: String,
    to: String,
    amount: u64,
    timestamp: Option<u64>,
}

#[derive(Deserialize)]
struct MineIn {
    miner: String,
}

#[derive(Deserialize)]
struct DifficultyIn {
    difficulty: u32,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct Balance {
    address: String,
    balance: i64,
}

#[derive(Serialize)]
struct PoolView {
    transactions: Vec<Transaction>,
    stats: PoolStats,
}

#[derive(Serialize)]
struct Validation {
    valid: bool,
    failures: Vec<IntegrityError>,
}

#[derive(Serialize)]
struct Cancelled {
    cancelled: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chain", get(chain_info))
        .route("/chain/head", get(chain_head))
        .route("/chain/blocks", get(blocks))
        .route("/chain/blocks/{index}", get(block))
        .route("/chain/validate", get(validate))
        .route("/chain/export", get(export_csv))
        .route("/balance/{address}", get(balance))
        .route("/pool", get(pool))
        .route("/tx", post(submit_tx))
        .route("/mine", post(mine))
        .route("/mine/cancel", post(cancel_mining))
        .route("/difficulty", post(set_difficulty))
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn chain_info(State(state): State<AppState>) -> Json<ChainInfo> {
    Json(state.chain.read().await.chain_info())
}

async fn chain_head(State(state): State<AppState>) -> Json<Head> {
    let chain = state.chain.read().await;
    let tip = chain.latest_block();
    Json(Head {
        height: tip.index,
        hash: tip.hash.clone(),
    })
}

async fn blocks(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Json<Page> {
    let limit = q
        .limit
        .unwrap_or(BLOCKS_PER_BATCH)
        .clamp(1, MAX_BLOCKS_PER_REQUEST);
    Json(state.chain.read().await.blocks_page(q.page.unwrap_or(1), limit))
}

async fn block(State(state): State<AppState>, Path(index): Path<u64>) -> ApiResult<Json<Block>> {
    let chain = state.chain.read().await;
    Ok(Json(chain.get_block(index)?.clone()))
}

async fn validate(State(state): State<AppState>) -> Json<Validation> {
    let failures = state.chain.read().await.validate_all();
    Json(Validation {
        valid: failures.is_empty(),
        failures,
    })
}

async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let rows = report::export_rows(state.chain.read().await.blocks());
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=blockchain.csv",
            ),
        ],
        report::to_csv(&rows),
    )
}

async fn balance(State(state): State<AppState>, Path(address): Path<String>) -> Json<Balance> {
    let balance = state.chain.read().await.balance(&address);
    Json(Balance { address, balance })
}

async fn pool(State(state): State<AppState>) -> Json<PoolView> {
    let chain = state.chain.read().await;
    Json(PoolView {
        transactions: chain.pool().peek(None),
        stats: chain.pool().stats(),
    })
}

async fn submit_tx(
    State(state): State<AppState>,
    Json(tx): Json<TxIn>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state.chain.write().await.submit_transaction(
        &tx.from,
        &tx.to,
        tx.amount,
        tx.timestamp.unwrap_or_else(now_millis),
    )?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn mine(State(state): State<AppState>, Json(req): Json<MineIn>) -> ApiResult<Json<MiningResult>> {
    if req.miner.trim().is_empty() {
        return Err(LedgerError::from(ValidationError::MissingRecipient).into());
    }
    let cancel = CancelToken::new();
    {
        let mut slot = state.mining.lock().await;
        if slot.is_some() {
            return Err(ApiError::Busy);
        }
        *slot = Some(cancel.clone());
    }

    // The worker owns the search, the commit and the busy slot. A client that
    // hangs up only drops the join handle, never the worker.
    let worker = tokio::spawn(async move {
        let job = state.chain.read().await.prepare_mining(&req.miner);
        let parallel = state.parallel;
        let searched = tokio::task::spawn_blocking(move || {
            if parallel {
                job.run_parallel(&cancel, &TracingObserver)
            } else {
                job.run(&cancel, &TracingObserver)
            }
        })
        .await;
        let result = match searched {
            Ok(Ok(mined)) => state
                .chain
                .write()
                .await
                .commit_mined(mined)
                .map_err(ApiError::from),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(ApiError::Internal(err.to_string())),
        };
        *state.mining.lock().await = None;
        result
    });

    let result = worker
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(result))
}

async fn cancel_mining(State(state): State<AppState>) -> Json<Cancelled> {
    let slot = state.mining.lock().await;
    let cancelled = match slot.as_ref() {
        Some(token) => {
            token.cancel();
            info!("mining cancellation requested");
            true
        }
        None => false,
    };
    Json(Cancelled { cancelled })
}

async fn set_difficulty(
    State(state): State<AppState>,
    Json(req): Json<DifficultyIn>,
) -> ApiResult<Json<ChainInfo>> {
    let mut chain = state.chain.write().await;
    chain.set_difficulty(req.difficulty)?;
    Ok(Json(chain.chain_info()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::LedgerConfig;
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn serve(chain: Chain) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(AppState::new(chain, false)))
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        assert_eq!(
            status(LedgerError::from(ValidationError::NonPositiveAmount)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(LedgerError::InsufficientFunds {
                address: "A".into(),
                available: 5,
                requested: 10
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(status(LedgerError::DuplicateTransaction), StatusCode::CONFLICT);
        assert_eq!(status(LedgerError::BlockNotFound(9)), StatusCode::NOT_FOUND);
        assert_eq!(status(MiningError::Cancelled), StatusCode::CONFLICT);
        assert_eq!(status(ApiError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            status(ApiError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn abandoned_mine_request_does_not_wedge_the_node() {
        let chain = Chain::new(LedgerConfig::default().with_difficulty(10)).unwrap();
        let base = serve(chain).await;
        let client = reqwest::Client::new();

        // The caller gives up long before a difficulty-10 block is found.
        let first = client
            .post(format!("{base}/mine"))
            .json(&json!({ "miner": "M1" }))
            .send();
        assert!(tokio::time::timeout(Duration::from_millis(100), first)
            .await
            .is_err());

        let cancelled: Value = client
            .post(format!("{base}/mine/cancel"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(cancelled["cancelled"], true);

        let res = client
            .post(format!("{base}/difficulty"))
            .json(&json!({ "difficulty": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);

        // The cancelled worker frees the slot shortly after it stops.
        let mut status = reqwest::StatusCode::CONFLICT;
        let mut body = Value::Null;
        for _ in 0..100 {
            let res = client
                .post(format!("{base}/mine"))
                .json(&json!({ "miner": "M2" }))
                .send()
                .await
                .unwrap();
            status = res.status();
            body = res.json().await.unwrap();
            if status != reqwest::StatusCode::CONFLICT {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(status, reqwest::StatusCode::OK, "{body}");
        assert_eq!(body["block"]["index"], 1);
        assert_eq!(body["miner"], "M2");

        let info: Value = client
            .get(format!("{base}/chain"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(info["length"], 2);
        assert_eq!(info["is_valid"], true);
    }

    #[tokio::test]
    async fn submitted_records_are_always_transfers() {
        let chain = Chain::new(LedgerConfig::default().with_difficulty(1)).unwrap();
        let base = serve(chain).await;
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{base}/tx"))
            .json(&json!({
                "from": "system",
                "to": "X",
                "amount": 7,
                "timestamp": 1,
                "type": "mining_reward"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        let tx: Value = res.json().await.unwrap();
        assert_eq!(tx["type"], "transfer");
    }
}
