//! Tabular export of the chain, one row per block.
//!
//! Column names and order are fixed; downstream tooling reads them by name.

use crate::{error::ReportError, Block};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str =
    "index,timestamp,hash,previousHash,nonce,miner,transactionCount,reward";
const COLUMNS: usize = 8;
const NO_MINER: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRow {
    pub index: u64,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    pub hash: String,
    pub previous_hash: String,
    pub nonce: u64,
    pub miner: String,
    pub transaction_count: usize,
    pub reward: u64,
}

impl From<&Block> for BlockRow {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            timestamp: format_millis(block.timestamp),
            hash: block.hash.clone(),
            previous_hash: block.previous_hash.clone(),
            nonce: block.nonce,
            miner: block.miner.clone().unwrap_or_else(|| NO_MINER.to_string()),
            transaction_count: block.transactions.len(),
            reward: block.reward(),
        }
    }
}

pub fn export_rows(blocks: &[Block]) -> Vec<BlockRow> {
    blocks.iter().map(BlockRow::from).collect()
}

pub fn to_csv(rows: &[BlockRow]) -> String {
    let mut out = String::with_capacity((rows.len() + 1) * 200);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        let fields = [
            row.index.to_string(),
            row.timestamp.clone(),
            row.hash.clone(),
            row.previous_hash.clone(),
            row.nonce.to_string(),
            row.miner.clone(),
            row.transaction_count.to_string(),
            row.reward.to_string(),
        ];
        let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn parse_csv(input: &str) -> Result<Vec<BlockRow>, ReportError> {
    let mut lines = input.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header.trim_end() == CSV_HEADER => {}
        Some((_, header)) => return Err(ReportError::Header(header.to_string())),
        None => return Err(ReportError::Header(String::new())),
    }

    let mut rows = Vec::new();
    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let fields = split_line(line);
        if fields.len() != COLUMNS {
            return Err(ReportError::FieldCount {
                line: line_no,
                expected: COLUMNS,
                found: fields.len(),
            });
        }
        let num = |field: &'static str, value: &str| -> Result<u64, ReportError> {
            value.parse().map_err(|_| ReportError::Field {
                line: line_no,
                field,
                value: value.to_string(),
            })
        };
        rows.push(BlockRow {
            index: num("index", &fields[0])?,
            timestamp: fields[1].clone(),
            hash: fields[2].clone(),
            previous_hash: fields[3].clone(),
            nonce: num("nonce", &fields[4])?,
            miner: fields[5].clone(),
            transaction_count: num("transactionCount", &fields[6])? as usize,
            reward: num("reward", &fields[7])?,
        });
    }
    Ok(rows)
}

fn format_millis(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut cur)),
            _ => cur.push(c),
        }
    }
    fields.push(cur);
    fields
}
