use crate::{constants::DEFAULT_POOL_MAX_SIZE, error::LedgerError, Transaction};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Pending records in admission order, bounded by `max_size`.
///
/// `order` keeps FIFO position; `index` answers duplicate checks in O(1).
/// Both always hold the same records.
#[derive(Clone, Debug)]
pub struct TransactionPool {
    order: VecDeque<Transaction>,
    index: HashSet<Transaction>,
    max_size: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PoolStats {
    pub count: usize,
    pub total_amount: u64,
    pub average_amount: u64,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_MAX_SIZE)
    }
}

impl TransactionPool {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            order: VecDeque::with_capacity(max_size.min(DEFAULT_POOL_MAX_SIZE)),
            index: HashSet::new(),
            max_size,
        }
    }

    /// Appends `tx`, evicting the oldest record first when full.
    /// Returns the evicted record, if any.
    pub fn admit(&mut self, tx: Transaction) -> Result<Option<Transaction>, LedgerError> {
        if self.index.contains(&tx) {
            return Err(LedgerError::DuplicateTransaction);
        }
        let evicted = if self.order.len() >= self.max_size {
            let oldest = self.order.pop_front();
            if let Some(old) = &oldest {
                self.index.remove(old);
                debug!(from = %old.from, to = %old.to, amount = old.amount, "pool full, evicted oldest");
            }
            oldest
        } else {
            None
        };
        self.index.insert(tx.clone());
        self.order.push_back(tx);
        Ok(evicted)
    }

    /// Up to `limit` records in admission order. Leaves the pool untouched.
    pub fn peek(&self, limit: Option<usize>) -> Vec<Transaction> {
        let take = limit.unwrap_or(self.order.len());
        self.order.iter().take(take).cloned().collect()
    }

    /// Drops every pending record equal to one in `records`. Records not in
    /// the pool are ignored. Returns how many were removed.
    pub fn remove_matching(&mut self, records: &[Transaction]) -> usize {
        let mut removed = 0;
        for tx in records {
            if self.index.remove(tx) {
                removed += 1;
            }
        }
        if removed > 0 {
            let index = &self.index;
            self.order.retain(|tx| index.contains(tx));
        }
        removed
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    pub fn contains(&self, tx: &Transaction) -> bool {
        self.index.contains(tx)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.order.iter()
    }

    /// Pending records sent from or to `address`.
    pub fn by_address(&self, address: &str) -> Vec<Transaction> {
        self.order
            .iter()
            .filter(|tx| tx.touches(address))
            .cloned()
            .collect()
    }

    /// Sum of amounts `address` has pending as a sender.
    pub fn pending_outgoing(&self, address: &str) -> u64 {
        self.order
            .iter()
            .filter(|tx| tx.from == address)
            .fold(0u64, |acc, tx| acc.saturating_add(tx.amount))
    }

    pub fn stats(&self) -> PoolStats {
        let count = self.order.len();
        let total_amount = self
            .order
            .iter()
            .fold(0u64, |acc, tx| acc.saturating_add(tx.amount));
        PoolStats {
            count,
            total_amount,
            average_amount: if count == 0 { 0 } else { total_amount / count as u64 },
        }
    }
}
