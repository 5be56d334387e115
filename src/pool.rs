//! Global pool of known-but-unconfirmed transactions.
//!
//! The pool is a holding area and never validates: validity is rechecked at
//! block-assembly or block-acceptance time against the then-current UTXO
//! set. No pool operation fails visibly.

use crate::types::{short_id, Block, Transaction, TxId};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    entries: HashMap<TxId, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts by id. Re-adding an already-present id is a no-op.
    pub fn add(&mut self, tx: Transaction) {
        self.entries.entry(tx.id()).or_insert_with(|| {
            trace!(tx = %short_id(&tx.id()), "transaction pooled");
            tx
        });
    }

    /// Deletes if present, no-op otherwise.
    pub fn remove(&mut self, id: &TxId) {
        self.entries.remove(id);
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unordered snapshot for block assembly.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.values().cloned().collect()
    }

    /// Drops every transaction the accepted `block` confirms.
    pub fn confirm(&mut self, block: &Block) {
        self.remove(&block.coinbase().id());
        for tx in block.transactions() {
            self.remove(&tx.id());
        }
    }
}
