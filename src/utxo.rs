//! UTXO set: the ground truth of spendable value at a chain position.
//!
//! Every chain node owns its own set; deriving a child's set from a parent
//! is a plain `Clone`, so sibling forks always see independent spend state.

use crate::error::{LedgerError, Result};
use crate::types::{OutPoint, Output};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Mapping from (transaction id, output index) to the spendable output.
///
/// `add` and `remove` treat key collisions and misses as errors: given
/// content-derived transaction ids those cases cannot arise from honest
/// input, so hitting one means the caller has broken a ledger invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet {
    entries: HashMap<OutPoint, Output>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outpoint: OutPoint, output: Output) -> Result<()> {
        match self.entries.entry(outpoint) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateUtxo(outpoint)),
            Entry::Vacant(slot) => {
                slot.insert(output);
                Ok(())
            }
        }
    }

    /// Deletes and returns the output under `outpoint`.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Result<Output> {
        self.entries
            .remove(outpoint)
            .ok_or(LedgerError::MissingUtxo(*outpoint))
    }

    pub fn lookup(&self, outpoint: &OutPoint) -> Option<&Output> {
        self.entries.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(outpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &Output)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
