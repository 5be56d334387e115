//! Error types for ledger validation

use crate::types::{BlockId, OutPoint, TxId, Value};
use thiserror::Error;

/// Reasons a single transaction is rejected by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("input {input} spends unknown output {outpoint}")]
    UnknownInput { input: usize, outpoint: OutPoint },

    #[error("output {outpoint} claimed more than once in the same transaction")]
    DoubleSpendWithinTx { outpoint: OutPoint },

    #[error("unlock proof on input {input} does not authenticate the output owner")]
    InvalidProof { input: usize },

    #[error("output {index} carries invalid value {value}")]
    InvalidOutputValue { index: usize, value: Value },

    #[error("outputs ({outputs}) exceed spendable inputs ({inputs})")]
    ValueOverspend { inputs: Value, outputs: Value },
}

/// Reasons a block (or an internal operation) fails. All of these collapse
/// to a single boolean refusal at the `Ledger::add_block` surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("a second genesis block is never accepted")]
    GenesisRejected,

    #[error("parent block {} not found in the retained window", hex::encode(.0))]
    UnknownParent(BlockId),

    #[error("block height {height} is at or below the retention threshold {threshold}")]
    TooOld { height: u64, threshold: u64 },

    #[error("transaction {} rejected: {source}", hex::encode(.txid))]
    InvalidTransaction {
        txid: TxId,
        #[source]
        source: TxError,
    },

    // The two below indicate a consistency bug in the ledger itself, not a
    // property of the submitted block.
    #[error("UTXO {0} already present in the set")]
    DuplicateUtxo(OutPoint),

    #[error("UTXO {0} missing from the set")]
    MissingUtxo(OutPoint),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
