//! Core ledger types: outputs, inputs, transactions and blocks.
//!
//! Identifiers are content-derived SHA-256 digests computed once at
//! construction, so identical content always yields the identical id and
//! all comparisons are value comparisons.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash type: 256-bit content digest
pub type Hash = [u8; 32];

/// Transaction identifier
pub type TxId = Hash;

/// Block identifier
pub type BlockId = Hash;

/// Byte string type (owner identities, unlock proofs)
pub type ByteString = Vec<u8>;

/// Monetary amount in base units
pub type Value = i64;

/// Short hex form of an identifier for log output.
pub fn short_id(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

/// Key of one spendable output: (transaction id, output index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxId,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.txid), self.index)
    }
}

/// A spendable amount bound to an owner identity (a serialized public key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: Value,
    pub owner: ByteString,
}

/// A claim on a previously created output, carrying the unlock proof that
/// must authenticate against that output's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub prev_txid: TxId,
    pub output_index: u32,
    pub unlock_proof: ByteString,
}

impl Input {
    /// The UTXO key this input claims.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.prev_txid,
            index: self.output_index,
        }
    }
}

/// Immutable transaction. A transaction with zero inputs is a
/// coinbase/genesis-reward transaction and mints new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TxId,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Transaction {
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        let id = derive_tx_id(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    /// A zero-input transaction introducing new value (mining reward).
    pub fn coinbase(outputs: Vec<Output>) -> Self {
        Self::new(Vec::new(), outputs)
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Digest an unlock proof for `input` must authenticate: the claimed
    /// outpoint plus every output of this transaction. Proofs themselves are
    /// excluded so a signature can never cover itself.
    pub fn sig_hash(&self, input: &Input) -> Hash {
        unlock_digest(&input.outpoint(), &self.outputs)
    }
}

/// Digest to sign when unlocking `outpoint` in a transaction producing
/// `outputs`. Usable before the transaction itself has been assembled.
pub fn unlock_digest(outpoint: &OutPoint, outputs: &[Output]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(outpoint.txid);
    hasher.update(outpoint.index.to_le_bytes());
    for output in outputs {
        hasher.update(output.value.to_le_bytes());
        hasher.update((output.owner.len() as u32).to_le_bytes());
        hasher.update(&output.owner);
    }
    hasher.finalize().into()
}

fn derive_tx_id(inputs: &[Input], outputs: &[Output]) -> TxId {
    let mut hasher = Sha256::new();
    hasher.update((inputs.len() as u32).to_le_bytes());
    for input in inputs {
        hasher.update(input.prev_txid);
        hasher.update(input.output_index.to_le_bytes());
        hasher.update((input.unlock_proof.len() as u32).to_le_bytes());
        hasher.update(&input.unlock_proof);
    }
    hasher.update((outputs.len() as u32).to_le_bytes());
    for output in outputs {
        hasher.update(output.value.to_le_bytes());
        hasher.update((output.owner.len() as u32).to_le_bytes());
        hasher.update(&output.owner);
    }
    hasher.finalize().into()
}

/// Immutable block: parent linkage by id (`None` only for genesis), the
/// coinbase transaction held apart from the listed transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    parent: Option<BlockId>,
    coinbase: Transaction,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(parent: Option<BlockId>, coinbase: Transaction, transactions: Vec<Transaction>) -> Self {
        let id = derive_block_id(parent.as_ref(), &coinbase, &transactions);
        Self {
            id,
            parent,
            coinbase,
            transactions,
        }
    }

    /// The chain root: no parent, no listed transactions.
    pub fn genesis(coinbase: Transaction) -> Self {
        Self::new(None, coinbase, Vec::new())
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn coinbase(&self) -> &Transaction {
        &self.coinbase
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

fn derive_block_id(parent: Option<&BlockId>, coinbase: &Transaction, transactions: &[Transaction]) -> BlockId {
    let mut hasher = Sha256::new();
    match parent {
        Some(parent) => {
            hasher.update([1u8]);
            hasher.update(parent);
        }
        None => hasher.update([0u8]),
    }
    hasher.update(coinbase.id());
    hasher.update((transactions.len() as u32).to_le_bytes());
    for tx in transactions {
        hasher.update(tx.id());
    }
    hasher.finalize().into()
}
