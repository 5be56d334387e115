//! # Ledger-Core
//!
//! Validation and fork management for a minimal proof-of-work-free
//! blockchain: maintains the set of chain tips, selects the block chosen
//! for mining continuation, validates incoming blocks against a UTXO
//! model, and bounds memory by pruning chain history beyond a cutoff
//! depth.
//!
//! ## Architecture
//!
//! - [`utxo::UtxoSet`]: spendable value at one chain position
//! - [`validator`]: transaction validation against a working UTXO set
//! - [`chain::BlockIndex`]: chain tree, fork choice and pruning
//! - [`pool::TransactionPool`]: known-but-unconfirmed transactions
//! - [`Ledger`]: the owned aggregate tying the pieces together
//!
//! ## Design Principles
//!
//! 1. **Value identity**: blocks and transactions carry content-derived
//!    ids; every comparison is a value comparison
//! 2. **Owned state**: one `Ledger` owns all chain state; no process-wide
//!    singletons
//! 3. **Atomicity**: a block is applied fully or not at all
//! 4. **Bounded retention**: branches more than [`CUT_OFF_AGE`] behind the
//!    best tip are evicted
//!
//! ## Usage
//!
//! ```rust
//! use ledger_core::{Block, Ledger, Output, Transaction};
//!
//! let coinbase = Transaction::coinbase(vec![Output {
//!     value: 25,
//!     owner: vec![0x02; 33],
//! }]);
//! let genesis = Block::genesis(coinbase);
//! let ledger = Ledger::new(genesis.clone()).unwrap();
//!
//! assert_eq!(ledger.max_height_block().id(), genesis.id());
//! assert_eq!(ledger.max_height_utxo_set().len(), 1);
//! ```

pub mod chain;
pub mod constants;
pub mod error;
pub mod pool;
pub mod proof;
pub mod types;
pub mod utxo;
pub mod validator;

// Re-export commonly used types
pub use constants::*;
pub use error::{LedgerError, Result, TxError};
pub use proof::{ProofVerifier, Secp256k1Verifier};
pub use types::*;

use chain::BlockIndex;
use pool::TransactionPool;
use utxo::UtxoSet;
use tracing::debug;

/// Owned aggregate of all chain state: block index, transaction pool and
/// the proof verifier.
///
/// Mutating operations take `&mut self`, read-only queries `&self`, so
/// exclusive access is enforced by the borrow checker and every operation
/// is atomic from the caller's perspective. Callers sharing a ledger
/// across threads wrap it in a `Mutex`.
pub struct Ledger<V = Secp256k1Verifier> {
    index: BlockIndex,
    pool: TransactionPool,
    verifier: V,
}

impl Ledger<Secp256k1Verifier> {
    /// Creates a ledger with just the (assumed valid) genesis block,
    /// verifying unlock proofs as secp256k1 ECDSA signatures.
    pub fn new(genesis: Block) -> Result<Self> {
        Self::with_verifier(genesis, Secp256k1Verifier::new())
    }
}

impl<V: ProofVerifier> Ledger<V> {
    pub fn with_verifier(genesis: Block, verifier: V) -> Result<Self> {
        Ok(Self {
            index: BlockIndex::new(genesis)?,
            pool: TransactionPool::new(),
            verifier,
        })
    }

    /// Adds `block` if it is valid: the parent is retained, every listed
    /// transaction validates against the parent's UTXO set, and the block
    /// lands above the retention threshold. Returns `true` iff accepted;
    /// every refusal collapses to `false` with no partial application.
    pub fn add_block(&mut self, block: &Block) -> bool {
        match self.try_add_block(block) {
            Ok(()) => true,
            Err(reason) => {
                debug!(block = %short_id(&block.id()), %reason, "block refused");
                false
            }
        }
    }

    /// [`add_block`](Self::add_block) with the typed refusal reason.
    pub fn try_add_block(&mut self, block: &Block) -> Result<()> {
        self.index.connect(block, &self.verifier)?;
        self.pool.confirm(block);
        Ok(())
    }

    /// Admits an unconfirmed transaction to the pool. Idempotent; the pool
    /// never validates.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.pool.add(tx);
    }

    /// The block at the best-known tip (maximum height, first-seen wins
    /// among equal-height forks).
    pub fn max_height_block(&self) -> &Block {
        self.index.best_block()
    }

    /// Owned UTXO snapshot at the best tip, for mining a new block on top
    /// of it.
    pub fn max_height_utxo_set(&self) -> UtxoSet {
        self.index.utxo_at_best().clone()
    }

    /// Snapshot of the unconfirmed transaction pool, for block assembly.
    pub fn transaction_pool(&self) -> Vec<Transaction> {
        self.pool.snapshot()
    }

    /// Number of chain nodes currently retained.
    pub fn retained_blocks(&self) -> usize {
        self.index.len()
    }
}
