//! Block index / chain tree: ancestry, fork choice and bounded retention.
//!
//! Nodes reference their parent by id lookup into the index, never by an
//! owning pointer, so evicting a parent cannot dangle a child. A child of a
//! pruned parent simply resolves to `UnknownParent` when someone tries to
//! extend past the retained window.

use crate::constants::CUT_OFF_AGE;
use crate::error::{LedgerError, Result};
use crate::proof::ProofVerifier;
use crate::types::{short_id, Block, BlockId, OutPoint};
use crate::utxo::UtxoSet;
use crate::validator;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One retained block with its derived state. The UTXO set is owned by the
/// node exclusively: sibling forks must see independent spend states.
#[derive(Debug, Clone)]
struct ChainNode {
    block: Block,
    height: u64,
    utxo: UtxoSet,
}

/// Tree of retained blocks keyed by id, tracking the best tip (maximum
/// height, first-seen-wins among ties) and pruning branches that fall
/// behind it by more than [`CUT_OFF_AGE`].
#[derive(Debug, Clone)]
pub struct BlockIndex {
    nodes: HashMap<BlockId, ChainNode>,
    best_tip: BlockId,
    best_height: u64,
}

impl BlockIndex {
    /// Creates the index rooted at `genesis` (height 0), seeding the root
    /// UTXO set from the genesis coinbase outputs. The genesis block is
    /// assumed valid.
    pub fn new(genesis: Block) -> Result<Self> {
        let mut utxo = UtxoSet::new();
        apply_coinbase(&mut utxo, &genesis)?;

        let id = genesis.id();
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            ChainNode {
                block: genesis,
                height: 0,
                utxo,
            },
        );
        Ok(Self {
            nodes,
            best_tip: id,
            best_height: 0,
        })
    }

    /// Validates `block` against its parent and inserts it as a new node.
    /// Any failure leaves the index untouched.
    pub fn connect<V: ProofVerifier>(&mut self, block: &Block, verifier: &V) -> Result<()> {
        let parent_id = block.parent().ok_or(LedgerError::GenesisRejected)?;
        let parent = self
            .nodes
            .get(&parent_id)
            .ok_or(LedgerError::UnknownParent(parent_id))?;

        let height = parent.height + 1;
        if let Some(threshold) = self.best_height.checked_sub(CUT_OFF_AGE) {
            if height <= threshold {
                return Err(LedgerError::TooOld { height, threshold });
            }
        }

        // Validate on a derived copy; the parent's own set stays untouched.
        let mut utxo = parent.utxo.clone();
        validator::apply_all(verifier, &mut utxo, block.transactions())?;
        apply_coinbase(&mut utxo, block)?;

        self.nodes.insert(
            block.id(),
            ChainNode {
                block: block.clone(),
                height,
                utxo,
            },
        );
        if height > self.best_height {
            self.best_tip = block.id();
            self.best_height = height;
        }
        debug!(
            block = %short_id(&block.id()),
            height,
            txs = block.transactions().len(),
            "block connected"
        );
        self.prune();
        Ok(())
    }

    /// The block at the best-known tip.
    pub fn best_block(&self) -> &Block {
        &self.nodes[&self.best_tip].block
    }

    pub fn best_height(&self) -> u64 {
        self.best_height
    }

    /// The UTXO snapshot owned by the best tip, for mining continuation.
    pub fn utxo_at_best(&self) -> &UtxoSet {
        &self.nodes[&self.best_tip].utxo
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn height_of(&self, id: &BlockId) -> Option<u64> {
        self.nodes.get(id).map(|node| node.height)
    }

    /// Number of retained nodes; bounded by the cutoff window, not by the
    /// total number of blocks ever submitted.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Evicts nodes that can no longer be extended: anything at or below
    /// the threshold off the best path, and best-path ancestors strictly
    /// below it. The ancestor exactly at the threshold stays, so an
    /// honestly-extending child at `threshold + 1` still finds its parent.
    fn prune(&mut self) {
        let threshold = match self.best_height.checked_sub(CUT_OFF_AGE) {
            Some(threshold) => threshold,
            None => return,
        };
        let best_path = self.best_path_ids();
        let before = self.nodes.len();
        self.nodes.retain(|id, node| {
            if node.height > threshold {
                return true;
            }
            node.height == threshold && best_path.contains(id)
        });
        let evicted = before - self.nodes.len();
        if evicted > 0 {
            debug!(evicted, threshold, "pruned stale chain nodes");
        }
    }

    fn best_path_ids(&self) -> HashSet<BlockId> {
        let mut ids = HashSet::new();
        let mut cursor = Some(self.best_tip);
        while let Some(id) = cursor {
            match self.nodes.get(&id) {
                Some(node) => {
                    ids.insert(id);
                    cursor = node.block.parent();
                }
                None => break,
            }
        }
        ids
    }
}

/// Adds the coinbase outputs to `utxo`. The coinbase bypasses input checks
/// but its outputs still enter the derived set.
fn apply_coinbase(utxo: &mut UtxoSet, block: &Block) -> Result<()> {
    let coinbase = block.coinbase();
    for (i, output) in coinbase.outputs().iter().enumerate() {
        let outpoint = OutPoint {
            txid: coinbase.id(),
            index: i as u32,
        };
        utxo.add(outpoint, output.clone())?;
    }
    Ok(())
}
