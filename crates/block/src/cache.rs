//! Per-block seen / DA-included tracking.

use std::collections::HashMap;

use parking_lot::RwLock;
use sequencer_types::BlockHash;

/// Status of one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// The block was produced locally or received from a peer.
    pub seen: bool,
    /// The block's encoding was accepted by the DA layer.
    pub da_included: bool,
}

/// Concurrency-safe map from block hash to [`CacheEntry`].
///
/// Entries are never removed while the node runs. `da_included` only ever
/// goes from false to true.
#[derive(Debug, Default)]
pub struct BlockCache {
    entries: RwLock<HashMap<BlockHash, CacheEntry>>,
}

impl BlockCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a block has been observed.
    pub fn mark_seen(&self, hash: BlockHash) {
        self.entries.write().entry(hash).or_default().seen = true;
    }

    /// Whether a block has been observed.
    #[must_use]
    pub fn is_seen(&self, hash: &BlockHash) -> bool {
        self.entries.read().get(hash).is_some_and(|e| e.seen)
    }

    /// Record that a block is DA-included. Idempotent.
    pub fn set_da_included(&self, hash: BlockHash) {
        self.entries.write().entry(hash).or_default().da_included = true;
    }

    /// Whether a block is DA-included. False for unknown hashes.
    #[must_use]
    pub fn is_da_included(&self, hash: &BlockHash) -> bool {
        self.entries.read().get(hash).is_some_and(|e| e.da_included)
    }

    /// Status of a block, if it was ever recorded.
    #[must_use]
    pub fn get(&self, hash: &BlockHash) -> Option<CacheEntry> {
        self.entries.read().get(hash).copied()
    }

    /// Number of tracked blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no block is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
