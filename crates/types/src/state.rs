//! Chain state and genesis.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{Version, ValidatorSet, INIT_STATE_VERSION};

/// Genesis parameters, supplied once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Chain identifier.
    pub chain_id: String,

    /// Height of the first block.
    pub initial_height: u64,

    /// Initial application state root.
    pub app_hash: B256,

    /// Initial validator set (single proposer).
    pub validators: ValidatorSet,
}

impl Genesis {
    /// Initial height, treating 0 as 1.
    ///
    /// A chain starts at height 1 at the earliest.
    #[must_use]
    pub fn effective_initial_height(&self) -> u64 {
        self.initial_height.max(1)
    }
}

/// Chain state after the last applied block.
///
/// `last_block_height >= initial_height - 1` always holds, and
/// `last_block_height` grows by one per applied block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Protocol versions.
    pub version: Version,

    /// Chain identifier.
    pub chain_id: String,

    /// Height of the first block.
    pub initial_height: u64,

    /// Height of the last applied block; `initial_height - 1` before any.
    pub last_block_height: u64,

    /// Time of the last applied block (unix nanoseconds).
    pub last_block_time: u64,

    /// Header hash of the last applied block, zero before any.
    #[serde(default)]
    pub last_header_hash: B256,

    /// Commit hash of the last applied block, zero before any.
    #[serde(default)]
    pub last_commit_hash: B256,

    /// DA height of the last confirmed submission.
    pub da_height: u64,

    /// Application state root after the last applied block.
    pub app_hash: B256,

    /// Execution results root of the last applied block.
    pub last_results_hash: B256,

    /// Current validator set.
    pub validators: ValidatorSet,
}

impl State {
    /// Fresh state for a genesis, before any block is applied.
    #[must_use]
    pub fn from_genesis(genesis: &Genesis) -> Self {
        let initial_height = genesis.effective_initial_height();
        Self {
            version: INIT_STATE_VERSION,
            chain_id: genesis.chain_id.clone(),
            initial_height,
            last_block_height: initial_height - 1,
            last_block_time: 0,
            last_header_hash: B256::ZERO,
            last_commit_hash: B256::ZERO,
            da_height: 0,
            app_hash: genesis.app_hash,
            last_results_hash: B256::ZERO,
            validators: genesis.validators.clone(),
        }
    }

    /// Height of the next block to produce.
    #[must_use]
    pub fn next_height(&self) -> u64 {
        self.last_block_height.saturating_add(1)
    }

    /// Whether no block has been applied yet.
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.last_block_height.saturating_add(1) == self.initial_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis(initial_height: u64) -> Genesis {
        Genesis {
            chain_id: "myChain".to_string(),
            initial_height,
            app_hash: B256::repeat_byte(0xaa),
            validators: ValidatorSet::default(),
        }
    }

    #[test]
    fn test_from_genesis() {
        let state = State::from_genesis(&genesis(5));
        assert_eq!(state.initial_height, 5);
        assert_eq!(state.last_block_height, 4);
        assert_eq!(state.next_height(), 5);
        assert_eq!(state.app_hash, B256::repeat_byte(0xaa));
        assert_eq!(state.version, INIT_STATE_VERSION);
        assert!(state.is_genesis());
    }

    #[test]
    fn test_zero_initial_height_starts_at_one() {
        let state = State::from_genesis(&genesis(0));
        assert_eq!(state.initial_height, 1);
        assert_eq!(state.last_block_height, 0);
    }
}
