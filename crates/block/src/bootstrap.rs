//! Starting state derivation.
//!
//! Runs once, before block production or DA submission starts.

use sequencer_types::{Genesis, State};
use tracing::info;

use crate::store::StateStore;
use crate::{BlockError, Result};

/// Derive the authoritative starting state.
///
/// Without a stored state the chain starts fresh from `genesis`. A stored
/// state is authoritative for height progress and is returned unchanged, as
/// long as the genesis does not start past it.
///
/// # Errors
///
/// Returns [`BlockError::GenesisAheadOfState`] if
/// `genesis.initial_height > stored.last_block_height + 1`, or a store error
/// if the state cannot be read.
pub async fn initial_state(store: &dyn StateStore, genesis: &Genesis) -> Result<State> {
    let Some(stored) = store.get_state().await? else {
        let state = State::from_genesis(genesis);
        info!(
            chain_id = %state.chain_id,
            initial_height = state.initial_height,
            "No stored state, starting from genesis"
        );
        return Ok(state);
    };

    check_genesis(&stored, genesis)?;
    info!(
        chain_id = %stored.chain_id,
        last_block_height = stored.last_block_height,
        da_height = stored.da_height,
        "Resuming from stored state"
    );
    Ok(stored)
}

fn check_genesis(stored: &State, genesis: &Genesis) -> Result<()> {
    // effective_initial_height is at least 1
    let genesis_height = genesis.effective_initial_height();
    if genesis_height - 1 > stored.last_block_height {
        return Err(BlockError::GenesisAheadOfState {
            genesis: genesis_height,
            stored: stored.last_block_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sequencer_types::primitives::B256;
    use sequencer_types::test_utils::genesis_with_key;

    use super::*;
    use crate::MemoryStateStore;

    fn genesis(initial_height: u64) -> Genesis {
        let (mut genesis, _) = genesis_with_key();
        genesis.chain_id = "myChain".to_string();
        genesis.initial_height = initial_height;
        genesis.app_hash = B256::repeat_byte(0x42);
        genesis
    }

    fn stored(initial_height: u64, last_block_height: u64) -> State {
        let mut state = State::from_genesis(&genesis(initial_height));
        state.last_block_height = last_block_height;
        state
    }

    #[tokio::test]
    async fn test_initial_state_clean() {
        let store = MemoryStateStore::new();
        let genesis = genesis(1);

        let state = initial_state(&store, &genesis).await.unwrap();

        assert_eq!(state.last_block_height, 0);
        assert_eq!(state.initial_height, 1);
        assert_eq!(state.chain_id, "myChain");
        assert_eq!(state.app_hash, genesis.app_hash);
        assert!(store.get_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_initial_state_clean_higher_genesis() {
        let store = MemoryStateStore::new();
        let state = initial_state(&store, &genesis(50)).await.unwrap();
        assert_eq!(state.last_block_height, 49);
        assert_eq!(state.initial_height, 50);
    }

    #[tokio::test]
    async fn test_initial_state_stored() {
        let store = MemoryStateStore::new();
        let sample = stored(1, 100);
        store.update_state(&sample).await.unwrap();

        let state = initial_state(&store, &genesis(1)).await.unwrap();

        assert_eq!(state.last_block_height, 100);
        assert_eq!(state.initial_height, 1);
        assert_eq!(state, sample);
    }

    #[tokio::test]
    async fn test_initial_state_genesis_at_next_height() {
        let store = MemoryStateStore::new();
        store.update_state(&stored(1, 9)).await.unwrap();

        let state = initial_state(&store, &genesis(10)).await.unwrap();
        assert_eq!(state.last_block_height, 9);
    }

    #[tokio::test]
    async fn test_initial_state_stored_at_max_height() {
        let store = MemoryStateStore::new();
        store.update_state(&stored(1, u64::MAX)).await.unwrap();

        let state = initial_state(&store, &genesis(u64::MAX)).await.unwrap();
        assert_eq!(state.last_block_height, u64::MAX);
        assert_eq!(state.next_height(), u64::MAX);
    }

    #[tokio::test]
    async fn test_initial_state_unexpected_higher_genesis() {
        let store = MemoryStateStore::new();
        store.update_state(&stored(1, 0)).await.unwrap();

        let err = initial_state(&store, &genesis(2)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "genesis.InitialHeight (2) is greater than last stored state's LastBlockHeight (0)"
        );
    }
}
