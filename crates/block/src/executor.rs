//! Execution engine port.

use sequencer_types::{Block, State};

use crate::error::ExecutionError;

/// Applies blocks to application state.
#[async_trait::async_trait]
pub trait BlockExecutor: Send + Sync {
    /// Apply `block` on top of `state`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be applied.
    async fn apply_block(&self, state: &State, block: &Block) -> Result<State, ExecutionError>;
}

/// Executor without an application: advances height and time, keeps the
/// application hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughExecutor;

#[async_trait::async_trait]
impl BlockExecutor for PassthroughExecutor {
    async fn apply_block(&self, state: &State, block: &Block) -> Result<State, ExecutionError> {
        let expected = state.next_height();
        if block.height() != expected {
            return Err(ExecutionError::UnexpectedHeight { expected, got: block.height() });
        }

        let mut next = state.clone();
        next.last_block_height = block.height();
        next.last_block_time = block.header().time;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use sequencer_types::test_utils::{genesis_with_key, random_block};

    use super::*;

    #[tokio::test]
    async fn test_passthrough_advances_height() {
        let (genesis, _) = genesis_with_key();
        let state = State::from_genesis(&genesis);
        let block = random_block(1, 1);

        let next = PassthroughExecutor.apply_block(&state, &block).await.unwrap();

        assert_eq!(next.last_block_height, 1);
        assert_eq!(next.last_block_time, block.header().time);
        assert_eq!(next.app_hash, state.app_hash);
    }

    #[tokio::test]
    async fn test_passthrough_rejects_gap() {
        let (genesis, _) = genesis_with_key();
        let state = State::from_genesis(&genesis);

        let err = PassthroughExecutor.apply_block(&state, &random_block(3, 0)).await.unwrap_err();
        assert!(matches!(err, ExecutionError::UnexpectedHeight { expected: 1, got: 3 }));
    }
}
