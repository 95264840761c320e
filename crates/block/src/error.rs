//! Block manager error types.

use sequencer_da::DaError;
use sequencer_types::{CodecError, SigningError};

/// Errors that can occur in the block manager.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// Genesis starts past the stored chain progress.
    #[error(
        "genesis.InitialHeight ({genesis}) is greater than last stored state's LastBlockHeight ({stored})"
    )]
    GenesisAheadOfState {
        /// Initial height in the genesis.
        genesis: u64,
        /// Last block height in the stored state.
        stored: u64,
    },

    /// State store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Header signing failed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The execution engine rejected the block.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// This node's key is not the chain's proposer.
    #[error("node is not the proposer of this chain")]
    NotProposer,

    /// A DA submission round failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Errors from a DA submission round.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// A single block is larger than the DA layer accepts and can never be
    /// submitted as-is.
    #[error("block {height} is {size} bytes, larger than the maximum blob size of {max} bytes")]
    BlockTooLarge {
        /// Height of the oversized block.
        height: u64,
        /// Encoded size of the block.
        size: u64,
        /// Maximum blob size reported by the DA layer.
        max: u64,
    },

    /// The DA layer failed the submission.
    #[error("DA submission failed: {0}")]
    Da(#[from] DaError),

    /// A block could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The round was cancelled.
    #[error("DA submission cancelled")]
    Cancelled,
}

/// Errors from a state store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO failure.
    #[error("state store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored state could not be (de)serialized.
    #[error("state store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the execution engine.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The block does not extend the current state.
    #[error("block height {got} does not follow state height {expected}")]
    UnexpectedHeight {
        /// Height the state expects next.
        expected: u64,
        /// Height of the block.
        got: u64,
    },

    /// The engine failed to apply the block.
    #[error("block execution failed: {0}")]
    Failed(String),
}
