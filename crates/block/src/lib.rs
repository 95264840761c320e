//! Rollup block manager.
//!
//! Produces blocks on a single proposer, tracks which of them are seen and
//! DA-included, and submits pending blocks to the DA layer in order with
//! adaptive batch sizing.

#![warn(missing_docs)]

mod bootstrap;
mod cache;
mod error;
mod executor;
mod manager;
mod mempool;
mod pending;
mod store;
mod submitter;

pub use bootstrap::initial_state;
pub use cache::{BlockCache, CacheEntry};
pub use error::{BlockError, ExecutionError, StoreError, SubmitError};
pub use executor::{BlockExecutor, PassthroughExecutor};
pub use manager::{Manager, ManagerConfig};
pub use mempool::Mempool;
pub use pending::PendingBlocks;
pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use submitter::{DaSubmitter, GasConfig, SubmissionRound};

/// Result type for block manager operations.
pub type Result<T> = std::result::Result<T, BlockError>;
