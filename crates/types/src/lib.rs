//! Core types for the rollup block manager.
//!
//! This crate provides the block data model shared by the DA and block
//! crates: headers, commits, blocks, validator sets, chain state, header
//! signing and the block codec.

#![warn(missing_docs)]

mod block;
mod config;
mod error;
pub mod serde_helpers;
pub mod signing;
mod state;
mod transaction;
mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use block::{
    Block, BlockHash, Commit, Header, Signature, SignedHeader, Version, INIT_STATE_VERSION,
    PRECOMMIT_VOTE,
};
pub use config::{BlockConfig, ConfigError, DaConfig, GenesisConfig, NodeConfig, StoreConfig};
pub use error::{CodecError, SigningError, ValidationError};
pub use signing::{sign_header, verify_commit};
pub use state::{Genesis, State};
pub use transaction::{Data, Transaction, TransactionHash};
pub use validator::{derive_address, Validator, ValidatorSet};

/// Re-export commonly used types from alloy.
pub mod primitives {
    pub use alloy_primitives::{Address, B256};
}
