//! Data availability module.
//!
//! This crate defines the port the block manager submits blobs through,
//! the error taxonomy DA layers report with, an in-process DA layer and the
//! backoff policy used between failed submission rounds.

#![warn(missing_docs)]

mod backoff;
mod error;
mod local;

pub use backoff::{Backoff, DEFAULT_INITIAL_BACKOFF};
pub use error::DaError;
pub use local::{LocalDa, DEFAULT_MAX_BLOB_SIZE};

use alloy_primitives::B256;

/// Result type for DA operations.
pub type Result<T> = std::result::Result<T, DaError>;

/// Opaque payload submitted to the DA layer.
pub type Blob = Vec<u8>;

/// Identifier of an accepted blob.
pub type BlobId = B256;

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// DA height the blobs were included at.
    pub da_height: u64,

    /// Identifiers of the accepted blobs, in submission order.
    pub ids: Vec<BlobId>,
}

/// Trait for DA layer operations.
#[async_trait::async_trait]
pub trait DataAvailability: Send + Sync {
    /// Current maximum size of a single submission, in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the DA node cannot be queried.
    async fn max_blob_size(&self) -> Result<u64>;

    /// Submit `blobs` as one submission.
    ///
    /// `gas_price` of `None` requests the client's default pricing. A
    /// submission that is too large fails with [`DaError::BlobSizeOverLimit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the submission is rejected or fails.
    async fn submit(&self, blobs: &[Blob], gas_price: Option<f64>) -> Result<SubmitReceipt>;

    /// Blobs included at `da_height`, in submission order. Empty if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the DA node cannot be queried.
    async fn retrieve(&self, da_height: u64) -> Result<Vec<Blob>>;
}
