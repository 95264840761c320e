//! In-process DA layer.
//!
//! Enforces a maximum blob size on the cumulative size of each submission,
//! keeps every accepted batch at its own DA height and hands blobs back by
//! height. Used by the node binary for local runs and by tests.

use std::collections::BTreeMap;

use alloy_primitives::keccak256;
use parking_lot::Mutex;
use tracing::debug;

use crate::{Blob, BlobId, DaError, DataAvailability, Result, SubmitReceipt};

/// Default maximum blob size, in bytes.
pub const DEFAULT_MAX_BLOB_SIZE: u64 = 64 * 64 * 482;

#[derive(Default)]
struct Inner {
    height: u64,
    blobs: BTreeMap<u64, Vec<Blob>>,
    submissions: usize,
}

/// In-memory DA layer with a size ceiling.
pub struct LocalDa {
    max_blob_size: u64,
    inner: Mutex<Inner>,
}

impl Default for LocalDa {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOB_SIZE)
    }
}

impl LocalDa {
    /// Create a DA layer accepting submissions of at most `max_blob_size` bytes.
    #[must_use]
    pub fn new(max_blob_size: u64) -> Self {
        Self { max_blob_size, inner: Mutex::new(Inner::default()) }
    }

    /// Current DA height (the height of the last accepted batch).
    #[must_use]
    pub fn height(&self) -> u64 {
        self.inner.lock().height
    }

    /// Blobs accepted at `height`.
    #[must_use]
    pub fn blobs_at(&self, height: u64) -> Vec<Blob> {
        self.inner.lock().blobs.get(&height).cloned().unwrap_or_default()
    }

    /// Every accepted blob in submission order.
    #[must_use]
    pub fn all_blobs(&self) -> Vec<Blob> {
        self.inner.lock().blobs.values().flatten().cloned().collect()
    }

    /// Number of submit calls that reached the layer, accepted or not.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.inner.lock().submissions
    }
}

#[async_trait::async_trait]
impl DataAvailability for LocalDa {
    async fn max_blob_size(&self) -> Result<u64> {
        Ok(self.max_blob_size)
    }

    async fn submit(&self, blobs: &[Blob], gas_price: Option<f64>) -> Result<SubmitReceipt> {
        let mut inner = self.inner.lock();
        inner.submissions += 1;

        let size: u64 = blobs.iter().map(|b| b.len() as u64).sum();
        if size > self.max_blob_size {
            return Err(DaError::BlobSizeOverLimit { size, max: self.max_blob_size });
        }

        inner.height += 1;
        let height = inner.height;
        let ids: Vec<BlobId> = blobs.iter().map(|b| keccak256(b)).collect();
        inner.blobs.insert(height, blobs.to_vec());

        debug!(da_height = height, blob_count = blobs.len(), size, ?gas_price, "Blobs accepted");

        Ok(SubmitReceipt { da_height: height, ids })
    }

    async fn retrieve(&self, da_height: u64) -> Result<Vec<Blob>> {
        Ok(self.blobs_at(da_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accepts_batch_under_limit() {
        let da = LocalDa::new(10);
        let receipt = da.submit(&[vec![1; 4], vec![2; 6]], None).await.unwrap();

        assert_eq!(receipt.da_height, 1);
        assert_eq!(receipt.ids.len(), 2);
        assert_eq!(da.blobs_at(1), vec![vec![1; 4], vec![2; 6]]);
        assert_eq!(da.height(), 1);
    }

    #[tokio::test]
    async fn test_rejects_cumulative_size_over_limit() {
        let da = LocalDa::new(10);
        let err = da.submit(&[vec![1; 6], vec![2; 6]], Some(0.5)).await.unwrap_err();

        assert_eq!(err, DaError::BlobSizeOverLimit { size: 12, max: 10 });
        assert_eq!(da.height(), 0);
        assert_eq!(da.submission_count(), 1);
        assert!(da.all_blobs().is_empty());
    }

    #[tokio::test]
    async fn test_heights_increase_per_batch() {
        let da = LocalDa::default();
        assert_eq!(da.max_blob_size().await.unwrap(), DEFAULT_MAX_BLOB_SIZE);

        da.submit(&[vec![1]], None).await.unwrap();
        let receipt = da.submit(&[vec![2], vec![3]], None).await.unwrap();

        assert_eq!(receipt.da_height, 2);
        assert_eq!(da.all_blobs(), vec![vec![1], vec![2], vec![3]]);
        assert_eq!(da.retrieve(2).await.unwrap(), vec![vec![2], vec![3]]);
        assert!(da.retrieve(3).await.unwrap().is_empty());
    }
}
