//! DA error types.

/// Errors reported by a DA layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DaError {
    /// The submission exceeds the maximum blob size.
    #[error("blob size over limit: {size} bytes (max: {max} bytes)")]
    BlobSizeOverLimit {
        /// Size of the rejected submission.
        size: u64,
        /// Current maximum blob size.
        max: u64,
    },

    /// The submission was accepted into the mempool but not included in a
    /// block before it expired.
    #[error("submission not included in block: {0}")]
    NotIncludedInBlock(String),

    /// An identical submission is already waiting in the mempool.
    #[error("submission already in mempool")]
    AlreadyInMempool,

    /// The DA node throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network or RPC failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not complete in time.
    #[error("DA request timed out")]
    Timeout,

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DaError {
    /// Whether the DA layer rejected the submission for its size.
    #[must_use]
    pub fn is_size_limit(&self) -> bool {
        matches!(self, Self::BlobSizeOverLimit { .. })
    }

    /// Whether the submission sat in the mempool without being included.
    ///
    /// These are the cases where paying more gas helps.
    #[must_use]
    pub fn is_underpriced(&self) -> bool {
        matches!(self, Self::NotIncludedInBlock(_) | Self::AlreadyInMempool)
    }
}
