//! DA submission pipeline.
//!
//! Each round snapshots the pending queue and submits it in order, in
//! batches as large as the DA layer accepts. A size-limit rejection halves
//! the batch and retries from the same cursor. A block that does not fit on
//! its own, or is larger than the reported maximum, stops the round with
//! [`SubmitError::BlockTooLarge`] and stays pending together with everything
//! after it. Any other DA error ends the round; the next round retries with
//! the queue unchanged.
//!
//! Blocks are marked DA-included only after the submit call containing them
//! returned success, and the confirmed prefix is removed from the queue on
//! every exit path.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sequencer_da::DataAvailability;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::BlockCache;
use crate::error::SubmitError;
use crate::pending::PendingBlocks;

/// Gas settings for DA submissions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasConfig {
    /// Configured gas price. Negative requests the DA client's default.
    pub gas_price: f64,

    /// Factor applied when a submission is not included in time.
    /// 0 disables the adjustment.
    pub gas_multiplier: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { gas_price: -1.0, gas_multiplier: 0.0 }
    }
}

/// Summary of a completed round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRound {
    /// Blocks confirmed in this round.
    pub submitted: usize,

    /// DA submit calls made in this round.
    pub attempts: usize,

    /// DA height of the last accepted batch, if any.
    pub da_height: Option<u64>,
}

/// Flushes [`PendingBlocks`] to the DA layer and records inclusion in the
/// [`BlockCache`].
pub struct DaSubmitter {
    da: Arc<dyn DataAvailability>,
    cache: Arc<BlockCache>,
    pending: Arc<PendingBlocks>,
    gas: GasConfig,
    gas_price: Mutex<f64>,
    da_height: AtomicU64,
    round: tokio::sync::Mutex<()>,
}

impl DaSubmitter {
    /// Create a submitter over the shared cache and queue.
    #[must_use]
    pub fn new(
        da: Arc<dyn DataAvailability>,
        cache: Arc<BlockCache>,
        pending: Arc<PendingBlocks>,
        gas: GasConfig,
    ) -> Self {
        Self {
            da,
            cache,
            pending,
            gas,
            gas_price: Mutex::new(gas.gas_price),
            da_height: AtomicU64::new(0),
            round: tokio::sync::Mutex::new(()),
        }
    }

    /// Resume DA height tracking from a previously confirmed height.
    #[must_use]
    pub fn with_da_height(self, da_height: u64) -> Self {
        self.da_height.store(da_height, Ordering::Release);
        self
    }

    /// Highest DA height at which a batch was accepted, 0 if none.
    #[must_use]
    pub fn last_da_height(&self) -> u64 {
        self.da_height.load(Ordering::Acquire)
    }

    /// Gas price the next submission will use. `None` means the DA default.
    #[must_use]
    pub fn current_gas_price(&self) -> Option<f64> {
        let price = *self.gas_price.lock();
        (price >= 0.0).then_some(price)
    }

    /// Run one submission round.
    ///
    /// Rounds are serialized; a concurrent call waits for the running one.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::BlockTooLarge`] if the next pending block alone
    ///   exceeds the maximum blob size.
    /// - [`SubmitError::Da`] for any other DA failure.
    /// - [`SubmitError::Cancelled`] if `cancel` fires during a DA call.
    ///
    /// Blocks confirmed before the failure are removed from the queue.
    pub async fn submit_blocks_to_da(
        &self,
        cancel: &CancellationToken,
    ) -> Result<SubmissionRound, SubmitError> {
        let _round = self.round.lock().await;

        let blocks = self.pending.snapshot();
        if blocks.is_empty() {
            return Ok(SubmissionRound::default());
        }

        let max_blob_size = cancellable(cancel, self.da.max_blob_size()).await?;
        let blobs = blocks.iter().map(|b| b.encode()).collect::<Result<Vec<_>, _>>()?;
        let total = blobs.len();

        debug!(
            pending = total,
            first_height = blocks[0].height(),
            max_blob_size,
            "Starting DA submission round"
        );

        let mut round = SubmissionRound::default();
        let mut batch = total;

        let outcome = loop {
            let start = round.submitted;
            if start == total {
                break Ok(());
            }
            // A block over the reported maximum cannot fit in any batch.
            if batch == 0 || blobs[start].len() as u64 > max_blob_size {
                break Err(SubmitError::BlockTooLarge {
                    height: blocks[start].height(),
                    size: blobs[start].len() as u64,
                    max: max_blob_size,
                });
            }

            let end = start + batch;
            round.attempts += 1;
            let gas_price = self.current_gas_price();

            match cancellable(cancel, self.da.submit(&blobs[start..end], gas_price)).await {
                Ok(receipt) => {
                    for block in &blocks[start..end] {
                        self.cache.set_da_included(block.hash());
                    }
                    info!(
                        first_height = blocks[start].height(),
                        last_height = blocks[end - 1].height(),
                        block_count = batch,
                        da_height = receipt.da_height,
                        ?gas_price,
                        "Blocks submitted to DA"
                    );
                    self.da_height.fetch_max(receipt.da_height, Ordering::AcqRel);
                    round.da_height = Some(receipt.da_height);
                    self.relax_gas_price();
                    round.submitted = end;
                    batch = total - end;
                }
                Err(SubmitError::Da(e)) if e.is_size_limit() => {
                    debug!(batch, error = %e, "Batch over DA size limit, halving");
                    batch /= 2;
                }
                Err(e) => {
                    if matches!(&e, SubmitError::Da(da) if da.is_underpriced()) {
                        self.raise_gas_price();
                    }
                    break Err(e);
                }
            }
        };

        self.pending.remove_prefix(round.submitted);

        match outcome {
            Ok(()) => Ok(round),
            Err(e) => {
                warn!(
                    submitted = round.submitted,
                    remaining = total - round.submitted,
                    attempts = round.attempts,
                    error = %e,
                    "DA submission round incomplete"
                );
                Err(e)
            }
        }
    }

    fn raise_gas_price(&self) {
        if self.gas.gas_multiplier <= 0.0 {
            return;
        }
        let mut price = self.gas_price.lock();
        if *price >= 0.0 {
            *price *= self.gas.gas_multiplier;
            info!(gas_price = *price, "Raised DA gas price");
        }
    }

    fn relax_gas_price(&self) {
        if self.gas.gas_multiplier <= 0.0 {
            return;
        }
        let mut price = self.gas_price.lock();
        if *price >= 0.0 {
            *price = (*price / self.gas.gas_multiplier).max(self.gas.gas_price);
        }
    }
}

/// Race a DA call against cancellation.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = sequencer_da::Result<T>>,
) -> Result<T, SubmitError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SubmitError::Cancelled),
        result = call => result.map_err(SubmitError::from),
    }
}
