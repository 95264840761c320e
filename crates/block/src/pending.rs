//! Blocks waiting for DA submission.

use std::sync::Arc;

use parking_lot::Mutex;
use sequencer_types::Block;

/// Concurrency-safe, insertion-ordered queue of blocks awaiting DA
/// confirmation.
///
/// Blocks leave the queue only as a confirmed prefix, so the order never
/// changes.
#[derive(Debug, Default)]
pub struct PendingBlocks {
    blocks: Mutex<Vec<Arc<Block>>>,
}

impl PendingBlocks {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block at the tail.
    pub fn push(&self, block: Arc<Block>) {
        self.blocks.lock().push(block);
    }

    /// Current contents, in production order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Block>> {
        self.blocks.lock().clone()
    }

    /// Remove the first `n` blocks (clamped to the queue length).
    ///
    /// Blocks appended after a snapshot sit behind the snapshotted ones and
    /// are never touched when that snapshot's confirmed prefix is removed.
    pub fn remove_prefix(&self, n: usize) {
        let mut blocks = self.blocks.lock();
        let n = n.min(blocks.len());
        blocks.drain(..n);
    }

    /// Number of pending blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use sequencer_types::test_utils::random_block;

    use super::*;

    fn heights(blocks: &[Arc<Block>]) -> Vec<u64> {
        blocks.iter().map(|b| b.height()).collect()
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let pending = PendingBlocks::new();
        for height in 1..=3 {
            pending.push(Arc::new(random_block(height, 0)));
        }

        assert_eq!(heights(&pending.snapshot()), vec![1, 2, 3]);
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_remove_prefix_keeps_later_appends() {
        let pending = PendingBlocks::new();
        pending.push(Arc::new(random_block(1, 0)));
        pending.push(Arc::new(random_block(2, 0)));

        let snapshot = pending.snapshot();
        pending.push(Arc::new(random_block(3, 0)));

        pending.remove_prefix(snapshot.len());
        assert_eq!(heights(&pending.snapshot()), vec![3]);
    }

    #[test]
    fn test_remove_prefix_clamps() {
        let pending = PendingBlocks::new();
        pending.push(Arc::new(random_block(1, 0)));

        pending.remove_prefix(0);
        assert_eq!(pending.len(), 1);

        pending.remove_prefix(5);
        assert!(pending.is_empty());
    }
}
