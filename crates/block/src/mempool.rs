//! FIFO of transactions waiting for a block.

use std::collections::VecDeque;

use parking_lot::Mutex;
use sequencer_types::Transaction;

/// Shared transaction queue drained by block production.
#[derive(Debug, Default)]
pub struct Mempool {
    txs: Mutex<VecDeque<Transaction>>,
}

impl Mempool {
    /// Create an empty mempool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction at the tail.
    pub fn push(&self, tx: Transaction) {
        self.txs.lock().push_back(tx);
    }

    /// Take up to `max` transactions from the head.
    #[must_use]
    pub fn reap(&self, max: usize) -> Vec<Transaction> {
        let mut txs = self.txs.lock();
        let n = max.min(txs.len());
        txs.drain(..n).collect()
    }

    /// Put transactions back at the head, keeping their order.
    ///
    /// Used when a block built from them could not be produced.
    pub fn restore(&self, reaped: Vec<Transaction>) {
        let mut txs = self.txs.lock();
        for tx in reaped.into_iter().rev() {
            txs.push_front(tx);
        }
    }

    /// Number of queued transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.txs.lock().len()
    }

    /// Whether the mempool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.txs.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reap_and_restore_preserve_order() {
        let mempool = Mempool::new();
        for i in 0..5u8 {
            mempool.push(Transaction::new(vec![i]));
        }

        let reaped = mempool.reap(3);
        assert_eq!(reaped.iter().map(|t| t.data()[0]).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(mempool.len(), 2);

        mempool.restore(reaped);
        let all = mempool.reap(usize::MAX);
        assert_eq!(all.iter().map(|t| t.data()[0]).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert!(mempool.is_empty());
    }
}
