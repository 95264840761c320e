//! Transactions and block bodies.

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

/// Hash of a transaction.
pub type TransactionHash = B256;

/// A transaction to be included in a block.
///
/// Transactions are opaque bytes; the execution engine interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    data: Vec<u8>,
}

impl Transaction {
    /// Create a new transaction from raw bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the raw transaction bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length of the transaction data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if transaction data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Compute the transaction hash (keccak256).
    #[must_use]
    pub fn hash(&self) -> TransactionHash {
        keccak256(&self.data)
    }
}

impl From<Vec<u8>> for Transaction {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// Block body: the ordered list of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// Ordered transactions.
    pub txs: Vec<Transaction>,
}

impl Data {
    /// Create a body from transactions.
    #[must_use]
    pub fn new(txs: Vec<Transaction>) -> Self {
        Self { txs }
    }

    /// Hash of the body, bound into the header as `data_hash`.
    ///
    /// keccak256 of the RLP list of raw transaction bytes.
    #[must_use]
    pub fn hash(&self) -> B256 {
        let txs: Vec<&[u8]> = self.txs.iter().map(Transaction::data).collect();
        let mut buf = Vec::new();
        alloy_rlp::encode_list::<_, [u8]>(&txs, &mut buf);
        keccak256(&buf)
    }

    /// Number of transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Whether the body carries no transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_hash_depends_on_order() {
        let a = Transaction::new(vec![1, 2, 3]);
        let b = Transaction::new(vec![4, 5]);

        let ab = Data::new(vec![a.clone(), b.clone()]);
        let ba = Data::new(vec![b, a]);

        assert_ne!(ab.hash(), ba.hash());
        assert_eq!(ab.hash(), ab.clone().hash());
    }

    #[test]
    fn test_empty_data_hash_is_stable() {
        assert_eq!(Data::default().hash(), Data::new(vec![]).hash());
        assert_ne!(Data::default().hash(), B256::ZERO);
    }
}
