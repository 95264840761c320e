//! Builders for tests in this and dependent crates.
//!
//! Enabled with the `test-utils` feature.

use alloy_primitives::{Address, B256};
use ed25519_dalek::SigningKey;
use rand::{Rng, RngCore};

use crate::signing::sign_header;
use crate::{
    Block, Data, Genesis, Header, SignedHeader, Transaction, ValidatorSet, INIT_STATE_VERSION,
};

/// Chain ID used by the builders.
pub const TEST_CHAIN_ID: &str = "test";

/// Deterministic signing key from a one-byte seed.
#[must_use]
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// Signing key from random bytes.
#[must_use]
pub fn random_signing_key() -> SigningKey {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    SigningKey::from_bytes(&seed)
}

/// `n` random bytes.
#[must_use]
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut data = vec![0u8; n];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// Random transaction of 100 to 199 bytes.
#[must_use]
pub fn random_tx() -> Transaction {
    let size = rand::thread_rng().gen_range(100..200);
    Transaction::new(random_bytes(size))
}

fn random_hash() -> B256 {
    B256::from(rand::random::<[u8; 32]>())
}

/// Header with random hashes at `height`. Not signed.
#[must_use]
pub fn random_header(height: u64) -> Header {
    Header {
        height,
        time: rand::random::<u32>() as u64,
        chain_id: TEST_CHAIN_ID.to_string(),
        version: INIT_STATE_VERSION,
        last_header_hash: random_hash(),
        last_commit_hash: random_hash(),
        data_hash: random_hash(),
        consensus_hash: random_hash(),
        app_hash: random_hash(),
        last_results_hash: random_hash(),
        proposer_address: Address::from(rand::random::<[u8; 20]>()),
        validator_hash: random_hash(),
    }
}

/// Genesis with a single proposer and its key.
#[must_use]
pub fn genesis_with_key() -> (Genesis, SigningKey) {
    let key = random_signing_key();
    let genesis = Genesis {
        chain_id: TEST_CHAIN_ID.to_string(),
        initial_height: 1,
        app_hash: B256::ZERO,
        validators: ValidatorSet::from_signing_key(&key),
    };
    (genesis, key)
}

/// Signed block at `height` with `n_txs` random transactions.
#[must_use]
pub fn random_block(height: u64, n_txs: usize) -> Block {
    random_block_with_key(height, n_txs, &random_signing_key())
}

/// Signed block at `height` with `n_txs` random transactions, signed by `key`.
///
/// # Panics
///
/// Panics if signing fails, which cannot happen for a key that matches the
/// header's proposer.
#[must_use]
pub fn random_block_with_key(height: u64, n_txs: usize, key: &SigningKey) -> Block {
    let data = Data::new((0..n_txs).map(|_| random_tx()).collect());
    let validators = ValidatorSet::from_signing_key(key);

    let mut header = random_header(height);
    header.data_hash = data.hash();
    header.proposer_address = validators.proposer().expect("single validator").address;
    header.validator_hash = validators.hash();

    let commit = sign_header(&header, key).expect("key matches proposer");
    Block::new(SignedHeader { header, commit, validators }, data)
}

/// Block at `height` whose encoding is larger than `limit` bytes.
///
/// Adds transactions in steps of 100 until the encoded size exceeds `limit`.
#[must_use]
pub fn block_bigger_than(height: u64, limit: u64) -> Block {
    let key = random_signing_key();
    let mut n_txs = 0;
    loop {
        let block = random_block_with_key(height, n_txs, &key);
        if encoded_len(&block) > limit {
            return block;
        }
        n_txs += 100;
    }
}

/// Size of the block's DA encoding.
///
/// # Panics
///
/// Panics if the block cannot be encoded.
#[must_use]
pub fn encoded_len(block: &Block) -> u64 {
    block.encode().expect("block encodes").len() as u64
}
