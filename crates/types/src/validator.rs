//! Single-proposer validator set.
//!
//! The sequencer model has exactly one validator. It carries voting power 1
//! and is always the proposer, so there is no quorum arithmetic anywhere.

use alloy_primitives::{keccak256, Address, B256};
use alloy_rlp::{Encodable, RlpEncodable};
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::hex_fixed;

/// Derive the 20-byte address of an ed25519 public key.
///
/// Takes the last 20 bytes of keccak256(public_key_bytes).
#[must_use]
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let hash = keccak256(public_key.as_bytes());
    Address::from_slice(&hash[12..])
}

/// A validator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, RlpEncodable)]
pub struct Validator {
    /// Address derived from the public key.
    pub address: Address,

    /// Ed25519 public key bytes.
    #[serde(with = "hex_fixed")]
    pub pub_key: [u8; 32],

    /// Voting power. Always 1 for the sequencer.
    pub voting_power: u64,
}

impl Validator {
    /// Build the validator entry for a public key.
    #[must_use]
    pub fn new(public_key: &VerifyingKey) -> Self {
        Self {
            address: derive_address(public_key),
            pub_key: public_key.to_bytes(),
            voting_power: 1,
        }
    }

    /// Typed public key, `None` if the stored bytes are not a valid point.
    #[must_use]
    pub fn public_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::from_bytes(&self.pub_key).ok()
    }
}

/// Validator set with a single proposer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    /// Validators; the first entry is the proposer.
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Set containing only the owner of `public_key`.
    #[must_use]
    pub fn single(public_key: &VerifyingKey) -> Self {
        Self { validators: vec![Validator::new(public_key)] }
    }

    /// Set containing only the owner of `key`.
    #[must_use]
    pub fn from_signing_key(key: &SigningKey) -> Self {
        Self::single(&key.verifying_key())
    }

    /// The proposer, if the set is non-empty.
    #[must_use]
    pub fn proposer(&self) -> Option<&Validator> {
        self.validators.first()
    }

    /// Number of validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// keccak256 of the RLP-encoded validator list.
    #[must_use]
    pub fn hash(&self) -> B256 {
        let mut buf = Vec::new();
        self.validators.encode(&mut buf);
        keccak256(&buf)
    }
}
