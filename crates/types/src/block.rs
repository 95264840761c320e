//! Block types.

use alloy_primitives::{keccak256, Address, B256};
use alloy_rlp::{Encodable, RlpEncodable};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::hex_fixed;
use crate::signing::check_commit;
use crate::{CodecError, Data, ValidationError, ValidatorSet};

/// Hash of a block (the hash of its header).
pub type BlockHash = B256;

/// Vote type tag used in the canonical vote encoding.
pub const PRECOMMIT_VOTE: u8 = 2;

/// Block and application protocol versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, RlpEncodable)]
pub struct Version {
    /// Block protocol version.
    pub block: u64,

    /// Application protocol version.
    pub app: u64,
}

/// Version every chain starts with.
pub const INIT_STATE_VERSION: Version = Version { block: 1, app: 0 };

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, RlpEncodable)]
pub struct Header {
    /// Block height, strictly increasing per chain.
    pub height: u64,

    /// Block time (unix nanoseconds).
    pub time: u64,

    /// Chain identifier.
    pub chain_id: String,

    /// Protocol versions.
    pub version: Version,

    /// Hash of the previous header.
    pub last_header_hash: B256,

    /// Hash of the previous block's commit.
    pub last_commit_hash: B256,

    /// Hash of the block body. Must equal `Data::hash()`.
    pub data_hash: B256,

    /// Hash of the consensus parameters.
    pub consensus_hash: B256,

    /// Application state root after the previous block.
    pub app_hash: B256,

    /// Root of the previous block's execution results.
    pub last_results_hash: B256,

    /// Address of the proposer that signed this header.
    pub proposer_address: Address,

    /// Hash of the validator set.
    pub validator_hash: B256,
}

/// Vote fields signed by the proposer.
#[derive(RlpEncodable)]
struct CanonicalVote {
    vote_type: u8,
    height: u64,
    round: u64,
    block_hash: B256,
    timestamp: u64,
    chain_id: String,
    validator_address: Address,
}

impl Header {
    /// Header hash: keccak256 of the RLP-encoded header.
    #[must_use]
    pub fn hash(&self) -> BlockHash {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        keccak256(&buf)
    }

    /// Canonical vote encoding that the proposer signs.
    ///
    /// A precommit for round 0 naming this header's hash, time, chain and
    /// proposer. Deterministic for a given header.
    #[must_use]
    pub fn vote_sign_bytes(&self) -> Vec<u8> {
        let vote = CanonicalVote {
            vote_type: PRECOMMIT_VOTE,
            height: self.height,
            round: 0,
            block_hash: self.hash(),
            timestamp: self.time,
            chain_id: self.chain_id.clone(),
            validator_address: self.proposer_address,
        };
        let mut buf = Vec::new();
        vote.encode(&mut buf);
        buf
    }
}

/// Ed25519 signature bytes.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex_fixed")] pub [u8; 64]);

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(signature: ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes())
    }
}

impl Signature {
    /// Typed ed25519 signature.
    #[must_use]
    pub fn to_ed25519(&self) -> ed25519_dalek::Signature {
        ed25519_dalek::Signature::from_bytes(&self.0)
    }
}

/// Proposer attestation over a header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Signatures; exactly one in the sequencer model.
    pub signatures: Vec<Signature>,
}

impl Commit {
    /// Commit carrying a single signature.
    #[must_use]
    pub fn single(signature: Signature) -> Self {
        Self { signatures: vec![signature] }
    }

    /// keccak256 of the RLP list of signatures.
    ///
    /// Linked into the next header as `last_commit_hash`.
    #[must_use]
    pub fn hash(&self) -> B256 {
        let sigs: Vec<&[u8]> = self.signatures.iter().map(|s| s.0.as_slice()).collect();
        let mut buf = Vec::new();
        alloy_rlp::encode_list::<_, [u8]>(&sigs, &mut buf);
        keccak256(&buf)
    }
}

/// Header together with its commit and the validator set that signed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    /// The header.
    pub header: Header,

    /// Proposer commit over the header.
    pub commit: Commit,

    /// Validator set (single proposer).
    pub validators: ValidatorSet,
}

impl SignedHeader {
    /// Verify the commit and the header's binding to the validator set.
    ///
    /// # Errors
    ///
    /// Returns the first check that fails.
    pub fn verify(&self) -> Result<(), ValidationError> {
        let computed = self.validators.hash();
        if computed != self.header.validator_hash {
            return Err(ValidationError::ValidatorHashMismatch {
                header: self.header.validator_hash,
                computed,
            });
        }
        check_commit(&self.header, &self.commit, &self.validators)
    }
}

/// A complete block: signed header and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Signed header.
    pub signed_header: SignedHeader,

    /// Block body.
    pub data: Data,
}

impl Block {
    /// Create a new block.
    #[must_use]
    pub fn new(signed_header: SignedHeader, data: Data) -> Self {
        Self { signed_header, data }
    }

    /// Block identity: the header hash.
    ///
    /// Performs RLP encoding and a hash on each call.
    #[must_use]
    pub fn hash(&self) -> BlockHash {
        self.signed_header.header.hash()
    }

    /// Block header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.signed_header.header
    }

    /// Block height.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.signed_header.header.height
    }

    /// Number of transactions in this block.
    #[must_use]
    pub fn tx_count(&self) -> usize {
        self.data.len()
    }

    /// Full validation for a block received from elsewhere.
    ///
    /// # Errors
    ///
    /// Fails if the signed header does not verify or the header does not
    /// commit to the body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.signed_header.verify()?;
        let computed = self.data.hash();
        if computed != self.signed_header.header.data_hash {
            return Err(ValidationError::DataHashMismatch {
                header: self.signed_header.header.data_hash,
                computed,
            });
        }
        Ok(())
    }

    /// Encode the block as DA blob bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode a block from blob bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid block encoding.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{random_block, random_header, signing_key};
    use crate::Transaction;

    #[test]
    fn test_block_encoding_roundtrip() {
        let block = random_block(42, 3);

        let encoded = block.encode().unwrap();
        let decoded = Block::decode(&encoded).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.hash(), block.hash());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let block = random_block(1, 5);
        assert_eq!(block.encode().unwrap(), block.encode().unwrap());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(Block::decode(&[1, 2, 3]), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_header_hash_changes_with_fields() {
        let header = random_header(10);
        let mut other = header.clone();
        other.height += 1;
        assert_ne!(header.hash(), other.hash());
        assert_ne!(header.vote_sign_bytes(), other.vote_sign_bytes());
    }

    #[test]
    fn test_validate_accepts_produced_block() {
        let block = random_block(5, 2);
        block.validate().unwrap();
        assert_eq!(block.tx_count(), 2);
    }

    #[test]
    fn test_validate_rejects_foreign_body() {
        let mut block = random_block(5, 2);
        block.data.txs.push(Transaction::new(vec![0xff; 8]));

        assert!(matches!(block.validate(), Err(ValidationError::DataHashMismatch { .. })));
    }

    #[test]
    fn test_validate_rejects_swapped_validator_set() {
        let mut block = random_block(5, 1);
        block.signed_header.validators = ValidatorSet::from_signing_key(&signing_key(99));

        assert!(matches!(
            block.validate(),
            Err(ValidationError::ValidatorHashMismatch { .. })
        ));
    }

    #[test]
    fn test_commit_hash_depends_on_signature() {
        let a = Commit::single(Signature([1; 64]));
        let b = Commit::single(Signature([2; 64]));
        assert_ne!(a.hash(), b.hash());
    }
}
