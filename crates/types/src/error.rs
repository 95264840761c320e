//! Data-model error types.

use alloy_primitives::{Address, B256};

/// Errors produced while signing a header.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The key does not belong to the header's proposer.
    #[error("signing key address {key} does not match header proposer {proposer}")]
    NotProposer {
        /// Address derived from the signing key.
        key: Address,
        /// Proposer address in the header.
        proposer: Address,
    },

    /// The signature primitive rejected the key or message.
    #[error("failed to sign header: {0}")]
    Signature(#[from] ed25519_dalek::SignatureError),

    /// Key material could not be parsed.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Errors produced while validating a signed header or block.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The validator set does not contain exactly one validator.
    #[error("expected exactly one validator, got {0}")]
    ValidatorSetSize(usize),

    /// The commit does not contain exactly one signature.
    #[error("expected exactly one commit signature, got {0}")]
    SignatureCount(usize),

    /// The validator set's proposer is not the header's proposer.
    #[error("proposer mismatch: header has {header}, validator set has {validator}")]
    ProposerMismatch {
        /// Proposer address in the header.
        header: Address,
        /// Address of the sole validator.
        validator: Address,
    },

    /// The validator's address is not derived from its public key.
    #[error("validator address {declared} does not match its public key ({derived})")]
    AddressMismatch {
        /// Address carried by the validator entry.
        declared: Address,
        /// Address derived from the validator's public key.
        derived: Address,
    },

    /// The sole validator does not carry voting power 1.
    #[error("expected proposer voting power 1, got {0}")]
    VotingPower(u64),

    /// The header does not commit to the attached validator set.
    #[error("validator hash mismatch: header has {header}, validator set hashes to {computed}")]
    ValidatorHashMismatch {
        /// Hash in the header.
        header: B256,
        /// Hash of the attached set.
        computed: B256,
    },

    /// The proposer's public key bytes are not a valid ed25519 key.
    #[error("invalid proposer public key")]
    InvalidPublicKey,

    /// The commit signature does not verify.
    #[error("invalid commit signature")]
    InvalidSignature,

    /// The header does not commit to the block body.
    #[error("data hash mismatch: header has {header}, body hashes to {computed}")]
    DataHashMismatch {
        /// Hash in the header.
        header: B256,
        /// Hash of the body.
        computed: B256,
    },
}

/// Errors from the block binary codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Failed to encode a block.
    #[error("failed to encode block: {0}")]
    Encode(String),

    /// Failed to decode a block.
    #[error("failed to decode block: {0}")]
    Decode(String),
}
