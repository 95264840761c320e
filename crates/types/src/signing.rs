//! Header signing and commit verification.
//!
//! The proposer signs the canonical vote encoding of a header with its
//! ed25519 key. A commit is valid when it holds exactly one signature that
//! verifies under the sole validator, that validator is the header's
//! proposer, and its address is derived from its public key.

use ed25519_dalek::{Signer, SigningKey, Verifier};

use crate::validator::derive_address;
use crate::{Commit, Header, SigningError, ValidationError, ValidatorSet};

/// Sign `header` with the proposer key, producing a single-signature commit.
///
/// # Errors
///
/// Returns [`SigningError::NotProposer`] if the key does not belong to the
/// header's proposer, or a signature error if signing fails.
pub fn sign_header(header: &Header, key: &SigningKey) -> Result<Commit, SigningError> {
    let key_address = derive_address(&key.verifying_key());
    if key_address != header.proposer_address {
        return Err(SigningError::NotProposer {
            key: key_address,
            proposer: header.proposer_address,
        });
    }

    let signature = key.try_sign(&header.vote_sign_bytes())?;
    Ok(Commit::single(signature.into()))
}

/// Check that `commit` is the sole proposer's valid signature over `header`.
#[must_use]
pub fn verify_commit(header: &Header, commit: &Commit, validators: &ValidatorSet) -> bool {
    check_commit(header, commit, validators).is_ok()
}

/// Detailed form of [`verify_commit`].
///
/// # Errors
///
/// Returns the first check that fails.
pub fn check_commit(
    header: &Header,
    commit: &Commit,
    validators: &ValidatorSet,
) -> Result<(), ValidationError> {
    let [proposer] = validators.validators.as_slice() else {
        return Err(ValidationError::ValidatorSetSize(validators.len()));
    };
    let [signature] = commit.signatures.as_slice() else {
        return Err(ValidationError::SignatureCount(commit.signatures.len()));
    };

    if proposer.address != header.proposer_address {
        return Err(ValidationError::ProposerMismatch {
            header: header.proposer_address,
            validator: proposer.address,
        });
    }
    if proposer.voting_power != 1 {
        return Err(ValidationError::VotingPower(proposer.voting_power));
    }

    let public_key = proposer.public_key().ok_or(ValidationError::InvalidPublicKey)?;
    let derived = derive_address(&public_key);
    if derived != proposer.address {
        return Err(ValidationError::AddressMismatch { declared: proposer.address, derived });
    }

    public_key
        .verify(&header.vote_sign_bytes(), &signature.to_ed25519())
        .map_err(|_| ValidationError::InvalidSignature)
}

/// Parse a hex-encoded 32-byte ed25519 seed (optionally `0x`-prefixed).
///
/// # Errors
///
/// Returns [`SigningError::InvalidKey`] if the input is not 32 hex bytes.
pub fn parse_signing_key(hex_seed: &str) -> Result<SigningKey, SigningError> {
    let seed: [u8; 32] =
        crate::serde_helpers::decode_fixed(hex_seed).map_err(SigningError::InvalidKey)?;
    Ok(SigningKey::from_bytes(&seed))
}
