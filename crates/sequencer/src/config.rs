//! Configuration loading and validation.

use std::path::Path;

use ed25519_dalek::SigningKey;
use eyre::{Context, Result};
use sequencer_types::primitives::B256;
use sequencer_types::signing::parse_signing_key;
use sequencer_types::{
    BlockConfig, DaConfig, Genesis, GenesisConfig, NodeConfig, StoreConfig, ValidatorSet,
};

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails
/// validation.
pub fn load(path: &Path) -> Result<NodeConfig> {
    let config = NodeConfig::load(path)
        .wrap_err_with(|| format!("failed to load configuration from {}", path.display()))?;
    validate(&config)?;
    Ok(config)
}

/// Validate the configuration.
///
/// # Errors
///
/// Returns an error if validation fails.
pub fn validate(config: &NodeConfig) -> Result<()> {
    if config.genesis.chain_id.is_empty() {
        eyre::bail!("genesis chain_id is required");
    }

    if config.block.block_time_ms == 0 {
        eyre::bail!("block_time_ms must be non-zero");
    }

    if config.block.max_txs_per_block == 0 {
        eyre::bail!("max_txs_per_block must be non-zero");
    }

    if config.da.da_block_time_ms == 0 {
        eyre::bail!("da_block_time_ms must be non-zero");
    }

    if config.da.max_blob_size == 0 {
        eyre::bail!("max_blob_size must be non-zero");
    }

    if config.da.gas_multiplier < 0.0 {
        eyre::bail!("gas_multiplier must not be negative");
    }

    Ok(())
}

/// Generate a default configuration.
#[must_use]
pub fn default_config() -> NodeConfig {
    NodeConfig {
        genesis: GenesisConfig {
            chain_id: "rollup-1".to_string(),
            initial_height: 1,
            app_hash: B256::ZERO,
            proposer_key_path: "proposer.key".into(),
        },
        block: BlockConfig::default(),
        da: DaConfig::default(),
        store: StoreConfig::default(),
    }
}

/// Read the proposer key (hex-encoded ed25519 seed).
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no valid seed.
pub fn load_proposer_key(path: &Path) -> Result<SigningKey> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read proposer key: {}", path.display()))?;
    parse_signing_key(&contents)
        .wrap_err_with(|| format!("invalid proposer key in {}", path.display()))
}

/// Genesis with the proposer key as the single validator.
#[must_use]
pub fn genesis(config: &GenesisConfig, proposer: &SigningKey) -> Genesis {
    Genesis {
        chain_id: config.chain_id.clone(),
        initial_height: config.initial_height,
        app_hash: config.app_hash,
        validators: ValidatorSet::from_signing_key(proposer),
    }
}
