//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Genesis parameters.
    pub genesis: GenesisConfig,

    /// Block production configuration.
    #[serde(default)]
    pub block: BlockConfig,

    /// DA submission configuration.
    #[serde(default)]
    pub da: DaConfig,

    /// State persistence configuration.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Genesis parameters.
///
/// The validator set is derived from the proposer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Chain ID.
    pub chain_id: String,

    /// Height of the first block.
    #[serde(default = "default_initial_height")]
    pub initial_height: u64,

    /// Initial application state root.
    #[serde(default)]
    pub app_hash: B256,

    /// Path to the proposer private key (hex-encoded ed25519 seed).
    pub proposer_key_path: PathBuf,
}

fn default_initial_height() -> u64 {
    1
}

/// Block production configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Block time in milliseconds.
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,

    /// Maximum number of transactions reaped into one block.
    #[serde(default = "default_max_txs_per_block")]
    pub max_txs_per_block: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            block_time_ms: default_block_time_ms(),
            max_txs_per_block: default_max_txs_per_block(),
        }
    }
}

impl BlockConfig {
    /// Block time as a duration.
    #[must_use]
    pub fn block_time(&self) -> Duration {
        Duration::from_millis(self.block_time_ms)
    }
}

fn default_block_time_ms() -> u64 {
    1000
}

fn default_max_txs_per_block() -> usize {
    1000
}

/// DA submission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaConfig {
    /// Interval between submission rounds in milliseconds.
    #[serde(default = "default_da_block_time_ms")]
    pub da_block_time_ms: u64,

    /// Gas price for submissions. Negative means the DA client's default.
    #[serde(default = "default_gas_price")]
    pub gas_price: f64,

    /// Factor applied to the gas price when a submission is not included
    /// in time. 0 disables the adjustment.
    #[serde(default)]
    pub gas_multiplier: f64,

    /// Upper bound for the backoff between failed rounds, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Maximum blob size enforced by the local DA layer, in bytes.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,

    /// DA heights scanned back from the last confirmed one when rebuilding
    /// the block cache on restart.
    #[serde(default = "default_cache_rebuild_depth")]
    pub cache_rebuild_depth: u64,
}

impl Default for DaConfig {
    fn default() -> Self {
        Self {
            da_block_time_ms: default_da_block_time_ms(),
            gas_price: default_gas_price(),
            gas_multiplier: 0.0,
            max_backoff_ms: default_max_backoff_ms(),
            max_blob_size: default_max_blob_size(),
            cache_rebuild_depth: default_cache_rebuild_depth(),
        }
    }
}

impl DaConfig {
    /// Submission interval as a duration.
    #[must_use]
    pub fn da_block_time(&self) -> Duration {
        Duration::from_millis(self.da_block_time_ms)
    }

    /// Backoff cap as a duration.
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

fn default_da_block_time_ms() -> u64 {
    6000 // Celestia-like block time
}

fn default_gas_price() -> f64 {
    -1.0
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_cache_rebuild_depth() -> u64 {
    64
}

fn default_max_blob_size() -> u64 {
    1_974_272 // 64 * 64 * 482
}

/// State persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON state file.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { state_path: default_state_path() }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error in config file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: NodeConfig = toml::from_str(
            r#"
            [genesis]
            chain_id = "test"
            proposer_key_path = "proposer.key"
            "#,
        )
        .unwrap();

        assert_eq!(config.genesis.initial_height, 1);
        assert_eq!(config.genesis.app_hash, B256::ZERO);
        assert_eq!(config.block.block_time(), Duration::from_secs(1));
        assert!(config.da.gas_price < 0.0);
        assert_eq!(config.da.max_blob_size, 1_974_272);
        assert_eq!(config.store.state_path, PathBuf::from("data/state.json"));
    }

    #[test]
    fn test_overrides() {
        let config: NodeConfig = toml::from_str(
            r#"
            [genesis]
            chain_id = "test"
            initial_height = 10
            proposer_key_path = "proposer.key"

            [da]
            da_block_time_ms = 250
            gas_price = 0.002
            gas_multiplier = 1.2
            "#,
        )
        .unwrap();

        assert_eq!(config.genesis.initial_height, 10);
        assert_eq!(config.da.da_block_time(), Duration::from_millis(250));
        assert_eq!(config.da.gas_multiplier, 1.2);
        assert_eq!(config.da.max_backoff(), Duration::from_secs(60));
        assert_eq!(config.da.cache_rebuild_depth, 64);
    }
}
