//! Command-line interface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use eyre::{Context, Result};
use rand::RngCore;
use sequencer_types::derive_address;
use tracing::info;

use crate::config;
use crate::node::Node;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Single-proposer rollup node.
#[derive(Parser)]
#[command(name = "sequencer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the node.
    Run {
        /// Path to configuration file.
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Log level (trace, debug, info, warn, error).
        #[arg(short, long, default_value = DEFAULT_LOG_LEVEL)]
        log_level: String,
    },

    /// Initialize a new configuration file.
    Init {
        /// Output path for the config file.
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },

    /// Generate a new proposer key.
    Keygen {
        /// Output path for the key file.
        #[arg(short, long, default_value = "proposer.key")]
        output: PathBuf,
    },
}

impl Cli {
    /// Default log filter for the selected command.
    pub fn log_level(&self) -> &str {
        match &self.command {
            Some(Commands::Run { log_level, .. }) => log_level,
            _ => DEFAULT_LOG_LEVEL,
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Run { config, .. }) => Self::run_node(&config).await,
            Some(Commands::Init { output }) => Self::init_config(&output),
            Some(Commands::Keygen { output }) => Self::generate_key(&output).map(|_| ()),
            None => Self::run_node(Path::new("config.toml")).await,
        }
    }

    async fn run_node(config: &Path) -> Result<()> {
        info!(config = %config.display(), "Loading configuration");

        let cfg = config::load(config)?;
        let node = Node::new(cfg).await?;
        node.run().await
    }

    fn init_config(output: &Path) -> Result<()> {
        info!(path = %output.display(), "Generating default configuration");

        let cfg = config::default_config();
        let toml_str = toml::to_string_pretty(&cfg)?;
        std::fs::write(output, toml_str)
            .wrap_err_with(|| format!("failed to write {}", output.display()))?;

        info!("Configuration written");
        Ok(())
    }

    fn generate_key(output: &Path) -> Result<SigningKey> {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);

        std::fs::write(output, hex::encode(seed))
            .wrap_err_with(|| format!("failed to write {}", output.display()))?;

        let key = SigningKey::from_bytes(&seed);
        let address = derive_address(&key.verifying_key());
        info!(path = %output.display(), %address, "Ed25519 proposer key generated");
        println!("{address}");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposer.key");

        let key = Cli::generate_key(&path).unwrap();
        let loaded = config::load_proposer_key(&path).unwrap();

        assert_eq!(key.to_bytes(), loaded.to_bytes());
    }

    #[test]
    fn test_run_log_level() {
        let cli = Cli::parse_from(["sequencer", "run", "--log-level", "debug"]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["sequencer", "keygen"]);
        assert_eq!(cli.log_level(), "info");
    }
}
