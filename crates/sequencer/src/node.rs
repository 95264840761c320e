//! Node wiring.

use std::sync::Arc;

use eyre::{Context, Result};
use sequencer_block::{FileStateStore, Manager, ManagerConfig, PassthroughExecutor};
use sequencer_da::LocalDa;
use sequencer_types::NodeConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config;

/// A running node: block manager over a file-backed state store and an
/// in-process DA layer.
pub struct Node {
    manager: Manager,
}

impl Node {
    /// Build the node from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the proposer key or state store cannot be
    /// opened, or the stored state conflicts with the genesis.
    pub async fn new(cfg: NodeConfig) -> Result<Self> {
        let key = config::load_proposer_key(&cfg.genesis.proposer_key_path)?;
        let genesis = config::genesis(&cfg.genesis, &key);

        let store = FileStateStore::open(&cfg.store.state_path)
            .await
            .wrap_err("failed to open state store")?;
        let da = LocalDa::new(cfg.da.max_blob_size);

        let manager = Manager::new(
            ManagerConfig::from_node_config(&cfg),
            &genesis,
            Arc::new(store),
            Arc::new(da),
            Arc::new(PassthroughExecutor),
            key,
        )
        .await
        .wrap_err("failed to initialize block manager")?;

        Ok(Self { manager })
    }

    /// Run until ctrl-c.
    pub async fn run(self) -> Result<()> {
        let cancel = CancellationToken::new();

        let shutdown = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            warn!("Shutdown signal received");
            shutdown.cancel();
        });

        self.manager.run(cancel).await;

        let state = self.manager.state().await;
        info!(
            last_block_height = state.last_block_height,
            da_height = state.da_height,
            pending = self.manager.pending_count(),
            "Node shutting down"
        );
        Ok(())
    }
}
