//! Block manager.
//!
//! Owns the chain tip and wires block production to the DA submission
//! pipeline: produced blocks are marked seen and appended to the pending
//! queue, submission rounds drain the queue and mark blocks DA-included.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ed25519_dalek::SigningKey;
use sequencer_da::{Backoff, DataAvailability};
use sequencer_types::primitives::B256;
use sequencer_types::{
    derive_address, sign_header, Block, BlockConfig, BlockHash, DaConfig, Data, Genesis, Header,
    NodeConfig, SignedHeader, State, Transaction,
};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bootstrap::initial_state;
use crate::cache::BlockCache;
use crate::executor::BlockExecutor;
use crate::mempool::Mempool;
use crate::pending::PendingBlocks;
use crate::store::StateStore;
use crate::submitter::{DaSubmitter, GasConfig, SubmissionRound};
use crate::{BlockError, Result, SubmitError};

/// Timing and sizing knobs of the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Interval between block production attempts.
    pub block_time: Duration,

    /// Maximum transactions reaped into one block.
    pub max_txs_per_block: usize,

    /// Interval between DA submission rounds.
    pub da_block_time: Duration,

    /// Upper bound of the delay after failed rounds.
    pub max_backoff: Duration,

    /// DA gas settings.
    pub gas: GasConfig,

    /// DA heights scanned when rebuilding the block cache at startup.
    pub cache_rebuild_depth: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::from_sections(&BlockConfig::default(), &DaConfig::default())
    }
}

impl ManagerConfig {
    /// Build from the `[block]` and `[da]` sections of the node config.
    #[must_use]
    pub fn from_node_config(config: &NodeConfig) -> Self {
        Self::from_sections(&config.block, &config.da)
    }

    fn from_sections(block: &BlockConfig, da: &DaConfig) -> Self {
        Self {
            block_time: block.block_time(),
            max_txs_per_block: block.max_txs_per_block,
            da_block_time: da.da_block_time(),
            max_backoff: da.max_backoff(),
            gas: GasConfig { gas_price: da.gas_price, gas_multiplier: da.gas_multiplier },
            cache_rebuild_depth: da.cache_rebuild_depth,
        }
    }
}

/// Single-proposer block manager.
pub struct Manager {
    config: ManagerConfig,
    store: Arc<dyn StateStore>,
    executor: Arc<dyn BlockExecutor>,
    proposer_key: SigningKey,
    is_proposer: bool,
    tip: tokio::sync::Mutex<State>,
    cache: Arc<BlockCache>,
    pending: Arc<PendingBlocks>,
    mempool: Mempool,
    submitter: DaSubmitter,
}

impl Manager {
    /// Bootstrap the starting state and build the manager.
    ///
    /// The block cache is rebuilt from the blocks found on the DA layer up to
    /// the stored DA height.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored state cannot be read or conflicts with
    /// `genesis`.
    pub async fn new(
        config: ManagerConfig,
        genesis: &Genesis,
        store: Arc<dyn StateStore>,
        da: Arc<dyn DataAvailability>,
        executor: Arc<dyn BlockExecutor>,
        proposer_key: SigningKey,
    ) -> Result<Self> {
        let state = initial_state(store.as_ref(), genesis).await?;

        let address = derive_address(&proposer_key.verifying_key());
        let is_proposer = state.validators.proposer().is_some_and(|v| v.address == address);
        if !is_proposer {
            warn!(%address, "Node key is not the chain proposer, block production disabled");
        }

        let cache = Arc::new(BlockCache::new());
        rebuild_cache(da.as_ref(), &cache, &state, config.cache_rebuild_depth).await;

        let pending = Arc::new(PendingBlocks::new());
        let submitter = DaSubmitter::new(da, Arc::clone(&cache), Arc::clone(&pending), config.gas)
            .with_da_height(state.da_height);

        info!(
            chain_id = %state.chain_id,
            next_height = state.next_height(),
            %address,
            is_proposer,
            "Block manager initialized"
        );

        Ok(Self {
            config,
            store,
            executor,
            proposer_key,
            is_proposer,
            tip: tokio::sync::Mutex::new(state),
            cache,
            pending,
            mempool: Mempool::new(),
            submitter,
        })
    }

    /// Whether this node's key is the chain's proposer.
    #[must_use]
    pub const fn is_proposer(&self) -> bool {
        self.is_proposer
    }

    /// Current chain state.
    pub async fn state(&self) -> State {
        self.tip.lock().await.clone()
    }

    /// Queue a transaction for the next block.
    pub fn submit_tx(&self, tx: Transaction) {
        self.mempool.push(tx);
    }

    /// Transactions waiting for a block.
    #[must_use]
    pub fn mempool_len(&self) -> usize {
        self.mempool.len()
    }

    /// Whether the block with `hash` was accepted by the DA layer.
    #[must_use]
    pub fn is_da_included(&self, hash: &BlockHash) -> bool {
        self.cache.is_da_included(hash)
    }

    /// Record that the block with `hash` was observed.
    pub fn mark_seen(&self, hash: BlockHash) {
        self.cache.mark_seen(hash);
    }

    /// Whether the block with `hash` was observed.
    #[must_use]
    pub fn is_seen(&self, hash: &BlockHash) -> bool {
        self.cache.is_seen(hash)
    }

    /// Blocks produced but not yet confirmed by the DA layer.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Produce, apply and persist the next block, then queue it for DA.
    ///
    /// On failure the chain tip, cache and queue are unchanged and the
    /// reaped transactions go back to the mempool.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::NotProposer`] if this node may not produce
    /// blocks, or the signing, execution or store error that stopped it.
    pub async fn produce_block(&self) -> Result<Arc<Block>> {
        if !self.is_proposer {
            return Err(BlockError::NotProposer);
        }

        let mut tip = self.tip.lock().await;
        let data = Data::new(self.mempool.reap(self.config.max_txs_per_block));
        let header = self.next_header(&tip, &data);

        let commit = match sign_header(&header, &self.proposer_key) {
            Ok(commit) => commit,
            Err(e) => return Err(self.abort(data, e)),
        };
        let validators = tip.validators.clone();
        let block = Block::new(SignedHeader { header, commit, validators }, data);

        let mut next_state = match self.executor.apply_block(&tip, &block).await {
            Ok(state) => state,
            Err(e) => return Err(self.abort(block.data, e)),
        };
        let block_hash = block.hash();
        next_state.last_header_hash = block_hash;
        next_state.last_commit_hash = block.signed_header.commit.hash();

        if let Err(e) = self.store.update_state(&next_state).await {
            return Err(self.abort(block.data, e));
        }

        let block = Arc::new(block);
        *tip = next_state;

        self.cache.mark_seen(block_hash);
        self.pending.push(Arc::clone(&block));

        info!(
            block_height = block.height(),
            %block_hash,
            tx_count = block.tx_count(),
            pending = self.pending.len(),
            "Block produced"
        );
        Ok(block)
    }

    /// Run one DA submission round and persist the DA height reached.
    ///
    /// # Errors
    ///
    /// Returns the round's [`SubmitError`], or a store error if the DA height
    /// could not be persisted.
    pub async fn submit_blocks_to_da(&self, cancel: &CancellationToken) -> Result<SubmissionRound> {
        let round = self.submitter.submit_blocks_to_da(cancel).await;
        // Partial progress moves the DA height too.
        let persisted = self.persist_da_height().await;
        let round = round?;
        persisted?;
        Ok(round)
    }

    /// Run block production and DA submission until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            block_time_ms = self.config.block_time.as_millis() as u64,
            da_block_time_ms = self.config.da_block_time.as_millis() as u64,
            "Block manager starting"
        );
        tokio::join!(self.production_loop(&cancel), self.submission_loop(&cancel));
        info!(pending = self.pending.len(), "Block manager stopped");
    }

    async fn production_loop(&self, cancel: &CancellationToken) {
        if !self.is_proposer {
            return;
        }

        let mut ticker = interval(self.config.block_time);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.produce_block().await {
                        error!(error = %e, "Block production failed");
                    }
                }
            }
        }
        debug!("Block production loop stopped");
    }

    async fn submission_loop(&self, cancel: &CancellationToken) {
        let mut ticker = interval(self.config.da_block_time);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut backoff = Backoff::with_max(self.config.max_backoff);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.submit_blocks_to_da(cancel).await {
                Ok(round) => {
                    backoff.reset();
                    if round.submitted > 0 {
                        debug!(
                            submitted = round.submitted,
                            attempts = round.attempts,
                            da_height = ?round.da_height,
                            "DA submission round complete"
                        );
                    }
                }
                Err(BlockError::Submit(SubmitError::Cancelled)) => break,
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        error = %e,
                        pending = self.pending.len(),
                        backoff_ms = delay.as_millis() as u64,
                        "DA submission round failed"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = sleep(delay) => {}
                    }
                }
            }
        }
        debug!("DA submission loop stopped");
    }

    fn next_header(&self, state: &State, data: &Data) -> Header {
        Header {
            height: state.next_height(),
            // Block times never go backwards, even if the wall clock does.
            time: unix_nanos().max(state.last_block_time.saturating_add(1)),
            chain_id: state.chain_id.clone(),
            version: state.version,
            last_header_hash: state.last_header_hash,
            last_commit_hash: state.last_commit_hash,
            data_hash: data.hash(),
            consensus_hash: B256::ZERO,
            app_hash: state.app_hash,
            last_results_hash: state.last_results_hash,
            proposer_address: derive_address(&self.proposer_key.verifying_key()),
            validator_hash: state.validators.hash(),
        }
    }

    fn abort(&self, data: Data, err: impl Into<BlockError>) -> BlockError {
        self.mempool.restore(data.txs);
        err.into()
    }

    async fn persist_da_height(&self) -> Result<()> {
        let da_height = self.submitter.last_da_height();
        let mut tip = self.tip.lock().await;
        if da_height <= tip.da_height {
            return Ok(());
        }

        let mut next = tip.clone();
        next.da_height = da_height;
        self.store.update_state(&next).await?;
        *tip = next;
        Ok(())
    }
}

/// Mark this chain's blocks found in the last `depth` DA heights up to
/// `state.da_height` as seen and DA-included.
///
/// Blobs that do not decode, fail validation or were signed by another
/// validator set are skipped. A retrieval error stops the rebuild; the cache
/// then only answers for what was restored so far.
async fn rebuild_cache(da: &dyn DataAvailability, cache: &BlockCache, state: &State, depth: u64) {
    if state.da_height == 0 || depth == 0 {
        return;
    }

    let from = state.da_height.saturating_sub(depth - 1).max(1);
    let mut restored = 0usize;
    for da_height in from..=state.da_height {
        let blobs = match da.retrieve(da_height).await {
            Ok(blobs) => blobs,
            Err(e) => {
                warn!(da_height, error = %e, "DA retrieval failed, block cache rebuild incomplete");
                break;
            }
        };

        for blob in blobs {
            let Ok(block) = Block::decode(&blob) else {
                continue;
            };
            let ours = block.header().chain_id == state.chain_id
                && block.signed_header.validators == state.validators
                && block.height() <= state.last_block_height;
            if !ours || block.validate().is_err() {
                continue;
            }

            let hash = block.hash();
            cache.mark_seen(hash);
            cache.set_da_included(hash);
            restored += 1;
        }
    }

    info!(
        from_da_height = from,
        to_da_height = state.da_height,
        restored,
        "Block cache rebuilt from DA"
    );
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use sequencer_da::LocalDa;
    use sequencer_types::test_utils::{
        genesis_with_key, random_block, random_signing_key, random_tx,
    };

    use super::*;
    use crate::error::ExecutionError;
    use crate::executor::PassthroughExecutor;
    use crate::store::MemoryStateStore;

    struct RejectingExecutor;

    #[async_trait::async_trait]
    impl BlockExecutor for RejectingExecutor {
        async fn apply_block(
            &self,
            _: &State,
            _: &Block,
        ) -> std::result::Result<State, ExecutionError> {
            Err(ExecutionError::Failed("invalid transaction".into()))
        }
    }

    struct Fixture {
        manager: Manager,
        store: Arc<MemoryStateStore>,
        da: Arc<LocalDa>,
    }

    async fn fixture_with(config: ManagerConfig, executor: Arc<dyn BlockExecutor>) -> Fixture {
        let (genesis, key) = genesis_with_key();
        let store = Arc::new(MemoryStateStore::new());
        let da = Arc::new(LocalDa::default());
        let manager =
            Manager::new(config, &genesis, store.clone(), da.clone(), executor, key).await.unwrap();
        Fixture { manager, store, da }
    }

    async fn fixture() -> Fixture {
        fixture_with(ManagerConfig::default(), Arc::new(PassthroughExecutor)).await
    }

    #[tokio::test]
    async fn test_produce_block_links_chain() {
        let f = fixture().await;
        f.manager.submit_tx(random_tx());
        f.manager.submit_tx(random_tx());

        let first = f.manager.produce_block().await.unwrap();
        let second = f.manager.produce_block().await.unwrap();

        assert_eq!(first.height(), 1);
        assert_eq!(first.tx_count(), 2);
        assert_eq!(second.height(), 2);
        assert_eq!(second.header().last_header_hash, first.hash());
        assert_eq!(second.header().last_commit_hash, first.signed_header.commit.hash());
        assert!(second.header().time > first.header().time);
        first.validate().unwrap();
        second.validate().unwrap();

        assert!(f.manager.is_seen(&first.hash()));
        assert!(!f.manager.is_da_included(&first.hash()));
        assert_eq!(f.manager.pending_count(), 2);
        assert_eq!(f.manager.mempool_len(), 0);
        assert_eq!(f.store.get_state().await.unwrap().unwrap().last_block_height, 2);
    }

    #[tokio::test]
    async fn test_produce_block_caps_transactions() {
        let config = ManagerConfig { max_txs_per_block: 2, ..ManagerConfig::default() };
        let f = fixture_with(config, Arc::new(PassthroughExecutor)).await;
        for _ in 0..5 {
            f.manager.submit_tx(random_tx());
        }

        let block = f.manager.produce_block().await.unwrap();

        assert_eq!(block.tx_count(), 2);
        assert_eq!(f.manager.mempool_len(), 3);
    }

    #[tokio::test]
    async fn test_failed_execution_leaves_tip_unchanged() {
        let f = fixture_with(ManagerConfig::default(), Arc::new(RejectingExecutor)).await;
        f.manager.submit_tx(random_tx());

        let err = f.manager.produce_block().await.unwrap_err();

        assert!(matches!(err, BlockError::Execution(_)));
        assert_eq!(f.manager.state().await.last_block_height, 0);
        assert_eq!(f.manager.pending_count(), 0);
        assert_eq!(f.manager.mempool_len(), 1);
        assert!(f.store.get_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_proposer_cannot_produce() {
        let (genesis, _) = genesis_with_key();
        let manager = Manager::new(
            ManagerConfig::default(),
            &genesis,
            Arc::new(MemoryStateStore::new()),
            Arc::new(LocalDa::default()),
            Arc::new(PassthroughExecutor),
            random_signing_key(),
        )
        .await
        .unwrap();

        assert!(!manager.is_proposer());
        assert!(matches!(manager.produce_block().await, Err(BlockError::NotProposer)));
    }

    #[tokio::test]
    async fn test_submit_persists_da_height() {
        let f = fixture().await;
        let block = f.manager.produce_block().await.unwrap();

        let round = f.manager.submit_blocks_to_da(&CancellationToken::new()).await.unwrap();

        assert_eq!(round.submitted, 1);
        assert!(f.manager.is_da_included(&block.hash()));
        assert_eq!(f.manager.pending_count(), 0);
        assert_eq!(f.manager.state().await.da_height, f.da.height());
        assert_eq!(f.store.get_state().await.unwrap().unwrap().da_height, 1);
    }

    #[tokio::test]
    async fn test_restart_resumes_chain_links_and_cache() {
        let (genesis, key) = genesis_with_key();
        let store = Arc::new(MemoryStateStore::new());
        let da = Arc::new(LocalDa::default());
        let executor: Arc<dyn BlockExecutor> = Arc::new(PassthroughExecutor);

        let manager = Manager::new(
            ManagerConfig::default(),
            &genesis,
            store.clone(),
            da.clone(),
            Arc::clone(&executor),
            key.clone(),
        )
        .await
        .unwrap();
        let first = manager.produce_block().await.unwrap();

        // A block signed by another proposer, inside the rebuilt DA range.
        let foreign = random_block(1, 1);
        da.submit(&[foreign.encode().unwrap()], None).await.unwrap();

        manager.submit_blocks_to_da(&CancellationToken::new()).await.unwrap();
        assert_eq!(store.get_state().await.unwrap().unwrap().da_height, 2);
        drop(manager);

        let restarted =
            Manager::new(ManagerConfig::default(), &genesis, store, da.clone(), executor, key)
                .await
                .unwrap();

        assert!(restarted.is_seen(&first.hash()));
        assert!(restarted.is_da_included(&first.hash()));
        assert!(!restarted.is_seen(&foreign.hash()));

        let second = restarted.produce_block().await.unwrap();
        assert_eq!(second.height(), 2);
        assert_eq!(second.header().last_header_hash, first.hash());
        assert_eq!(second.header().last_commit_hash, first.signed_header.commit.hash());

        restarted.submit_blocks_to_da(&CancellationToken::new()).await.unwrap();
        assert_eq!(restarted.state().await.da_height, da.height());
    }

    #[tokio::test]
    async fn test_run_produces_and_submits_until_cancelled() {
        let config = ManagerConfig {
            block_time: Duration::from_millis(10),
            da_block_time: Duration::from_millis(15),
            ..ManagerConfig::default()
        };
        let f = fixture_with(config, Arc::new(PassthroughExecutor)).await;
        let manager = Arc::new(f.manager);

        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let manager = Arc::clone(&manager);
            let cancel = cancel.clone();
            async move { manager.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        task.await.unwrap();

        let state = manager.state().await;
        assert!(state.last_block_height > 1);
        assert!(state.da_height > 0);
        assert!(!f.da.all_blobs().is_empty());
    }
}
