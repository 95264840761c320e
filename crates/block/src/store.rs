//! State persistence.
//!
//! The block manager only needs get/put of the latest [`State`] with
//! read-your-writes consistency. Two stores are provided: an in-memory one
//! and a JSON file written atomically through a temp file and a rename.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use sequencer_types::State;
use tracing::{debug, info};

use crate::error::StoreError;

/// Port for reading and writing the chain state.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Latest persisted state, `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_state(&self) -> Result<Option<State>, StoreError>;

    /// Persist `state`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    async fn update_state(&self, state: &State) -> Result<(), StoreError>;
}

/// In-memory state store.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: RwLock<Option<State>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStateStore {
    async fn get_state(&self) -> Result<Option<State>, StoreError> {
        Ok(self.state.read().clone())
    }

    async fn update_state(&self, state: &State) -> Result<(), StoreError> {
        *self.state.write() = Some(state.clone());
        Ok(())
    }
}

/// State store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Open a store at `path`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        info!(path = %path.display(), exists = path.exists(), "State store opened");
        Ok(Self { path })
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait::async_trait]
impl StateStore for FileStateStore {
    async fn get_state(&self) -> Result<Option<State>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn update_state(&self, state: &State) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(height = state.last_block_height, da_height = state.da_height, "State persisted");
        Ok(())
    }
}
