//! Persistence layer
//!
//! The embedded on-disk database behind the graph store: opened at a path,
//! created when missing, replayed into a [`GraphStore`] on startup, and shut
//! down (flushed) on process exit.

pub mod storage;

pub use storage::{PersistentStorage, StorageError, StorageResult};

use crate::graph::{GraphError, GraphStore, Node, NodeId};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Persistence manager owning the embedded storage
pub struct PersistenceManager {
    /// Base path for all data
    base_path: PathBuf,
    /// RocksDB storage
    storage: PersistentStorage,
    /// Set once `shutdown` has run; later writes are refused
    closed: AtomicBool,
}

impl PersistenceManager {
    /// Open (or create) the database at `base_path`
    pub fn open(base_path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        std::fs::create_dir_all(&base_path)?;

        info!("Initializing persistence manager at: {:?}", base_path);

        let storage = PersistentStorage::open(&base_path)?;

        Ok(Self {
            base_path,
            storage,
            closed: AtomicBool::new(false),
        })
    }

    /// Path the database lives at
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Persist a created or updated node.
    ///
    /// `next_id` is the store's allocation counter after the write, stored in
    /// the same batch so ids stay unique across restarts.
    pub fn persist_node(&self, node: &Node, next_id: u64) -> PersistenceResult<()> {
        self.ensure_open()?;
        self.storage.put_node_with_next_id(node, next_id)?;
        Ok(())
    }

    /// Persist a node deletion
    pub fn persist_delete_node(&self, node_id: NodeId) -> PersistenceResult<()> {
        self.ensure_open()?;
        self.storage.delete_node(node_id.as_u64())?;
        Ok(())
    }

    /// Load every stored node into `store` and restore its id counter.
    ///
    /// Returns the number of recovered nodes.
    pub fn recover_into(&self, store: &mut GraphStore) -> PersistenceResult<usize> {
        info!("Starting recovery from {:?}", self.base_path);

        let nodes = self.storage.scan_nodes()?;
        let count = nodes.len();
        for node in nodes {
            store.insert_recovered_node(node)?;
        }

        if let Some(next_id) = self.storage.get_next_id()? {
            store.reserve_ids_from(next_id);
        }

        info!(
            "Recovered {} nodes from storage (next id {})",
            count,
            store.next_node_id()
        );

        Ok(count)
    }

    /// Flush all pending writes
    pub fn flush(&self) -> PersistenceResult<()> {
        self.storage.flush()?;
        Ok(())
    }

    /// Flush and refuse further writes. Safe to call more than once.
    pub fn shutdown(&self) -> PersistenceResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.storage.flush()?;
        info!("Persistent storage at {:?} shut down", self.base_path);
        Ok(())
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Get storage reference
    pub fn storage(&self) -> &PersistentStorage {
        &self.storage
    }

    fn ensure_open(&self) -> PersistenceResult<()> {
        if self.is_closed() {
            return Err(PersistenceError::Closed);
        }
        Ok(())
    }
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Graph error during recovery: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persistent storage has been shut down")]
    Closed,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
