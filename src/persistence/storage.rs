//! RocksDB storage layer implementation
//!
//! Nodes live in the `nodes` column family keyed by their big-endian id, so a
//! forward scan returns them in ascending id order. The `meta` column family
//! holds the id allocation counter.

use crate::graph::{Label, Node, NodeId, PropertyMap};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const CF_NODES: &str = "nodes";
const CF_META: &str = "meta";
const NEXT_NODE_ID_KEY: &[u8] = b"next_node_id";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// Stored value has an unexpected shape
    #[error("Corrupt value for key {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Serialized node for storage
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredNode {
    id: u64,
    labels: Vec<String>,
    properties: PropertyMap,
    created_at: i64,
    updated_at: i64,
}

impl From<&Node> for StoredNode {
    fn from(node: &Node) -> Self {
        let mut labels: Vec<String> = node.labels.iter().map(|l| l.as_str().to_string()).collect();
        labels.sort();

        StoredNode {
            id: node.id.as_u64(),
            labels,
            properties: node.properties.clone(),
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

impl From<StoredNode> for Node {
    fn from(stored: StoredNode) -> Self {
        Node {
            id: NodeId::new(stored.id),
            labels: stored.labels.into_iter().map(Label::new).collect(),
            properties: stored.properties,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// RocksDB-based persistent storage
pub struct PersistentStorage {
    /// RocksDB instance
    db: DB,
}

impl PersistentStorage {
    /// Open or create a new persistent storage
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        info!("Opening persistent storage at: {}", path.display());

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_NODES, Self::node_cf_options()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        info!("Persistent storage opened successfully");

        Ok(Self { db })
    }

    /// Column family options for nodes
    fn node_cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf(&self, name: &str) -> StorageResult<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamily(name.to_string()))
    }

    /// Store a node together with the id counter in one atomic write
    pub fn put_node_with_next_id(&self, node: &Node, next_id: u64) -> StorageResult<()> {
        let nodes = self.cf(CF_NODES)?;
        let meta = self.cf(CF_META)?;
        let value = bincode::serialize(&StoredNode::from(node))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&nodes, Self::node_key(node.id.as_u64()), value);
        batch.put_cf(&meta, NEXT_NODE_ID_KEY, next_id.to_be_bytes());
        self.db.write(batch)?;

        debug!("Stored node {} (next id {})", node.id, next_id);

        Ok(())
    }

    /// Get a node
    pub fn get_node(&self, node_id: u64) -> StorageResult<Option<Node>> {
        let cf = self.cf(CF_NODES)?;

        match self.db.get_cf(&cf, Self::node_key(node_id))? {
            Some(value) => {
                let stored: StoredNode = bincode::deserialize(&value)?;
                Ok(Some(stored.into()))
            }
            None => Ok(None),
        }
    }

    /// Delete a node
    pub fn delete_node(&self, node_id: u64) -> StorageResult<()> {
        let cf = self.cf(CF_NODES)?;

        self.db.delete_cf(&cf, Self::node_key(node_id))?;

        debug!("Deleted node {}", node_id);

        Ok(())
    }

    /// Get all nodes (for recovery), by ascending id
    pub fn scan_nodes(&self) -> StorageResult<Vec<Node>> {
        let cf = self.cf(CF_NODES)?;
        let mut nodes = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let stored: StoredNode = bincode::deserialize(&value)?;
            nodes.push(stored.into());
        }

        Ok(nodes)
    }

    /// Read the id allocation counter, if one was ever written
    pub fn get_next_id(&self) -> StorageResult<Option<u64>> {
        let cf = self.cf(CF_META)?;

        match self.db.get_cf(&cf, NEXT_NODE_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::Corrupt(String::from_utf8_lossy(NEXT_NODE_ID_KEY).into_owned())
                })?;
                Ok(Some(u64::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    /// Flush all data to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        debug!("Flushed storage to disk");
        Ok(())
    }

    /// Create node key; big-endian so byte order matches id order
    fn node_key(node_id: u64) -> [u8; 8] {
        node_id.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PropertyValue;
    use tempfile::TempDir;

    fn person(id: u64) -> Node {
        Node::new(NodeId::new(id), "Person")
    }

    #[test]
    fn test_put_get_node() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        let mut props = PropertyMap::new();
        props.insert("firstName".to_string(), "Frodo".into());
        let node = Node::new_with_properties(NodeId::new(1), vec![Label::new("Person")], props);

        storage.put_node_with_next_id(&node, 2).unwrap();

        let retrieved = storage.get_node(1).unwrap().unwrap();
        assert_eq!(retrieved.id, NodeId::new(1));
        assert!(retrieved.has_label(&Label::new("Person")));
        assert_eq!(
            retrieved.get_property("firstName"),
            Some(&PropertyValue::from("Frodo"))
        );
        assert_eq!(retrieved.created_at, node.created_at);
    }

    #[test]
    fn test_delete_node() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        storage.put_node_with_next_id(&person(3), 4).unwrap();
        storage.delete_node(3).unwrap();

        assert!(storage.get_node(3).unwrap().is_none());
    }

    #[test]
    fn test_scan_nodes_in_id_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        for i in [300u64, 2, 256, 1] {
            storage.put_node_with_next_id(&person(i), 301).unwrap();
        }

        let ids: Vec<u64> = storage
            .scan_nodes()
            .unwrap()
            .iter()
            .map(|n| n.id.as_u64())
            .collect();
        assert_eq!(ids, vec![1, 2, 256, 300]);
    }

    #[test]
    fn test_next_id_written_with_node() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        assert_eq!(storage.get_next_id().unwrap(), None);

        storage.put_node_with_next_id(&person(7), 8).unwrap();
        assert_eq!(storage.get_next_id().unwrap(), Some(8));
        assert!(storage.get_node(7).unwrap().is_some());

        // Deleting a node leaves the counter alone
        storage.delete_node(7).unwrap();
        assert_eq!(storage.get_next_id().unwrap(), Some(8));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();

        {
            let storage = PersistentStorage::open(temp_dir.path()).unwrap();
            storage.put_node_with_next_id(&person(1), 2).unwrap();
            storage.flush().unwrap();
        }

        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        assert_eq!(storage.scan_nodes().unwrap().len(), 1);
        assert_eq!(storage.get_next_id().unwrap(), Some(2));
    }
}
