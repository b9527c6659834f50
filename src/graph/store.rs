//! In-memory graph storage implementation
//!
//! The store is the authoritative in-process copy of the graph. Persistence
//! mirrors every mutation to disk and rebuilds the store on startup through
//! [`GraphStore::insert_recovered_node`].

use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use crate::index::IndexManager;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph storage
///
/// - nodes: NodeId -> Node, ordered so iteration is by ascending id
/// - label_index: Label -> NodeIds (index for fast label lookups)
/// - property_index: (Label, property) -> value -> NodeIds
#[derive(Debug)]
pub struct GraphStore {
    /// Node storage
    nodes: BTreeMap<NodeId, Node>,

    /// Label index for fast lookups
    label_index: HashMap<Label, BTreeSet<NodeId>>,

    /// Property indices manager
    property_index: IndexManager,

    /// Next node ID; ids are handed out monotonically and never reused
    next_node_id: u64,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: BTreeMap::new(),
            label_index: HashMap::new(),
            property_index: IndexManager::new(),
            next_node_id: 1,
        }
    }

    /// Create a node with auto-generated ID and single label
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        self.create_node_with_properties(vec![label.into()], PropertyMap::new())
    }

    /// Create a node with labels and properties
    pub fn create_node_with_properties(
        &mut self,
        labels: Vec<Label>,
        properties: PropertyMap,
    ) -> NodeId {
        let node_id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;

        let node = Node::new_with_properties(node_id, labels, properties);
        self.index_node(&node);
        self.nodes.insert(node_id, node);

        node_id
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Replace all properties of a node, keeping property indices in sync
    pub fn replace_node_properties(
        &mut self,
        id: NodeId,
        properties: PropertyMap,
    ) -> GraphResult<&Node> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;

        for label in &node.labels {
            for (key, value) in &node.properties {
                self.property_index.index_remove(label, key, value, id);
            }
        }

        node.replace_properties(properties);

        for label in &node.labels {
            for (key, value) in &node.properties {
                self.property_index
                    .index_insert(label, key, value.clone(), id);
            }
        }

        Ok(node)
    }

    /// Delete a node, returning it
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<Node> {
        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;

        for label in &node.labels {
            if let Some(ids) = self.label_index.get_mut(label) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.label_index.remove(label);
                }
            }
            for (key, value) in &node.properties {
                self.property_index.index_remove(label, key, value, id);
            }
        }

        Ok(node)
    }

    /// Get all nodes with a specific label, by ascending id
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|node_ids| {
                node_ids
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find nodes with `label` whose property `key` equals `value` exactly.
    ///
    /// Served from the property index when one exists for `(label, key)`,
    /// otherwise by scanning the label. Results are by ascending id either way.
    pub fn find_nodes_by_property(
        &self,
        label: &Label,
        key: &str,
        value: &PropertyValue,
    ) -> Vec<&Node> {
        match self.property_index.lookup(label, key, value) {
            Some(ids) => ids.iter().filter_map(|id| self.nodes.get(id)).collect(),
            None => self
                .get_nodes_by_label(label)
                .into_iter()
                .filter(|node| node.get_property(key) == Some(value))
                .collect(),
        }
    }

    /// Create a property index and back-fill it from existing nodes.
    ///
    /// Returns `false` if the index already existed.
    pub fn create_property_index(&mut self, label: &Label, key: &str) -> bool {
        if !self
            .property_index
            .create_index(label.clone(), key.to_string())
        {
            return false;
        }

        if let Some(ids) = self.label_index.get(label) {
            for id in ids {
                if let Some(value) = self.nodes.get(id).and_then(|n| n.get_property(key)) {
                    self.property_index
                        .index_insert(label, key, value.clone(), *id);
                }
            }
        }

        true
    }

    /// Check whether a property index exists
    pub fn has_property_index(&self, label: &Label, key: &str) -> bool {
        self.property_index.has_index(label, key)
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes carrying `label`
    pub fn count_by_label(&self, label: &Label) -> usize {
        self.label_index.get(label).map_or(0, BTreeSet::len)
    }

    /// The id the next created node will receive
    pub fn next_node_id(&self) -> u64 {
        self.next_node_id
    }

    /// Make sure no id below `next` is handed out again
    pub fn reserve_ids_from(&mut self, next: u64) {
        self.next_node_id = self.next_node_id.max(next);
    }

    /// Insert a recovered node (used during recovery from persistence)
    /// Unlike create_node(), this preserves the node's existing ID
    pub fn insert_recovered_node(&mut self, node: Node) -> GraphResult<()> {
        let node_id = node.id;
        if self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeAlreadyExists(node_id));
        }

        self.index_node(&node);
        self.nodes.insert(node_id, node);

        self.reserve_ids_from(node_id.as_u64() + 1);
        Ok(())
    }

    fn index_node(&mut self, node: &Node) {
        for label in &node.labels {
            self.label_index
                .entry(label.clone())
                .or_default()
                .insert(node.id);
            for (key, value) in &node.properties {
                self.property_index
                    .index_insert(label, key, value.clone(), node.id);
            }
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
