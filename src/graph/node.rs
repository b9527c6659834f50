//! Node implementation for the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node in the property graph
///
/// Nodes have:
/// - A unique ID
/// - One or more labels
/// - Properties (key-value pairs)
/// - Creation and update timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Set of labels for this node
    pub labels: HashSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with a single label
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        Self::new_with_properties(id, vec![label.into()], PropertyMap::new())
    }

    /// Create a new node with labels and properties
    pub fn new_with_properties(id: NodeId, labels: Vec<Label>, properties: PropertyMap) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Node {
            id,
            labels: labels.into_iter().collect(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Replace the whole property map, returning the previous one
    pub fn replace_properties(&mut self, properties: PropertyMap) -> PropertyMap {
        let old = std::mem::replace(&mut self.properties, properties);
        self.touch();
        old
    }

    /// Update the modification timestamp
    fn touch(&mut self) {
        // Millisecond clock can repeat within one request; keep updated_at monotonic.
        self.updated_at = chrono::Utc::now()
            .timestamp_millis()
            .max(self.updated_at + 1);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
