//! Manager for property indices
//!
//! Handles creation, deletion, and access to property indices. The manager
//! is owned by the `GraphStore`, so every mutation already runs under the
//! store's write lock.

use super::property_index::PropertyIndex;
use crate::graph::{Label, NodeId, PropertyValue};
use std::collections::HashMap;

/// Key for identifying a property index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyIndexKey {
    pub label: Label,
    pub property: String,
}

impl PropertyIndexKey {
    fn new(label: &Label, property: &str) -> Self {
        Self {
            label: label.clone(),
            property: property.to_string(),
        }
    }
}

/// Manager for all property indices
#[derive(Debug, Default)]
pub struct IndexManager {
    indices: HashMap<PropertyIndexKey, PropertyIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index for a label and property.
    ///
    /// Returns `false` if the index already existed.
    pub fn create_index(&mut self, label: Label, property: String) -> bool {
        let key = PropertyIndexKey { label, property };
        if self.indices.contains_key(&key) {
            return false;
        }
        self.indices.insert(key, PropertyIndex::new());
        true
    }

    /// Update index when a node property is set
    pub fn index_insert(
        &mut self,
        label: &Label,
        property: &str,
        value: PropertyValue,
        node_id: NodeId,
    ) {
        if let Some(index) = self.indices.get_mut(&PropertyIndexKey::new(label, property)) {
            index.insert(value, node_id);
        }
    }

    /// Update index when a node property is removed (or old value replaced)
    pub fn index_remove(
        &mut self,
        label: &Label,
        property: &str,
        value: &PropertyValue,
        node_id: NodeId,
    ) {
        if let Some(index) = self.indices.get_mut(&PropertyIndexKey::new(label, property)) {
            index.remove(value, node_id);
        }
    }

    /// Check if an index exists
    pub fn has_index(&self, label: &Label, property: &str) -> bool {
        self.indices
            .contains_key(&PropertyIndexKey::new(label, property))
    }

    /// Look up node ids by exact value.
    ///
    /// `None` means there is no index for `(label, property)`, so the caller
    /// must fall back to a scan.
    pub fn lookup(
        &self,
        label: &Label,
        property: &str,
        value: &PropertyValue,
    ) -> Option<Vec<NodeId>> {
        self.indices
            .get(&PropertyIndexKey::new(label, property))
            .map(|index| index.get(value))
    }
}
