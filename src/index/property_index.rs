//! B-Tree based property index for equality lookups

use crate::graph::{NodeId, PropertyValue};
use std::collections::{BTreeMap, BTreeSet};

/// Index for a specific property on a specific label
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    /// Value -> set of NodeIds, kept sorted so lookups come back in id order
    index: BTreeMap<PropertyValue, BTreeSet<NodeId>>,
}

impl PropertyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: PropertyValue, node_id: NodeId) {
        self.index.entry(value).or_default().insert(node_id);
    }

    pub fn remove(&mut self, value: &PropertyValue, node_id: NodeId) {
        if let Some(nodes) = self.index.get_mut(value) {
            nodes.remove(&node_id);
            if nodes.is_empty() {
                self.index.remove(value);
            }
        }
    }

    /// Node ids holding exactly `value`, ascending
    pub fn get(&self, value: &PropertyValue) -> Vec<NodeId> {
        self.index
            .get(value)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }
}
