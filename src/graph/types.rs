//! Identity and label newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned node identity.
///
/// Handed out in increasing order and never reassigned, not even after the
/// node is deleted. Displays as the bare number, the same form used in
/// resource paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node label, one per entity type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_displays_as_number() {
        let id = NodeId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(NodeId::new(1) < NodeId::new(2));
    }

    #[test]
    fn test_label() {
        let label: Label = "Person".into();
        assert_eq!(label, Label::new("Person"));
        assert_eq!(label.as_str(), "Person");
    }
}
