//! Property value types for graph nodes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property value stored on a node
///
/// Values are totally ordered (variant first, then value) so they can key the
/// B-tree property indices. Comparison of strings is byte-wise, which makes
/// index lookups case-sensitive. `Integer` is kept so a node written by
/// another client still decodes and is reported as a type mismatch on mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Integer(i64),
    String(String),
}

impl PropertyValue {
    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Null => "Null",
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

/// Property map for storing node properties
pub type PropertyMap = HashMap<String, PropertyValue>;
