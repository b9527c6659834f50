//! Object-graph mapping
//!
//! A [`NodeEntity`] is a plain Rust record mapped one-to-one onto a labelled
//! graph node. Attributes that are `None` are not stored, and a missing
//! property maps back to `None`.

mod person;

pub use person::Person;

use crate::graph::{Label, Node, NodeId, PropertyMap, PropertyValue};
use thiserror::Error;

/// Errors raised while mapping nodes to entities
#[derive(Error, Debug, PartialEq)]
pub enum MappingError {
    #[error("Node {id} is not a {expected}")]
    LabelMismatch { id: NodeId, expected: &'static str },

    #[error("Property '{key}' on node {id}: expected {expected}, found {found}")]
    WrongType {
        id: NodeId,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A record type stored as graph nodes carrying [`NodeEntity::LABEL`]
pub trait NodeEntity: Clone + Send + Sync + Sized + 'static {
    /// Label every node of this entity carries
    const LABEL: &'static str;

    /// Property keys this entity maps, in declaration order
    const PROPERTIES: &'static [&'static str];

    /// Identity, `None` until the entity has been saved
    fn id(&self) -> Option<NodeId>;

    /// Node properties for this entity's attributes
    fn to_properties(&self) -> PropertyMap;

    /// Rebuild the entity from a stored node
    fn from_node(node: &Node) -> Result<Self, MappingError>;

    fn label() -> Label {
        Label::new(Self::LABEL)
    }
}

/// Check that `node` carries the entity label before mapping it
pub(crate) fn expect_label<T: NodeEntity>(node: &Node) -> Result<(), MappingError> {
    if node.has_label(&T::label()) {
        Ok(())
    } else {
        Err(MappingError::LabelMismatch {
            id: node.id,
            expected: T::LABEL,
        })
    }
}

/// Read an optional string attribute; absent and null both map to `None`
pub(crate) fn string_property(node: &Node, key: &str) -> Result<Option<String>, MappingError> {
    match node.get_property(key) {
        None | Some(PropertyValue::Null) => Ok(None),
        Some(PropertyValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(MappingError::WrongType {
            id: node.id,
            key: key.to_string(),
            expected: "String",
            found: other.type_name(),
        }),
    }
}

/// Store an optional string attribute, skipping `None`
pub(crate) fn put_string(properties: &mut PropertyMap, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        properties.insert(key.to_string(), PropertyValue::String(value.clone()));
    }
}
