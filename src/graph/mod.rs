//! Core graph implementation
//!
//! This module implements the property graph data model with:
//! - Nodes with labels and properties
//! - In-memory storage with label and property indices

pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{Label, NodeId};
