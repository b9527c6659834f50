//! Property indexing
//!
//! B-Tree indices keyed by `(label, property)` that back exact-match
//! lookups such as the repository's derived queries.

pub mod manager;
pub mod property_index;

pub use manager::{IndexManager, PropertyIndexKey};
pub use property_index::PropertyIndex;
