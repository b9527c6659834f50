//! People Graph
//!
//! An embedded property-graph store of `Person` nodes exposed through a
//! hypermedia REST API.
//!
//! # Layers
//!
//! - [`graph`]: in-memory nodes with labels, properties and a label index
//! - [`index`]: property indices backing exact-match lookups
//! - [`persistence`]: RocksDB storage, recovery on startup, clean shutdown
//! - [`entity`]: mapping between record types and graph nodes
//! - [`repository`]: CRUD, paging and the `find_by_last_name` derived query
//! - [`http`]: the axum router serving `/people`
//!
//! ## Example Usage
//!
//! ```rust
//! use people_graph::{GraphStore, Person, PersonRepository};
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(RwLock::new(GraphStore::new()));
//! let people = PersonRepository::new(store, None).await;
//!
//! people.save(Person::new("Frodo", "Baggins")).await.unwrap();
//! people.save(Person::new("Bilbo", "Baggins")).await.unwrap();
//!
//! let bagginses = people.find_by_last_name("Baggins").await.unwrap();
//! assert_eq!(bagginses.len(), 2);
//! # });
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod entity;
pub mod graph;
pub mod http;
pub mod index;
pub mod persistence;
pub mod repository;

// Re-export main types for convenience
pub use config::{Config, ConfigError, ServerConfig, StorageConfig};
pub use entity::{MappingError, NodeEntity, Person};
pub use graph::{
    GraphError, GraphResult, GraphStore, Label, Node, NodeId, PropertyMap, PropertyValue,
};
pub use http::{router, ApiError, AppState, HttpServer};
pub use persistence::{
    PersistenceError, PersistenceManager, PersistenceResult, PersistentStorage, StorageError,
    StorageResult,
};
pub use repository::{
    GraphRepository, Page, PageRequest, PersonRepository, RepositoryError, RepositoryResult, Sort,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
