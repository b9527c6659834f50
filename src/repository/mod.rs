//! Repositories over the graph store
//!
//! [`GraphRepository`] gives CRUD, paging and property lookups for any
//! [`NodeEntity`](crate::entity::NodeEntity). [`PersonRepository`] adds the
//! derived `find_by_last_name` query on top.

pub mod graph;
pub mod page;
pub mod person;

pub use graph::GraphRepository;
pub use page::{Direction, Page, PageRequest, Sort};
pub use person::PersonRepository;

use crate::entity::MappingError;
use crate::graph::{GraphError, NodeId};
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("No entity with id {0}")]
    NotFound(NodeId),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Page size must be at least 1")]
    InvalidPageSize,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
