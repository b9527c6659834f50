use super::{GraphRepository, RepositoryResult};
use crate::entity::Person;
use crate::graph::GraphStore;
use crate::persistence::PersistenceManager;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Repository for [`Person`] nodes with the last-name lookup
#[derive(Clone)]
pub struct PersonRepository {
    inner: GraphRepository<Person>,
}

impl PersonRepository {
    /// Build the repository and index `Person.lastName`
    pub async fn new(
        store: Arc<RwLock<GraphStore>>,
        persistence: Option<Arc<PersistenceManager>>,
    ) -> Self {
        let inner = GraphRepository::new(store, persistence);
        if inner.ensure_index(Person::LAST_NAME).await {
            debug!("Created property index on :Person({})", Person::LAST_NAME);
        }
        Self { inner }
    }

    /// Every person whose last name equals `last_name` exactly, by ascending id.
    ///
    /// Case-sensitive. People without a last name never match.
    pub async fn find_by_last_name(&self, last_name: &str) -> RepositoryResult<Vec<Person>> {
        self.inner
            .find_by_property(Person::LAST_NAME, last_name)
            .await
    }
}

impl Deref for PersonRepository {
    type Target = GraphRepository<Person>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
