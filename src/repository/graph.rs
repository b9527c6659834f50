//! Generic node repository

use super::page::{Direction, Page, PageRequest, Sort};
use super::{RepositoryError, RepositoryResult};
use crate::entity::NodeEntity;
use crate::graph::{GraphError, GraphStore, Node, NodeId, PropertyValue};
use crate::persistence::PersistenceManager;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// CRUD access to one entity type stored in a shared [`GraphStore`].
///
/// Every write goes to the in-memory store and, when persistence is enabled,
/// to disk before the call returns. A failed disk write rolls the in-memory
/// change back.
pub struct GraphRepository<T: NodeEntity> {
    store: Arc<RwLock<GraphStore>>,
    persistence: Option<Arc<PersistenceManager>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: NodeEntity> Clone for GraphRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            persistence: self.persistence.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: NodeEntity> GraphRepository<T> {
    pub fn new(
        store: Arc<RwLock<GraphStore>>,
        persistence: Option<Arc<PersistenceManager>>,
    ) -> Self {
        Self {
            store,
            persistence,
            _entity: PhantomData,
        }
    }

    /// Shared store handle
    pub fn store(&self) -> &Arc<RwLock<GraphStore>> {
        &self.store
    }

    /// Whether writes reach disk
    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Insert the entity when it has no id yet, otherwise update the stored node
    pub async fn save(&self, entity: T) -> RepositoryResult<T> {
        match entity.id() {
            None => self.insert(entity).await,
            Some(id) => self.update(id, entity).await,
        }
    }

    async fn insert(&self, entity: T) -> RepositoryResult<T> {
        let mut store = self.store.write().await;
        let id = store.create_node_with_properties(vec![T::label()], entity.to_properties());
        let node = store
            .get_node(id)
            .cloned()
            .ok_or(GraphError::NodeNotFound(id))?;

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.persist_node(&node, store.next_node_id()) {
                warn!("Rolling back create of {}: {}", id, e);
                store.delete_node(id)?;
                return Err(e.into());
            }
        }

        debug!("Created {} {}", T::LABEL, id);
        Ok(T::from_node(&node)?)
    }

    async fn update(&self, id: NodeId, entity: T) -> RepositoryResult<T> {
        let mut store = self.store.write().await;
        let previous = Self::owned_node(&store, id)?.properties.clone();

        let node = store
            .replace_node_properties(id, entity.to_properties())?
            .clone();

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.persist_node(&node, store.next_node_id()) {
                warn!("Rolling back update of {}: {}", id, e);
                store.replace_node_properties(id, previous)?;
                return Err(e.into());
            }
        }

        debug!("Updated {} {}", T::LABEL, id);
        Ok(T::from_node(&node)?)
    }

    pub async fn find_by_id(&self, id: NodeId) -> RepositoryResult<Option<T>> {
        let store = self.store.read().await;
        match store.get_node(id) {
            Some(node) if node.has_label(&T::label()) => Ok(Some(T::from_node(node)?)),
            _ => Ok(None),
        }
    }

    pub async fn exists_by_id(&self, id: NodeId) -> bool {
        let store = self.store.read().await;
        store
            .get_node(id)
            .is_some_and(|node| node.has_label(&T::label()))
    }

    /// All entities, by ascending id
    pub async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        let store = self.store.read().await;
        Self::map_nodes(store.get_nodes_by_label(&T::label()))
    }

    /// One page of entities, optionally sorted on `id` or a mapped property
    pub async fn find_page(&self, request: &PageRequest) -> RepositoryResult<Page<T>> {
        if let Some(sort) = request.sort() {
            Self::validate_sort(sort)?;
        }

        let store = self.store.read().await;
        let mut nodes = store.get_nodes_by_label(&T::label());
        if let Some(sort) = request.sort() {
            nodes.sort_by(|a, b| Self::compare(a, b, sort));
        }

        let page = Page::from_sorted(nodes, request);
        Ok(Page {
            content: Self::map_nodes(page.content)?,
            number: page.number,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.count_by_label(&T::label())
    }

    pub async fn delete_by_id(&self, id: NodeId) -> RepositoryResult<()> {
        let mut store = self.store.write().await;
        Self::owned_node(&store, id)?;

        if let Some(persistence) = &self.persistence {
            persistence.persist_delete_node(id)?;
        }
        store.delete_node(id)?;

        debug!("Deleted {} {}", T::LABEL, id);
        Ok(())
    }

    /// Entities whose property `key` equals `value` exactly, by ascending id
    pub async fn find_by_property(
        &self,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> RepositoryResult<Vec<T>> {
        let value = value.into();
        let store = self.store.read().await;
        Self::map_nodes(store.find_nodes_by_property(&T::label(), key, &value))
    }

    /// Index `key` on this entity's label so property lookups skip the scan
    pub async fn ensure_index(&self, key: &str) -> bool {
        self.store
            .write()
            .await
            .create_property_index(&T::label(), key)
    }

    fn owned_node(store: &GraphStore, id: NodeId) -> RepositoryResult<&Node> {
        store
            .get_node(id)
            .filter(|node| node.has_label(&T::label()))
            .ok_or(RepositoryError::NotFound(id))
    }

    fn map_nodes(nodes: Vec<&Node>) -> RepositoryResult<Vec<T>> {
        nodes
            .into_iter()
            .map(|node| T::from_node(node).map_err(RepositoryError::from))
            .collect()
    }

    fn validate_sort(sort: &Sort) -> RepositoryResult<()> {
        if sort.property == Sort::ID || T::PROPERTIES.contains(&sort.property.as_str()) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidSort(format!(
                "{} has no property '{}'",
                T::LABEL,
                sort.property
            )))
        }
    }

    /// Missing values sort first ascending; ties always fall back to ascending id
    fn compare(a: &Node, b: &Node, sort: &Sort) -> Ordering {
        let ordering = if sort.property == Sort::ID {
            a.id.cmp(&b.id)
        } else {
            a.get_property(&sort.property)
                .cmp(&b.get_property(&sort.property))
        };

        let ordering = match sort.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}
