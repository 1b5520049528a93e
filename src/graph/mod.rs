//! Resource graph
//!
//! Thread-safe store of discovered resources keyed by identity plus an
//! append-only list of relationships. Processors write concurrently during
//! discovery; the renderer reads after every writer has been joined.

mod snapshot;

pub use snapshot::GraphSnapshot;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{Relationship, RelationshipKind, Resource, ResourceId, ResourceKind};

#[derive(Debug, Default)]
struct GraphInner {
    resources: HashMap<ResourceId, Resource>,
    relationships: Vec<Relationship>,
}

/// Deduplicated resources plus their relationships
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    inner: Arc<RwLock<GraphInner>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, GraphInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a resource, returning false if its identity was already present
    ///
    /// The first insertion wins; later duplicates are dropped.
    pub fn add_resource(&self, resource: Resource) -> bool {
        let mut inner = self.write();
        if inner.resources.contains_key(&resource.id) {
            return false;
        }
        inner.resources.insert(resource.id.clone(), resource);
        true
    }

    /// Append a relationship; duplicates are kept
    pub fn add_relationship(&self, relationship: Relationship) {
        self.write().relationships.push(relationship);
    }

    /// Replace the status of an already inserted resource
    pub fn update_status<F>(&self, id: &ResourceId, update: F) -> bool
    where
        F: FnOnce(&mut Resource),
    {
        let mut inner = self.write();
        match inner.resources.get_mut(id) {
            Some(resource) => {
                update(resource);
                true
            }
            None => false,
        }
    }

    /// Move every resource and relationship of `other` into this graph
    pub fn merge(&self, other: &ResourceGraph) {
        let (resources, relationships) = {
            let mut source = other.write();
            (
                std::mem::take(&mut source.resources),
                std::mem::take(&mut source.relationships),
            )
        };
        self.extend(resources.into_values(), relationships);
    }

    /// Insert resources (dedup by identity) and append relationships
    pub fn extend<R, E>(&self, resources: R, relationships: E)
    where
        R: IntoIterator<Item = Resource>,
        E: IntoIterator<Item = Relationship>,
    {
        let mut inner = self.write();
        for resource in resources {
            inner
                .resources
                .entry(resource.id.clone())
                .or_insert(resource);
        }
        inner.relationships.extend(relationships);
    }

    pub fn get(&self, id: &ResourceId) -> Option<Resource> {
        self.read().resources.get(id).cloned()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.read().resources.contains_key(id)
    }

    /// Resources of one kind, sorted by `(namespace, name)`
    pub fn resources_of_kind(&self, kind: ResourceKind) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self
            .read()
            .resources
            .values()
            .filter(|r| r.id.kind == kind)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.id.sort_key().cmp(&b.id.sort_key()));
        resources
    }

    /// Outgoing relationships of one kind, sorted by the target's `(namespace, name)`
    ///
    /// Ties keep insertion order after ordering by target kind and description.
    pub fn relationships_from(&self, id: &ResourceId, kind: RelationshipKind) -> Vec<Relationship> {
        let mut relationships: Vec<Relationship> = self
            .read()
            .relationships
            .iter()
            .filter(|rel| rel.kind == kind && &rel.source == id)
            .cloned()
            .collect();
        relationships.sort_by(|a, b| {
            a.target
                .sort_key()
                .cmp(&b.target.sort_key())
                .then_with(|| a.target.kind.cmp(&b.target.kind))
                .then_with(|| a.description.cmp(&b.description))
        });
        relationships
    }

    /// Incoming relationships of one kind, sorted by the source's `(namespace, name)`
    pub fn relationships_to(&self, id: &ResourceId, kind: RelationshipKind) -> Vec<Relationship> {
        let mut relationships: Vec<Relationship> = self
            .read()
            .relationships
            .iter()
            .filter(|rel| rel.kind == kind && &rel.target == id)
            .cloned()
            .collect();
        relationships.sort_by(|a, b| {
            a.source
                .sort_key()
                .cmp(&b.source.sort_key())
                .then_with(|| a.source.kind.cmp(&b.source.kind))
                .then_with(|| a.description.cmp(&b.description))
        });
        relationships
    }

    pub fn resource_count(&self) -> usize {
        self.read().resources.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.read().relationships.len()
    }

    /// Serializable copy of the graph in rendering order
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from_graph(self)
    }

    pub(crate) fn all_resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self.read().resources.values().cloned().collect();
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        resources
    }

    pub(crate) fn all_relationships(&self) -> Vec<Relationship> {
        let mut relationships = self.read().relationships.clone();
        relationships.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.target.cmp(&b.target))
                .then_with(|| a.description.cmp(&b.description))
        });
        relationships
    }
}
