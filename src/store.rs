//! Collaborators the facade talks to: the node store that owns terms and
//! assignments, and the host platform that accepts registrations.
//!
//! Both are synchronous and take `&self`. Calls may be slow; the core makes
//! no assumption about their latency and never retries them. Every store
//! call carries a [`TermScope`] so multi-tenant hosts receive the tenant
//! explicitly instead of switching an ambient context.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::config::defaults::TaxonomyConfig;
use crate::core::types::{Node, NodeId, ObjectId, TenantId};
use crate::error::{PlatformError, StoreError};

/// Which partition of the store a call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermScope {
    pub tenant: Option<TenantId>,
    pub taxonomy: String,
}

impl TermScope {
    pub fn new(taxonomy: impl Into<String>) -> Self {
        Self {
            tenant: None,
            taxonomy: taxonomy.into(),
        }
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }
}

/// Filter passed through to the store's term listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermQuery {
    /// Only direct children of this node.
    pub parent: Option<NodeId>,
    /// Only terms assigned to at least one of these objects.
    pub object_ids: Vec<ObjectId>,
    pub slugs: Vec<String>,
    /// Case-insensitive match on label or slug.
    pub search: Option<String>,
    pub hide_empty: bool,
    /// Ask the store for a count instead of records.
    pub count_only: bool,
}

impl TermQuery {
    pub fn for_objects(object_ids: impl Into<Vec<ObjectId>>) -> Self {
        Self {
            object_ids: object_ids.into(),
            ..Self::default()
        }
    }

    pub fn children_of(parent: NodeId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        if let Some(parent) = self.parent {
            if node.parent != Some(parent) {
                return false;
            }
        }
        if !self.slugs.is_empty() && !self.slugs.iter().any(|s| *s == node.slug) {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            if !node.label.to_lowercase().contains(&needle) && !node.slug.to_lowercase().contains(&needle) {
                return false;
            }
        }
        !(self.hide_empty && node.assigned_count == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput {
    Nodes(Vec<Node>),
    Count(usize),
}

pub trait NodeStore {
    /// Every node of the taxonomy, in the order trees should render.
    fn list_nodes(&self, scope: &TermScope) -> Result<Vec<Node>, StoreError>;

    fn query_nodes(&self, scope: &TermScope, query: &TermQuery) -> Result<QueryOutput, StoreError>;

    fn list_assignments(&self, scope: &TermScope, object: ObjectId) -> Result<Vec<NodeId>, StoreError>;

    /// Replace (or with `append`, extend) the object's assignments and
    /// return the resulting set.
    fn set_assignments(
        &self,
        scope: &TermScope,
        object: ObjectId,
        ids: &[NodeId],
        append: bool,
    ) -> Result<Vec<NodeId>, StoreError>;

    /// Objects bearing at least one of `ids`.
    fn objects_in_nodes(&self, scope: &TermScope, ids: &[NodeId]) -> Result<Vec<ObjectId>, StoreError>;

    fn update_node(&self, scope: &TermScope, node: &Node) -> Result<(), StoreError>;
}

pub trait Platform {
    fn register_taxonomy(&self, config: &TaxonomyConfig) -> Result<(), PlatformError>;
}

impl<T: NodeStore + ?Sized> NodeStore for &T {
    fn list_nodes(&self, scope: &TermScope) -> Result<Vec<Node>, StoreError> {
        (**self).list_nodes(scope)
    }

    fn query_nodes(&self, scope: &TermScope, query: &TermQuery) -> Result<QueryOutput, StoreError> {
        (**self).query_nodes(scope, query)
    }

    fn list_assignments(&self, scope: &TermScope, object: ObjectId) -> Result<Vec<NodeId>, StoreError> {
        (**self).list_assignments(scope, object)
    }

    fn set_assignments(
        &self,
        scope: &TermScope,
        object: ObjectId,
        ids: &[NodeId],
        append: bool,
    ) -> Result<Vec<NodeId>, StoreError> {
        (**self).set_assignments(scope, object, ids, append)
    }

    fn objects_in_nodes(&self, scope: &TermScope, ids: &[NodeId]) -> Result<Vec<ObjectId>, StoreError> {
        (**self).objects_in_nodes(scope, ids)
    }

    fn update_node(&self, scope: &TermScope, node: &Node) -> Result<(), StoreError> {
        (**self).update_node(scope, node)
    }
}

impl<T: Platform + ?Sized> Platform for &T {
    fn register_taxonomy(&self, config: &TaxonomyConfig) -> Result<(), PlatformError> {
        (**self).register_taxonomy(config)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<TermScope, Vec<Node>>,
    assignments: HashMap<(TermScope, ObjectId), Vec<NodeId>>,
    writes: usize,
    failure: Option<String>,
    write_failure: Option<String>,
}

/// In-process node store. Assignment counts are derived from the stored
/// assignments whenever nodes are read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        if let Some(reason) = state.failure.clone() {
            return Err(StoreError::new(reason));
        }
        Ok(state)
    }

    fn lock_for_write(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock()?;
        if let Some(reason) = state.write_failure.clone() {
            return Err(StoreError::new(reason));
        }
        Ok(state)
    }

    pub fn insert_nodes(&self, scope: &TermScope, nodes: impl IntoIterator<Item = Node>) -> Result<(), StoreError> {
        self.lock()?.nodes.entry(scope.clone()).or_default().extend(nodes);
        Ok(())
    }

    /// Make every following call fail with `reason`; `None` heals the store.
    pub fn set_failure(&self, reason: Option<&str>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.failure = reason.map(str::to_string);
    }

    /// Like `set_failure`, but reads keep working and only assignment and
    /// node writes fail.
    pub fn set_write_failure(&self, reason: Option<&str>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.write_failure = reason.map(str::to_string);
    }

    /// Number of assignment and node writes accepted so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|s| s.writes).unwrap_or_default()
    }

    fn counted(state: &MemoryState, scope: &TermScope) -> Vec<Node> {
        let mut counts: HashMap<NodeId, u64> = HashMap::new();
        for ((s, _), ids) in &state.assignments {
            if s == scope {
                for id in ids {
                    *counts.entry(*id).or_default() += 1;
                }
            }
        }
        state
            .nodes
            .get(scope)
            .map(|nodes| {
                nodes
                    .iter()
                    .map(|n| n.clone().with_count(counts.get(&n.id).copied().unwrap_or(0)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl NodeStore for MemoryStore {
    fn list_nodes(&self, scope: &TermScope) -> Result<Vec<Node>, StoreError> {
        let state = self.lock()?;
        Ok(Self::counted(&state, scope))
    }

    fn query_nodes(&self, scope: &TermScope, query: &TermQuery) -> Result<QueryOutput, StoreError> {
        let state = self.lock()?;
        let wanted: Option<HashSet<NodeId>> = (!query.object_ids.is_empty()).then(|| {
            query
                .object_ids
                .iter()
                .filter_map(|o| state.assignments.get(&(scope.clone(), *o)))
                .flatten()
                .copied()
                .collect()
        });

        let nodes: Vec<Node> = Self::counted(&state, scope)
            .into_iter()
            .filter(|n| wanted.as_ref().is_none_or(|w| w.contains(&n.id)))
            .filter(|n| query.matches(n))
            .collect();

        if query.count_only {
            return Ok(QueryOutput::Count(nodes.len()));
        }
        Ok(QueryOutput::Nodes(nodes))
    }

    fn list_assignments(&self, scope: &TermScope, object: ObjectId) -> Result<Vec<NodeId>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .assignments
            .get(&(scope.clone(), object))
            .cloned()
            .unwrap_or_default())
    }

    fn set_assignments(
        &self,
        scope: &TermScope,
        object: ObjectId,
        ids: &[NodeId],
        append: bool,
    ) -> Result<Vec<NodeId>, StoreError> {
        let mut state = self.lock_for_write()?;
        state.writes += 1;
        let current = state.assignments.entry((scope.clone(), object)).or_default();
        if !append {
            current.clear();
        }
        for id in ids {
            if !current.contains(id) {
                current.push(*id);
            }
        }
        Ok(current.clone())
    }

    fn objects_in_nodes(&self, scope: &TermScope, ids: &[NodeId]) -> Result<Vec<ObjectId>, StoreError> {
        let state = self.lock()?;
        let mut objects: Vec<ObjectId> = state
            .assignments
            .iter()
            .filter(|((s, _), assigned)| s == scope && assigned.iter().any(|a| ids.contains(a)))
            .map(|((_, object), _)| *object)
            .collect();
        objects.sort_unstable();
        Ok(objects)
    }

    fn update_node(&self, scope: &TermScope, node: &Node) -> Result<(), StoreError> {
        let mut state = self.lock_for_write()?;
        let slot = state
            .nodes
            .get_mut(scope)
            .and_then(|nodes| nodes.iter_mut().find(|n| n.id == node.id))
            .ok_or_else(|| StoreError::new(format!("node {} not stored", node.id)))?;
        *slot = node.clone();
        state.writes += 1;
        Ok(())
    }
}

/// Platform stand-in that records every registration it accepts.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    registered: Mutex<Vec<String>>,
    reject: Option<String>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            registered: Mutex::default(),
            reject: Some(reason.into()),
        }
    }

    /// Slugs registered so far, in call order.
    pub fn registrations(&self) -> Vec<String> {
        self.registered
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Platform for MemoryPlatform {
    fn register_taxonomy(&self, config: &TaxonomyConfig) -> Result<(), PlatformError> {
        if let Some(reason) = &self.reject {
            return Err(PlatformError::new(reason.clone()));
        }
        self.registered
            .lock()
            .map_err(|_| PlatformError::new("platform registry poisoned"))?
            .push(config.slug.clone());
        Ok(())
    }
}
