//! Public entry point: taxonomy registration plus term queries,
//! assignments and selection trees for one registered taxonomy.
//!
//! Every operation builds a fresh [`HierarchyIndex`] from the store, so a
//! node added between two calls is always seen by the second one.
//! Assignments to the same object are not serialized here; callers that
//! may run two assignments for one object concurrently must order them
//! themselves.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::defaults::TaxonomyConfig;
use crate::core::graph::HierarchyIndex;
use crate::core::render::{RenderFlags, RenderNode, render};
use crate::core::types::{Node, NodeId, ObjectId, SelectionSet, TenantId, TermRef};
use crate::error::{StoreError, TaxonomyError, ValidationError};
use crate::store::{NodeStore, Platform, QueryOutput, TermQuery, TermScope};

pub const MAX_SLUG_LEN: usize = 32;
pub const USER_OBJECT_TYPE: &str = "user";

/// A registered taxonomy. Cheap to clone; equal handles refer to the same
/// registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyHandle {
    sequence: u64,
    config: Arc<TaxonomyConfig>,
}

impl TaxonomyHandle {
    pub fn slug(&self) -> &str {
        &self.config.slug
    }

    pub fn config(&self) -> &TaxonomyConfig {
        &self.config
    }

    /// Registration order within its registry, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let reason = if slug.is_empty() {
        Some("slug is empty".to_string())
    } else if slug.chars().count() > MAX_SLUG_LEN {
        Some(format!("longer than {MAX_SLUG_LEN} characters"))
    } else if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        Some("only lowercase letters, digits, '_' and '-' are allowed".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidSlug {
            slug: slug.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Registers taxonomies with the host platform, once per slug.
#[derive(Debug)]
pub struct Registry<P> {
    platform: P,
    handles: HashMap<String, TaxonomyHandle>,
    next_sequence: u64,
}

impl<P: Platform> Registry<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            handles: HashMap::new(),
            next_sequence: 1,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn get(&self, slug: &str) -> Option<&TaxonomyHandle> {
        self.handles.get(slug)
    }

    /// Register `config` with the platform.
    ///
    /// Re-registering an identical config returns the existing handle
    /// without calling the platform again; a different config under the
    /// same slug is a `Conflict`. Platform failures are returned as-is.
    pub fn register(&mut self, config: TaxonomyConfig) -> Result<TaxonomyHandle, TaxonomyError> {
        validate_slug(&config.slug)?;

        if let Some(existing) = self.handles.get(&config.slug) {
            if *existing.config == config {
                tracing::debug!(slug = %config.slug, "taxonomy already registered");
                return Ok(existing.clone());
            }
            tracing::warn!(slug = %config.slug, "conflicting re-registration rejected");
            return Err(TaxonomyError::Conflict { slug: config.slug });
        }

        self.platform
            .register_taxonomy(&config)
            .map_err(|source| TaxonomyError::Registration {
                slug: config.slug.clone(),
                source,
            })?;

        let handle = TaxonomyHandle {
            sequence: self.next_sequence,
            config: Arc::new(config),
        };
        self.next_sequence += 1;
        tracing::info!(
            slug = %handle.slug(),
            object_type = %handle.config().object_type,
            "registered taxonomy"
        );
        self.handles.insert(handle.slug().to_string(), handle.clone());
        Ok(handle)
    }

    /// As [`register`](Self::register), for taxonomies over user accounts.
    pub fn register_user_taxonomy(&mut self, config: TaxonomyConfig) -> Result<TaxonomyHandle, TaxonomyError> {
        if config.object_type != USER_OBJECT_TYPE {
            return Err(ValidationError::WrongObjectType {
                slug: config.slug,
                expected: USER_OBJECT_TYPE.to_string(),
                found: config.object_type,
            }
            .into());
        }
        self.register(config)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignOptions {
    /// Keep existing assignments and add the new ones.
    pub append: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    pub object: ObjectId,
    /// Resolved ids of the request, deduplicated, request order.
    pub requested: Vec<NodeId>,
    /// What the store holds for the object afterwards.
    pub assigned: Vec<NodeId>,
}

/// Operations on one registered taxonomy, backed by a node store.
#[derive(Debug)]
pub struct TaxonomyFacade<S> {
    handle: TaxonomyHandle,
    store: S,
    scope: TermScope,
}

impl<S: NodeStore> TaxonomyFacade<S> {
    pub fn new(handle: TaxonomyHandle, store: S) -> Self {
        let scope = TermScope::new(handle.slug());
        Self {
            handle,
            store,
            scope,
        }
    }

    /// Route every store call to `tenant`.
    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.scope.tenant = Some(tenant);
        self
    }

    pub fn handle(&self) -> &TaxonomyHandle {
        &self.handle
    }

    pub fn config(&self) -> &TaxonomyConfig {
        self.handle.config()
    }

    pub fn scope(&self) -> &TermScope {
        &self.scope
    }

    fn store_failed(&self, object: Option<ObjectId>) -> impl FnOnce(StoreError) -> TaxonomyError + '_ {
        move |source| TaxonomyError::Store {
            slug: self.scope.taxonomy.clone(),
            object,
            source,
        }
    }

    fn snapshot(&self) -> Result<HierarchyIndex, TaxonomyError> {
        let nodes = self.store.list_nodes(&self.scope).map_err(self.store_failed(None))?;
        Ok(HierarchyIndex::build(nodes)?)
    }

    /// Full node records matching `filter`. A count-only request is turned
    /// into a record request.
    pub fn query_terms(&self, filter: &TermQuery) -> Result<Vec<Node>, TaxonomyError> {
        let mut query = filter.clone();
        if query.count_only {
            tracing::debug!(slug = %self.scope.taxonomy, "dropping count-only flag from term query");
            query.count_only = false;
        }

        match self.store.query_nodes(&self.scope, &query).map_err(self.store_failed(None))? {
            QueryOutput::Nodes(nodes) => Ok(nodes),
            QueryOutput::Count(_) => Err(self.store_failed(None)(StoreError::new(
                "store answered a record query with a count",
            ))),
        }
    }

    /// Replace (or append to) the terms of `object`.
    ///
    /// Every identifier must resolve in the current snapshot; otherwise the
    /// call fails with `UnknownTerms` and the store is not written.
    pub fn assign_terms(
        &self,
        object: ObjectId,
        terms: &[TermRef],
        options: AssignOptions,
    ) -> Result<AssignmentResult, TaxonomyError> {
        let index = self.snapshot()?;

        let mut requested: Vec<NodeId> = Vec::with_capacity(terms.len());
        let mut unknown: Vec<String> = Vec::new();
        for term in terms {
            match index.resolve(term) {
                Some(node) if !requested.contains(&node.id) => requested.push(node.id),
                Some(_) => {}
                None => unknown.push(term.to_string()),
            }
        }

        if !unknown.is_empty() {
            tracing::warn!(
                slug = %self.scope.taxonomy,
                object,
                unknown = ?unknown,
                "rejected assignment with unknown terms"
            );
            return Err(ValidationError::UnknownTerms {
                taxonomy: self.scope.taxonomy.clone(),
                object,
                identifiers: unknown,
            }
            .into());
        }

        let assigned = self
            .store
            .set_assignments(&self.scope, object, &requested, options.append)
            .map_err(self.store_failed(Some(object)))?;

        tracing::info!(
            slug = %self.scope.taxonomy,
            object,
            append = options.append,
            requested = requested.len(),
            assigned = assigned.len(),
            "assigned terms"
        );
        Ok(AssignmentResult {
            object,
            requested,
            assigned,
        })
    }

    /// Selection tree for editing `object`'s assignments.
    pub fn render_selection_tree(&self, object: ObjectId, flags: RenderFlags) -> Result<Vec<RenderNode>, TaxonomyError> {
        let index = self.snapshot()?;
        let selected: SelectionSet = self
            .store
            .list_assignments(&self.scope, object)
            .map_err(self.store_failed(Some(object)))?
            .into_iter()
            .collect();
        Ok(render(&index, &selected, flags))
    }

    /// Selection tree for an object that does not exist yet: nothing checked,
    /// everything folded.
    pub fn render_blank_tree(&self, flags: RenderFlags) -> Result<Vec<RenderNode>, TaxonomyError> {
        let index = self.snapshot()?;
        Ok(render(&index, &SelectionSet::new(), flags))
    }

    /// Objects bearing any term that matches `filter`.
    pub fn objects_by_terms(&self, filter: &TermQuery) -> Result<Vec<ObjectId>, TaxonomyError> {
        let ids: Vec<NodeId> = self.query_terms(filter)?.iter().map(|n| n.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .objects_in_nodes(&self.scope, &ids)
            .map_err(self.store_failed(None))
    }

    /// Terms assigned to any of `objects`.
    pub fn terms_by_objects(&self, objects: &[ObjectId]) -> Result<Vec<Node>, TaxonomyError> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }
        self.query_terms(&TermQuery::for_objects(objects))
    }

    /// Persist a changed node. The change is checked against a rebuilt
    /// snapshot first, so a re-parent that would create a cycle (or a slug
    /// clash) never reaches the store.
    pub fn update_term(&self, node: Node) -> Result<(), TaxonomyError> {
        let mut nodes = self.store.list_nodes(&self.scope).map_err(self.store_failed(None))?;
        let Some(slot) = nodes.iter_mut().find(|n| n.id == node.id) else {
            return Err(ValidationError::UnknownNode {
                taxonomy: self.scope.taxonomy.clone(),
                node: node.id,
            }
            .into());
        };
        *slot = node.clone();
        HierarchyIndex::build(nodes)?;

        self.store
            .update_node(&self.scope, &node)
            .map_err(self.store_failed(None))?;
        tracing::info!(slug = %self.scope.taxonomy, node = node.id, "updated term");
        Ok(())
    }

    /// Usernames equal to the taxonomy slug are blanked, so they cannot
    /// shadow the taxonomy's admin routes.
    pub fn sanitize_username<'a>(&self, username: &'a str) -> &'a str {
        if username == self.handle.slug() { "" } else { username }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{ConfigDefaulter, TaxonomyArgs};
    use crate::store::{MemoryPlatform, MemoryStore};
    use pretty_assertions::assert_eq;

    fn mk_node(id: NodeId, parent: Option<NodeId>) -> Node {
        Node::new(id, parent, format!("n{id}"), format!("Node {id}"))
    }

    fn team_config() -> TaxonomyConfig {
        ConfigDefaulter::new("team", "user").merge(&TaxonomyArgs::default(), "Team", "Teams")
    }

    fn setup(store: &MemoryStore) -> TaxonomyFacade<&MemoryStore> {
        let mut registry = Registry::new(MemoryPlatform::new());
        let handle = registry.register_user_taxonomy(team_config()).unwrap();
        store
            .insert_nodes(
                &TermScope::new("team"),
                vec![
                    mk_node(1, None),
                    mk_node(2, Some(1)),
                    mk_node(3, Some(2)),
                    mk_node(4, None),
                ],
            )
            .unwrap();
        TaxonomyFacade::new(handle, store)
    }

    #[test]
    fn identical_registration_returns_same_handle_once() {
        let mut registry = Registry::new(MemoryPlatform::new());
        let first = registry.register(team_config()).unwrap();
        let second = registry.register(team_config()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.sequence(), 1);
        assert_eq!(registry.platform().registrations(), vec!["team".to_string()]);
        assert_eq!(registry.get("team"), Some(&first));
    }

    #[test]
    fn different_config_same_slug_conflicts() {
        let mut registry = Registry::new(MemoryPlatform::new());
        registry.register(team_config()).unwrap();

        let mut changed = team_config();
        changed.labels.name = "Squads".into();
        let err = registry.register(changed).unwrap_err();
        assert!(matches!(err, TaxonomyError::Conflict { ref slug } if slug == "team"));
        assert_eq!(registry.platform().registrations().len(), 1);
    }

    #[test]
    fn platform_failure_is_surfaced_and_nothing_is_kept() {
        let mut registry = Registry::new(MemoryPlatform::rejecting("reserved name"));
        let err = registry.register(team_config()).unwrap_err();
        match err {
            TaxonomyError::Registration { slug, source } => {
                assert_eq!(slug, "team");
                assert_eq!(source.reason, "reserved name");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.get("team").is_none());
    }

    #[test]
    fn bad_slugs_and_object_types_are_rejected() {
        let mut registry = Registry::new(MemoryPlatform::new());

        let mut cfg = team_config();
        cfg.slug = "a".repeat(MAX_SLUG_LEN + 1);
        assert!(registry.register(cfg).unwrap_err().is_validation());

        let mut cfg = team_config();
        cfg.slug = "Team Names".into();
        assert!(registry.register(cfg).unwrap_err().is_validation());

        let post_cfg = ConfigDefaulter::new("topic", "post").merge(&TaxonomyArgs::default(), "", "");
        let err = registry.register_user_taxonomy(post_cfg.clone()).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::Validation(ValidationError::WrongObjectType { .. })
        ));
        assert!(registry.register(post_cfg).is_ok());
        assert!(registry.platform().registrations().contains(&"topic".to_string()));
    }

    #[test]
    fn unknown_term_rejects_without_writing() {
        let store = MemoryStore::new();
        let facade = setup(&store);

        let err = facade
            .assign_terms(5, &["n1".into(), "nonexistent".into(), TermRef::Id(77)], AssignOptions::default())
            .unwrap_err();

        match err {
            TaxonomyError::Validation(ValidationError::UnknownTerms { object, identifiers, .. }) => {
                assert_eq!(object, 5);
                assert_eq!(identifiers, vec!["nonexistent".to_string(), "77".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.write_count(), 0);
        assert!(store.list_assignments(facade.scope(), 5).unwrap().is_empty());
    }

    #[test]
    fn assign_replaces_or_appends() {
        let store = MemoryStore::new();
        let facade = setup(&store);

        let result = facade
            .assign_terms(5, &["n3".into(), TermRef::Id(3), "n4".into()], AssignOptions::default())
            .unwrap();
        assert_eq!(result.requested, vec![3, 4]);
        assert_eq!(result.assigned, vec![3, 4]);

        let result = facade
            .assign_terms(5, &[TermRef::Id(1)], AssignOptions { append: true })
            .unwrap();
        assert_eq!(result.assigned, vec![3, 4, 1]);

        let result = facade.assign_terms(5, &[], AssignOptions::default()).unwrap();
        assert!(result.assigned.is_empty());
    }

    #[test]
    fn numeric_slug_resolves_as_slug_not_id() {
        let store = MemoryStore::new();
        let mut registry = Registry::new(MemoryPlatform::new());
        let cfg = ConfigDefaulter::new("year", "post").merge(&TaxonomyArgs::default(), "Year", "Years");
        let facade = TaxonomyFacade::new(registry.register(cfg).unwrap(), &store);
        store
            .insert_nodes(
                facade.scope(),
                vec![Node::new(1, None, "2", "Year 2"), Node::new(2, None, "b", "B")],
            )
            .unwrap();

        let html = crate::markup::render_checklist(
            facade.config(),
            &facade.render_blank_tree(RenderFlags::default()).unwrap(),
        );
        assert!(html.contains("id=\"in-year-1\" value=\"2\""));

        let posted = TermRef::from("2");
        let result = facade.assign_terms(7, &[posted], AssignOptions::default()).unwrap();
        assert_eq!(result.assigned, vec![1]);

        let result = facade.assign_terms(7, &[TermRef::Id(2)], AssignOptions::default()).unwrap();
        assert_eq!(result.assigned, vec![2]);
    }

    #[test]
    fn selection_tree_reflects_stored_assignments() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        facade
            .assign_terms(9, &[TermRef::Id(3)], AssignOptions::default())
            .unwrap();

        let tree = facade.render_selection_tree(9, RenderFlags::default()).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree[0].expanded);
        assert!(tree[0].children[0].expanded);
        let leaf = &tree[0].children[0].children[0];
        assert!(leaf.checked && !leaf.expanded);
        assert_eq!(leaf.node.assigned_count, 1);
        assert!(!tree[1].expanded && !tree[1].checked);

        let blank = facade.render_blank_tree(RenderFlags::locked()).unwrap();
        assert!(blank.iter().flat_map(RenderNode::iter).all(|r| !r.checked && !r.expanded && r.disabled));
    }

    #[test]
    fn store_failure_propagates_with_context() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        store.set_failure(Some("connection reset"));

        let err = facade.render_selection_tree(4, RenderFlags::default()).unwrap_err();
        match err {
            TaxonomyError::Store { slug, source, .. } => {
                assert_eq!(slug, "team");
                assert_eq!(source.message(), "connection reset");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_assignment_write_names_the_object() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        store.set_write_failure(Some("disk full"));

        let err = facade
            .assign_terms(12, &["n2".into()], AssignOptions::default())
            .unwrap_err();
        match err {
            TaxonomyError::Store { slug, object, source } => {
                assert_eq!(slug, "team");
                assert_eq!(object, Some(12));
                assert_eq!(source.message(), "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.write_count(), 0);

        store.set_write_failure(None);
        assert!(store.list_assignments(facade.scope(), 12).unwrap().is_empty());
    }

    #[test]
    fn cyclic_store_data_fails_the_render() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        store
            .insert_nodes(facade.scope(), vec![mk_node(10, Some(11)), mk_node(11, Some(10))])
            .unwrap();

        let err = facade.render_blank_tree(RenderFlags::default()).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::Validation(ValidationError::CycleDetected { .. })
        ));
    }

    #[test]
    fn count_only_queries_still_return_records() {
        let store = MemoryStore::new();
        let facade = setup(&store);

        let query = TermQuery {
            count_only: true,
            ..TermQuery::children_of(1)
        };
        let nodes = facade.query_terms(&query).unwrap();
        assert_eq!(nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn objects_and_terms_lookups() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        facade.assign_terms(20, &["n2".into()], AssignOptions::default()).unwrap();
        facade.assign_terms(21, &["n2".into(), "n4".into()], AssignOptions::default()).unwrap();

        let query = TermQuery {
            slugs: vec!["n4".into()],
            ..TermQuery::default()
        };
        assert_eq!(facade.objects_by_terms(&query).unwrap(), vec![21]);

        let none = TermQuery {
            slugs: vec!["missing".into()],
            ..TermQuery::default()
        };
        assert!(facade.objects_by_terms(&none).unwrap().is_empty());

        let terms: Vec<NodeId> = facade.terms_by_objects(&[20]).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(terms, vec![2]);
        assert!(facade.terms_by_objects(&[]).unwrap().is_empty());
    }

    #[test]
    fn update_term_rejects_cycles_before_writing() {
        let store = MemoryStore::new();
        let facade = setup(&store);

        let err = facade.update_term(mk_node(1, Some(3))).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::Validation(ValidationError::CycleDetected { .. })
        ));
        let err = facade.update_term(mk_node(99, None)).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::Validation(ValidationError::UnknownNode { node: 99, .. })
        ));
        assert_eq!(store.write_count(), 0);

        facade.update_term(mk_node(4, Some(1)).with_description("moved")).unwrap();
        let tree = facade.render_blank_tree(RenderFlags::default()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 2);
    }

    #[test]
    fn tenants_see_their_own_nodes() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        let handle = facade.handle().clone();

        let tenant = TaxonomyFacade::new(handle, &store).with_tenant(2);
        store
            .insert_nodes(tenant.scope(), vec![mk_node(50, None)])
            .unwrap();

        let tree = tenant.render_blank_tree(RenderFlags::default()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].node.id, 50);
        assert_eq!(facade.render_blank_tree(RenderFlags::default()).unwrap().len(), 2);
    }

    #[test]
    fn username_matching_slug_is_blanked() {
        let store = MemoryStore::new();
        let facade = setup(&store);
        assert_eq!(facade.sanitize_username("team"), "");
        assert_eq!(facade.sanitize_username("teammate"), "teammate");
    }
}
