// in-memory adjacency over one taxonomy snapshot
use std::collections::{HashMap, HashSet};

use crate::core::types::{Node, NodeId, TermRef};
use crate::error::ValidationError;

/// Parent/child index built from a node snapshot.
///
/// Built fresh per operation and never mutated afterwards: when the
/// underlying nodes change, build a new one. A cached index that misses
/// a newly added node silently drops it from every tree.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    nodes: HashMap<NodeId, Node>,
    //snapshot order, used for roots and children
    order: Vec<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    slugs: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl HierarchyIndex {
    /// Index `nodes`, keeping their order for children and roots.
    ///
    /// Fails on duplicate ids, duplicate slugs, and on any parent chain
    /// that does not end within `nodes.len()` steps.
    pub fn build(nodes: Vec<Node>) -> Result<Self, ValidationError> {
        let mut index = HierarchyIndex::default();
        index.order.reserve(nodes.len());

        for node in nodes {
            if index.nodes.contains_key(&node.id) {
                return Err(ValidationError::DuplicateNode { node: node.id });
            }
            if let Some(&first) = index.slugs.get(&node.slug) {
                return Err(ValidationError::DuplicateSlug {
                    slug: node.slug.clone(),
                    first,
                    second: node.id,
                });
            }
            index.slugs.insert(node.slug.clone(), node.id);
            index.order.push(node.id);
            index.nodes.insert(node.id, node);
        }

        index.check_acyclic()?;

        let mut orphans = 0usize;
        for &id in &index.order {
            match index.nodes[&id].parent {
                Some(parent) if index.nodes.contains_key(&parent) => {
                    index.children.entry(parent).or_default().push(id);
                }
                Some(_) => {
                    orphans += 1;
                    index.roots.push(id);
                }
                None => index.roots.push(id),
            }
        }

        tracing::debug!(
            nodes = index.order.len(),
            roots = index.roots.len(),
            orphans,
            "built hierarchy index"
        );
        Ok(index)
    }

    //walk every parent chain at most n steps; chains that reach an already
    //verified node stop early, so the whole pass stays linear
    fn check_acyclic(&self) -> Result<(), ValidationError> {
        let limit = self.nodes.len();
        let mut verified: HashSet<NodeId> = HashSet::with_capacity(limit);

        for &start in &self.order {
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(id) = current {
                if verified.contains(&id) {
                    break;
                }
                let Some(node) = self.nodes.get(&id) else {
                    break;
                };
                if path.len() >= limit {
                    return Err(ValidationError::CycleDetected { node: start });
                }
                path.push(id);
                current = node.parent;
            }
            verified.extend(path);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Node> {
        self.slugs.get(slug).and_then(|id| self.nodes.get(id))
    }

    pub fn resolve(&self, term: &TermRef) -> Option<&Node> {
        match term {
            TermRef::Id(id) => self.get(*id),
            TermRef::Slug(slug) => self.by_slug(slug),
        }
    }

    /// Nodes in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, id: NodeId) -> Vec<&Node> {
        self.child_ids(id)
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .collect()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.child_ids(id).is_empty()
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn roots(&self) -> Vec<&Node> {
        self.roots
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Every node below `id`, at any depth. Empty for leaves and unknown ids.
    pub fn descendant_ids(&self, id: NodeId) -> HashSet<NodeId> {
        let mut out = HashSet::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).to_vec();
        while let Some(next) = stack.pop() {
            if out.insert(next) {
                stack.extend_from_slice(self.child_ids(next));
            }
        }
        out
    }

    /// Ancestors of `id`, nearest first. Stops at the first parent that is
    /// not part of the snapshot.
    pub fn ancestor_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            let Some(node) = self.nodes.get(&parent) else {
                break;
            };
            out.push(parent);
            current = node.parent;
        }
        out
    }

    /// Distance from the node's root; `None` for unknown ids.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.contains(id).then(|| self.ancestor_ids(id).len())
    }
}
