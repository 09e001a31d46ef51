use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::fold::expanded_set;
use crate::core::graph::HierarchyIndex;
use crate::core::types::{Node, NodeId, SelectionSet};

/// Call-level lock state, applied uniformly to every node of one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFlags {
    pub disabled: bool,
    pub readonly: bool,
}

impl RenderFlags {
    pub fn locked() -> Self {
        Self {
            disabled: true,
            readonly: true,
        }
    }
}

/// One node of the presentational selection tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderNode {
    pub node: Node,
    pub depth: usize,
    pub checked: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub expanded: bool,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order walk over this node and everything below it.
    pub fn iter(&self) -> impl Iterator<Item = &RenderNode> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Ids of every checked node in a rendered forest, pre-order.
pub fn checked_ids(tree: &[RenderNode]) -> Vec<NodeId> {
    tree.iter()
        .flat_map(RenderNode::iter)
        .filter(|r| r.checked)
        .map(|r| r.node.id)
        .collect()
}

/// Render the selection tree: one entry per root, children in index order.
///
/// `checked` mirrors the selection, `expanded` comes from the fold policy,
/// and the flags are copied to every node. Leaves are never expanded.
///
/// Nodes are built recursively, one stack frame per tree level, and the
/// nested `RenderNode` drops the same way. Taxonomies a few thousand
/// levels deep are fine; a chain tens of thousands of levels deep can
/// overflow the thread's stack.
pub fn render(index: &HierarchyIndex, selected: &SelectionSet, flags: RenderFlags) -> Vec<RenderNode> {
    let expanded = expanded_set(index, selected);
    let ctx = RenderCtx {
        index,
        selected,
        expanded: &expanded,
        flags,
    };

    let tree: Vec<RenderNode> = index
        .root_ids()
        .iter()
        .filter_map(|&id| ctx.render_node(id, 0))
        .collect();

    tracing::debug!(
        roots = tree.len(),
        nodes = index.len(),
        selected = selected.len(),
        expanded = expanded.len(),
        "rendered selection tree"
    );
    tree
}

struct RenderCtx<'a> {
    index: &'a HierarchyIndex,
    selected: &'a SelectionSet,
    expanded: &'a HashSet<NodeId>,
    flags: RenderFlags,
}

impl RenderCtx<'_> {
    /// Recurses once per level below `id`. The index rejects cycles at
    /// build time, so recursion depth equals the height of the subtree.
    fn render_node(&self, id: NodeId, depth: usize) -> Option<RenderNode> {
        let node = self.index.get(id)?;
        let children: Vec<RenderNode> = self
            .index
            .child_ids(id)
            .iter()
            .filter_map(|&child| self.render_node(child, depth + 1))
            .collect();

        Some(RenderNode {
            node: node.clone(),
            depth,
            checked: self.selected.contains(&id),
            disabled: self.flags.disabled,
            readonly: self.flags.readonly,
            expanded: !children.is_empty() && self.expanded.contains(&id),
            children,
        })
    }
}
