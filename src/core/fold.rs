// fold policy: which branches open because something below them is selected
use std::collections::{HashMap, HashSet};

use crate::core::graph::HierarchyIndex;
use crate::core::types::{NodeId, SelectionSet};

/// Nodes that must render expanded: every node with at least one selected
/// proper descendant, at any depth.
///
/// A node's own selection never opens it. Computed bottom-up in one
/// post-order pass: a subtree "holds a selection" when its root is
/// selected or any child subtree holds one, and a node is expanded when
/// any child subtree holds one.
pub fn expanded_set(index: &HierarchyIndex, selected: &SelectionSet) -> HashSet<NodeId> {
    let unknown = selected.iter().filter(|id| !index.contains(**id)).count();
    if unknown > 0 {
        tracing::debug!(unknown, "ignoring selected ids missing from the hierarchy");
    }

    let mut expanded = HashSet::new();
    if selected.is_empty() {
        return expanded;
    }

    let mut holds: HashMap<NodeId, bool> = HashMap::with_capacity(index.len());

    for &root in index.root_ids() {
        //(node, children already pushed)
        let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
        while let Some((id, visited)) = stack.pop() {
            let children = index.child_ids(id);
            if !visited {
                stack.push((id, true));
                stack.extend(children.iter().map(|&c| (c, false)));
                continue;
            }

            let below = children
                .iter()
                .any(|c| holds.get(c).copied().unwrap_or(false));
            if below {
                expanded.insert(id);
            }
            holds.insert(id, below || selected.contains(&id));
        }
    }

    expanded
}

/// Direct form of the fold rule for a single node:
/// `descendants(id) ∩ selected ≠ ∅`. Quadratic when applied to every node,
/// prefer `expanded_set` for whole trees.
pub fn is_expanded(index: &HierarchyIndex, id: NodeId, selected: &SelectionSet) -> bool {
    index
        .descendant_ids(id)
        .iter()
        .any(|d| selected.contains(d))
}
