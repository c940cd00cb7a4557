use crate::foundation::core::LeafSet;
use crate::payload::tree::TreeNode;

/// A link between two tree nodes; predicates look at its target.
#[derive(Clone, Copy, Debug)]
pub struct Link<'a> {
    /// Parent end of the link.
    pub source: &'a TreeNode,
    /// Child end of the link.
    pub target: &'a TreeNode,
}

/// Borrowed active-edge input in any of the shapes embedders hand over.
#[derive(Clone, Copy, Debug)]
pub enum EdgeInput<'a> {
    /// Already a set.
    Set(&'a LeafSet),
    /// Sorted (or unsorted) leaf-index slice.
    Sorted(&'a [u32]),
    /// No edge.
    Null,
}

/// `|split| = |edge|` and every split index is in the edge.
pub fn splits_equal(split: &[u32], edge: &LeafSet) -> bool {
    split.len() == edge.len() && split.iter().all(|x| edge.contains(x))
}

/// The node's split is exactly the active change edge.
pub fn is_node_active_change_edge(node: &TreeNode, edge: &LeafSet) -> bool {
    splits_equal(&node.split_indices, edge)
}

/// The link's target node is the active change edge.
pub fn is_link_active_change_edge(link: Link<'_>, edge: &LeafSet) -> bool {
    is_node_active_change_edge(link.target, edge)
}

/// The node or one of its direct children is the active change edge.
///
/// Only children are inspected; the predicate never needs a parent pointer.
/// A node that matches through a child is the edge's parent, so it is not
/// [`is_downstream_of`] the edge; the implication to downstream holds only
/// for a node's own split.
pub fn node_or_parent_matches_active_edge(node: &TreeNode, edge: &LeafSet) -> bool {
    is_node_active_change_edge(node, edge)
        || node
            .children
            .iter()
            .any(|c| is_node_active_change_edge(c, edge))
}

/// The node's split is a subset of the edge and no larger than it.
///
/// Equal-size splits that differ from the edge are not downstream.
pub fn is_downstream_of(node: &TreeNode, edge: &LeafSet) -> bool {
    node.split_indices.len() <= edge.len() && node.split_indices.iter().all(|x| edge.contains(x))
}

/// Normalize a typed edge input into a set.
pub fn resolve_edge_input(input: EdgeInput<'_>) -> LeafSet {
    match input {
        EdgeInput::Set(set) => set.clone(),
        EdgeInput::Sorted(indices) => indices.iter().copied().collect(),
        EdgeInput::Null => LeafSet::new(),
    }
}

/// Normalize a JSON edge value into a set.
///
/// `null` yields an empty set and an array of non-negative integers yields
/// its set. Any other shape returns `fallback`.
pub fn resolve_active_edge_set(input: &serde_json::Value, fallback: &LeafSet) -> LeafSet {
    try_resolve_active_edge_set(input).unwrap_or_else(|| fallback.clone())
}

/// Like [`resolve_active_edge_set`] but reports unknown shapes as `None`.
pub fn try_resolve_active_edge_set(input: &serde_json::Value) -> Option<LeafSet> {
    match input {
        serde_json::Value::Null => Some(LeafSet::new()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

/// Nodes of `tree` that should be drawn as part of the change-edge highlight,
/// in pre-order: the edge node itself and everything downstream of it.
pub fn downstream_nodes<'a>(tree: &'a TreeNode, edge: &'a LeafSet) -> Vec<&'a TreeNode> {
    if edge.is_empty() {
        return Vec::new();
    }
    tree.iter().filter(|n| is_downstream_of(n, edge)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/highlight/change_edge.rs"]
mod tests;
