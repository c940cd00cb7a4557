use std::collections::BTreeSet;

use crate::foundation::core::LeafSet;

/// One node of an interpolated tree frame.
///
/// This is the minimal capability the engine needs from upstream frames:
/// `children`, `split_indices` and an optional `name`. Any other fields the
/// upstream service attaches (branch values, metadata) are ignored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TreeNode {
    /// Leaf or internal node label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Branch length, if the upstream service provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Sorted leaf indices beneath this node (the node's split).
    #[serde(default)]
    pub split_indices: Vec<u32>,
    /// Child nodes; empty for leaves.
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// Canonical identity of a node within a frame.
///
/// Internal edges are identified by their split. Nodes without split data fall
/// back to their name so that hand-built frames can still be compared.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    /// Identity by sorted split indices.
    Split(Vec<u32>),
    /// Identity by node name.
    Name(String),
}

impl TreeNode {
    /// Leaf node with a single split index.
    pub fn leaf(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: Some(name.into()),
            length: None,
            split_indices: vec![index],
            children: Vec::new(),
        }
    }

    /// Internal node whose split is the union of its children's splits.
    pub fn internal(children: Vec<TreeNode>) -> Self {
        let mut split: Vec<u32> = children
            .iter()
            .flat_map(|c| c.split_indices.iter().copied())
            .collect();
        split.sort_unstable();
        split.dedup();
        Self {
            name: None,
            length: None,
            split_indices: split,
            children,
        }
    }

    /// Return `true` for nodes without children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The node's split as a [`LeafSet`].
    pub fn split_set(&self) -> LeafSet {
        self.split_indices.iter().copied().collect()
    }

    /// Identity used by the stage detector, or `None` for anonymous nodes
    /// without split data.
    pub fn key(&self) -> Option<NodeKey> {
        if !self.split_indices.is_empty() {
            return Some(NodeKey::Split(self.split_indices.clone()));
        }
        self.name.clone().map(NodeKey::Name)
    }

    /// Collect the identity of every node in this subtree.
    pub fn node_keys(&self) -> BTreeSet<NodeKey> {
        let mut out = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(key) = node.key() {
                out.insert(key);
            }
            stack.extend(node.children.iter());
        }
        out
    }

    /// Depth-first pre-order iterator over this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Leaves of this subtree in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> {
        self.iter().filter(|n| n.is_leaf())
    }

    /// Return `true` when every node in this subtree carries a split.
    pub fn has_splits(&self) -> bool {
        self.iter().all(|n| !n.split_indices.is_empty())
    }

    /// Return `true` when `split_indices` is strictly increasing at every node.
    pub fn has_sorted_splits(&self) -> bool {
        self.iter()
            .all(|n| n.split_indices.windows(2).all(|w| w[0] < w[1]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/payload/tree.rs"]
mod tests;
