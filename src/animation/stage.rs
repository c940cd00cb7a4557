use std::collections::BTreeSet;

use crate::payload::tree::{NodeKey, TreeNode};

/// Visual stage of a frame-to-frame transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Nodes disappear (possibly while others appear).
    Collapse,
    /// Same node set; only positions change.
    Reorder,
    /// Nodes appear.
    Expand,
}

impl Stage {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collapse => "COLLAPSE",
            Self::Reorder => "REORDER",
            Self::Expand => "EXPAND",
        }
    }
}

/// Classify a transition from its node-id sets.
///
/// Exiting nodes win over entering ones.
pub fn detect_stage_from_keys<K: Ord>(from: &BTreeSet<K>, to: &BTreeSet<K>) -> Stage {
    if from.difference(to).next().is_some() {
        Stage::Collapse
    } else if to.difference(from).next().is_some() {
        Stage::Expand
    } else {
        Stage::Reorder
    }
}

/// Classify the transition between two frames.
///
/// Missing frames, and frames without any identifiable node, yield
/// [`Stage::Reorder`].
pub fn detect_stage(from: Option<&TreeNode>, to: Option<&TreeNode>) -> Stage {
    let (Some(from), Some(to)) = (from, to) else {
        return Stage::Reorder;
    };
    let from_keys: BTreeSet<NodeKey> = from.node_keys();
    let to_keys: BTreeSet<NodeKey> = to.node_keys();
    if from_keys.is_empty() || to_keys.is_empty() {
        return Stage::Reorder;
    }
    detect_stage_from_keys(&from_keys, &to_keys)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/stage.rs"]
mod tests;
