//! Change-edge predicates and jumping-subtree connectors.

/// Active change edge and downstream predicates.
pub mod change_edge;
/// Bundled connectors between matching leaves of two trees.
pub mod connectors;
