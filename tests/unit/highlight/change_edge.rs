use super::*;
use crate::foundation::core::leaf_set;
use serde_json::json;

fn bare(split: &[u32]) -> TreeNode {
    TreeNode {
        split_indices: split.to_vec(),
        ..TreeNode::default()
    }
}

fn tree() -> TreeNode {
    TreeNode::internal(vec![
        TreeNode::internal(vec![TreeNode::leaf("A", 0), TreeNode::leaf("B", 1)]),
        TreeNode::internal(vec![TreeNode::leaf("C", 2), TreeNode::leaf("D", 3)]),
    ])
}

#[test]
fn splits_equal_requires_same_members() {
    let edge = leaf_set([1, 2]);
    assert!(splits_equal(&[1, 2], &edge));
    assert!(!splits_equal(&[1], &edge));
    assert!(!splits_equal(&[1, 3], &edge));
    assert!(!splits_equal(&[1, 2, 3], &edge));
}

#[test]
fn node_and_link_predicates() {
    let t = tree();
    let edge = leaf_set([0, 1]);
    assert!(is_node_active_change_edge(&t.children[0], &edge));
    assert!(!is_node_active_change_edge(&t, &edge));
    let link = Link {
        source: &t,
        target: &t.children[0],
    };
    assert!(is_link_active_change_edge(link, &edge));
    let other = Link {
        source: &t,
        target: &t.children[1],
    };
    assert!(!is_link_active_change_edge(other, &edge));
}

#[test]
fn parent_matches_through_direct_children_only() {
    let t = tree();
    assert!(node_or_parent_matches_active_edge(&t, &leaf_set([0, 1])));
    assert!(node_or_parent_matches_active_edge(&t.children[0], &leaf_set([0])));
    // Grandchildren do not count.
    assert!(!node_or_parent_matches_active_edge(&t, &leaf_set([0])));
}

#[test]
fn downstream_is_non_larger_subset() {
    let edge = leaf_set([0, 1, 2]);
    assert!(is_downstream_of(&bare(&[0, 1]), &edge));
    assert!(is_downstream_of(&bare(&[0, 1, 2]), &edge));
    assert!(!is_downstream_of(&bare(&[0, 3]), &edge));
    assert!(!is_downstream_of(&bare(&[0, 1, 2, 3]), &edge));
    // Equal size but different members.
    assert!(!is_downstream_of(&bare(&[0, 1, 3]), &leaf_set([0, 1, 2])));
}

#[test]
fn predicate_chain_on_real_trees() {
    let t = tree();
    let edges = [leaf_set([]), leaf_set([0]), leaf_set([0, 1]), leaf_set([2, 3]), leaf_set([0, 1, 2, 3])];
    for edge in &edges {
        for node in t.iter() {
            let own = splits_equal(&node.split_indices, edge);
            let matches = node_or_parent_matches_active_edge(node, edge);
            if own {
                assert!(matches);
                assert!(is_downstream_of(node, edge));
            } else if matches {
                // Matched through a child: the node is the edge's parent and
                // strictly larger than the edge.
                assert!(node.children.iter().any(|c| splits_equal(&c.split_indices, edge)));
                assert!(!is_downstream_of(node, edge));
            }
        }
    }
}

#[test]
fn parent_of_edge_is_highlighted_but_not_downstream() {
    let t = tree();
    let edge = leaf_set([0, 1]);
    assert!(node_or_parent_matches_active_edge(&t, &edge));
    assert!(!is_downstream_of(&t, &edge));
    assert!(!downstream_nodes(&t, &edge).iter().any(|n| std::ptr::eq(*n, &t)));
}

#[test]
fn edge_inputs_normalize() {
    let set = leaf_set([4, 2]);
    assert_eq!(resolve_edge_input(EdgeInput::Set(&set)), set);
    assert_eq!(resolve_edge_input(EdgeInput::Sorted(&[2, 4])), set);
    assert!(resolve_edge_input(EdgeInput::Null).is_empty());
}

#[test]
fn json_edges_normalize_with_fallback() {
    let fallback = leaf_set([9]);
    assert!(resolve_active_edge_set(&json!(null), &fallback).is_empty());
    assert_eq!(
        resolve_active_edge_set(&json!([3, 1, 3]), &fallback),
        leaf_set([1, 3])
    );
    assert_eq!(resolve_active_edge_set(&json!("x"), &fallback), fallback);
    assert_eq!(resolve_active_edge_set(&json!([1, -2]), &fallback), fallback);
    assert_eq!(try_resolve_active_edge_set(&json!({"a": 1})), None);
}

#[test]
fn downstream_nodes_collects_edge_subtree() {
    let t = tree();
    let edge = leaf_set([0, 1]);
    let splits: Vec<&[u32]> = downstream_nodes(&t, &edge)
        .into_iter()
        .map(|n| n.split_indices.as_slice())
        .collect();
    let expected: Vec<&[u32]> = vec![&[0, 1], &[0], &[1]];
    assert_eq!(splits, expected);
    assert!(downstream_nodes(&t, &LeafSet::new()).is_empty());
}
