use super::*;
use crate::foundation::core::leaf_set;
use kurbo::{PathEl, Shape as _};

fn anchor(name: &str, leaf_index: u32, x: f64, y: f64) -> LeafAnchor {
    LeafAnchor {
        name: name.to_owned(),
        leaf_index,
        position: Point::new(x, y),
    }
}

fn sides() -> (Vec<LeafAnchor>, Vec<LeafAnchor>) {
    let left = vec![
        anchor("A", 0, 10.0, 0.0),
        anchor("B", 1, 10.0, 10.0),
        anchor("C", 2, 0.0, 10.0),
    ];
    let right = vec![
        anchor("B", 1, 110.0, 10.0),
        anchor("A", 0, 110.0, 0.0),
        anchor("D", 3, 100.0, 10.0),
    ];
    (left, right)
}

#[test]
fn connects_named_pairs_inside_jumping_subtrees() {
    let (left, right) = sides();
    let subtrees = [leaf_set([0, 1])];
    let out = build_connectors(
        &left,
        &right,
        Point::ZERO,
        Point::new(100.0, 0.0),
        &subtrees,
        ConnectorOpts::default(),
    );
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(out[0].to, Point::new(110.0, 0.0));
    assert!(out.iter().all(|c| c.subtree == 0));
}

#[test]
fn leaves_outside_subtrees_or_unmatched_are_skipped() {
    let (left, right) = sides();
    // C is in the subtree but has no partner on the right.
    let out = build_connectors(
        &left,
        &right,
        Point::ZERO,
        Point::new(100.0, 0.0),
        &[leaf_set([2])],
        ConnectorOpts::default(),
    );
    assert!(out.is_empty());
    assert!(!in_jumping_subtree(3, &[leaf_set([0, 1])]));
    assert!(in_jumping_subtree(1, &[leaf_set([2]), leaf_set([1])]));
}

#[test]
fn leaf_in_several_subtrees_gets_one_connector() {
    let (left, right) = sides();
    let out = build_connectors(
        &left,
        &right,
        Point::ZERO,
        Point::new(100.0, 0.0),
        &[leaf_set([0]), leaf_set([0, 1])],
        ConnectorOpts::default(),
    );
    let names: Vec<(&str, usize)> = out.iter().map(|c| (c.name.as_str(), c.subtree)).collect();
    assert_eq!(names, vec![("A", 0), ("B", 1)]);
}

#[test]
fn paths_are_two_quads_through_bundle_points() {
    let (left, right) = sides();
    let out = build_connectors(
        &left,
        &right,
        Point::ZERO,
        Point::new(100.0, 0.0),
        &[leaf_set([0])],
        ConnectorOpts {
            bundle_radius_factor: 2.0,
        },
    );
    let els: Vec<PathEl> = out[0].path.elements().to_vec();
    assert_eq!(els.len(), 3);
    assert_eq!(els[0], PathEl::MoveTo(Point::new(10.0, 0.0)));
    // Single-leaf subtree: bundle points sit at twice the leaf offset from each center.
    let lb = Point::new(20.0, 0.0);
    let rb = Point::new(120.0, 0.0);
    assert_eq!(els[1], PathEl::QuadTo(lb, lb.midpoint(rb)));
    assert_eq!(els[2], PathEl::QuadTo(rb, Point::new(110.0, 0.0)));
    assert!(out[0].path.bounding_box().width() > 0.0);
}
