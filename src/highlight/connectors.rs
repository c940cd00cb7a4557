use std::collections::BTreeMap;

use crate::foundation::core::{BezPath, LeafSet, Point, Vec2};

/// Screen position of one leaf in a side-by-side comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafAnchor {
    /// Leaf name; pairs are matched across trees by name.
    pub name: String,
    /// Leaf index in the canonical ordering.
    pub leaf_index: u32,
    /// Position in the shared coordinate space.
    pub position: Point,
}

/// Connector layout options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorOpts {
    /// Bundle point distance from the tree center, as a multiple of the
    /// distance to the subtree centroid.
    pub bundle_radius_factor: f64,
}

impl Default for ConnectorOpts {
    fn default() -> Self {
        Self {
            bundle_radius_factor: 1.2,
        }
    }
}

/// One bundled connection between matching leaves.
#[derive(Clone, Debug)]
pub struct Connector {
    /// Leaf name shared by both ends.
    pub name: String,
    /// Index of the jumping subtree the left leaf belongs to.
    pub subtree: usize,
    /// Left leaf position.
    pub from: Point,
    /// Right leaf position.
    pub to: Point,
    /// Two quadratic segments through the subtree's bundle points.
    pub path: BezPath,
}

/// Return `true` when `leaf` lies in one of `subtrees`.
pub fn in_jumping_subtree(leaf: u32, subtrees: &[LeafSet]) -> bool {
    subtrees.iter().any(|s| s.contains(&leaf))
}

fn centroid(points: impl Iterator<Item = Point>) -> Option<Point> {
    let (sum, n) = points.fold((Vec2::ZERO, 0usize), |(acc, n), p| (acc + p.to_vec2(), n + 1));
    (n > 0).then(|| (sum / n as f64).to_point())
}

fn bundle_point(center: Point, centroid: Point, factor: f64) -> Point {
    center + (centroid - center) * factor
}

/// Build connectors between left and right leaves.
///
/// A left/right pair is connected when both carry the same name and the
/// left leaf lies in at least one jumping subtree. Each connector runs
/// through two bundle points, one per side, placed on the ray from the
/// tree center through the centroid of the subtree's anchors on that side.
pub fn build_connectors(
    left: &[LeafAnchor],
    right: &[LeafAnchor],
    left_center: Point,
    right_center: Point,
    jumping_subtrees: &[LeafSet],
    opts: ConnectorOpts,
) -> Vec<Connector> {
    let right_by_name: BTreeMap<&str, &LeafAnchor> =
        right.iter().map(|a| (a.name.as_str(), a)).collect();

    let mut out = Vec::new();
    for (si, subtree) in jumping_subtrees.iter().enumerate() {
        let pairs: Vec<(&LeafAnchor, &LeafAnchor)> = left
            .iter()
            .filter(|a| subtree.contains(&a.leaf_index))
            .filter_map(|a| right_by_name.get(a.name.as_str()).map(|b| (a, *b)))
            .collect();
        let (Some(lc), Some(rc)) = (
            centroid(pairs.iter().map(|(a, _)| a.position)),
            centroid(pairs.iter().map(|(_, b)| b.position)),
        ) else {
            continue;
        };
        let lb = bundle_point(left_center, lc, opts.bundle_radius_factor);
        let rb = bundle_point(right_center, rc, opts.bundle_radius_factor);
        let mid = lb.midpoint(rb);

        for (a, b) in pairs {
            // A leaf in several subtrees gets one connector, from the first.
            if in_jumping_subtree(a.leaf_index, &jumping_subtrees[..si]) {
                continue;
            }
            let mut path = BezPath::new();
            path.move_to(a.position);
            path.quad_to(lb, mid);
            path.quad_to(rb, b.position);
            out.push(Connector {
                name: a.name.clone(),
                subtree: si,
                from: a.position,
                to: b.position,
                path,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/highlight/connectors.rs"]
mod tests;
