use std::collections::BTreeSet;

pub use kurbo::{BezPath, Point, QuadBez, Vec2};

/// Unordered set of leaf indices.
///
/// Leaf indices refer to positions in the payload's canonical `sorted_leaves`
/// ordering. A split, an active change edge and a jumping subtree are all
/// described by one of these.
pub type LeafSet = BTreeSet<u32>;

/// Build a [`LeafSet`] from any iterator of leaf indices.
pub fn leaf_set(indices: impl IntoIterator<Item = u32>) -> LeafSet {
    indices.into_iter().collect()
}

/// Clamp a signed index into `[0, len)`.
///
/// Returns the clamped index and whether clamping changed the value. Empty
/// ranges clamp to `0`.
pub fn clamp_index(k: i64, len: usize) -> (usize, bool) {
    if len == 0 {
        return (0, k != 0);
    }
    let max = (len - 1) as i64;
    let clamped = k.clamp(0, max);
    (clamped as usize, clamped != k)
}

/// Clamp a playback time into `[0, total_ms]`.
///
/// Non-finite inputs clamp to `0`. Returns the clamped time and whether
/// clamping changed the value.
pub fn clamp_ms(ms: f64, total_ms: f64) -> (f64, bool) {
    if !ms.is_finite() {
        return (0.0, true);
    }
    let clamped = ms.clamp(0.0, total_ms.max(0.0));
    (clamped, clamped != ms)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
