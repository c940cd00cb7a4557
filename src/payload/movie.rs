use crate::foundation::core::LeafSet;
use crate::foundation::error::{PhyloError, PhyloResult};
use crate::payload::model::{MovieData, MsaData, WireLeafSet};
use crate::payload::tree::TreeNode;
use crate::payload::validate::{ValidationOpts, ValidationReport, run};
use crate::timeline::resolver::TransitionResolver;

/// A validated payload plus the indices derived from it at load time.
///
/// Immutable for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct Movie {
    frames: Vec<TreeNode>,
    names: Vec<String>,
    resolver: TransitionResolver,
    subtree_tracking: Vec<LeafSet>,
    active_edges: Vec<LeafSet>,
    scales: Vec<f64>,
    jumping_subtrees: Vec<Vec<LeafSet>>,
    s_edges: Vec<Vec<LeafSet>>,
    covers: Vec<Vec<LeafSet>>,
    rfd: Vec<Option<f64>>,
    weighted_rfd: Vec<Option<f64>>,
    sorted_leaves: Vec<String>,
    msa: Option<MsaData>,
    window: (u32, u32),
    file_name: Option<String>,
}

fn to_sets(per_transition: Option<&Vec<Vec<WireLeafSet>>>) -> Vec<Vec<LeafSet>> {
    per_transition
        .map(|v| {
            v.iter()
                .map(|sets| sets.iter().map(|s| s.iter().copied().collect()).collect())
                .collect()
        })
        .unwrap_or_default()
}

static EMPTY_SET: LeafSet = LeafSet::new();

impl Movie {
    /// Validate `data` and build the derived indices.
    ///
    /// Fails with [`PhyloError::PayloadInvalid`] when the report has fatal
    /// issues; otherwise returns the movie together with its warnings.
    pub fn ingest(data: MovieData, opts: &ValidationOpts) -> PhyloResult<(Self, ValidationReport)> {
        let data = data.normalized();
        let (report, converted) = run(&data, opts);
        let Some(converted) = converted else {
            return Err(PhyloError::payload_invalid(report));
        };

        let window = data.window_params();
        let MovieData {
            tree_names,
            rfd_list,
            weighted_rfd_list,
            highlight_data,
            scale_list,
            sorted_leaves,
            msa,
            file_name,
            ..
        } = data;

        let scales = scale_list
            .iter()
            .map(|s| s.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(1.0))
            .collect();
        let highlight = highlight_data.unwrap_or_default();

        let movie = Self {
            frames: converted.frames,
            names: tree_names.unwrap_or_default(),
            resolver: converted.resolver,
            subtree_tracking: converted.subtree_tracking,
            active_edges: converted.active_edges,
            scales,
            jumping_subtrees: to_sets(highlight.jumping_taxa.as_ref()),
            s_edges: to_sets(highlight.s_edges.as_ref()),
            covers: to_sets(highlight.covers.as_ref()),
            rfd: rfd_list,
            weighted_rfd: weighted_rfd_list,
            sorted_leaves,
            msa,
            window,
            file_name,
        };
        Ok((movie, report))
    }

    /// Number of interpolated frames `N`.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the movie has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame `t`.
    pub fn frame(&self, t: usize) -> Option<&TreeNode> {
        self.frames.get(t)
    }

    /// All frames.
    pub fn frames(&self) -> &[TreeNode] {
        &self.frames
    }

    /// Name of frame `t`.
    pub fn name(&self, t: usize) -> Option<&str> {
        self.names.get(t).map(String::as_str)
    }

    /// Frame classifier.
    pub fn resolver(&self) -> &TransitionResolver {
        &self.resolver
    }

    /// Moving subtree at frame `t` (empty when untracked).
    pub fn subtree(&self, t: usize) -> &LeafSet {
        self.subtree_tracking.get(t).unwrap_or(&EMPTY_SET)
    }

    /// Active change edge at frame `t` (empty when untracked).
    pub fn active_change_edge(&self, t: usize) -> &LeafSet {
        self.active_edges.get(t).unwrap_or(&EMPTY_SET)
    }

    /// Coordinate scale at frame `t` (1 when missing).
    pub fn scale(&self, t: usize) -> f64 {
        self.scales.get(t).copied().unwrap_or(1.0)
    }

    /// Jumping subtrees of original transition `i`.
    pub fn jumping_subtrees(&self, i: usize) -> &[LeafSet] {
        self.jumping_subtrees.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    /// Lattice edges of original transition `i`.
    pub fn s_edges(&self, i: usize) -> &[LeafSet] {
        self.s_edges.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cover sets of original transition `i`.
    pub fn covers(&self, i: usize) -> &[LeafSet] {
        self.covers.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    /// Union of all jumping subtrees of transition `i`.
    pub fn highlighted_leaves(&self, i: usize) -> LeafSet {
        self.jumping_subtrees(i).iter().flatten().copied().collect()
    }

    /// Robinson-Foulds distance of transition `i`.
    pub fn rfd(&self, i: usize) -> Option<f64> {
        self.rfd.get(i).copied().flatten()
    }

    /// Weighted Robinson-Foulds distance of transition `i`.
    pub fn weighted_rfd(&self, i: usize) -> Option<f64> {
        self.weighted_rfd.get(i).copied().flatten()
    }

    /// Canonical leaf ordering.
    pub fn sorted_leaves(&self) -> &[String] {
        &self.sorted_leaves
    }

    /// Leaf name for a leaf index, via `sorted_leaves`.
    pub fn leaf_name(&self, index: u32) -> Option<&str> {
        self.sorted_leaves.get(index as usize).map(String::as_str)
    }

    /// Attached alignment, if any.
    pub fn msa(&self) -> Option<&MsaData> {
        self.msa.as_ref()
    }

    /// Declared `(window_size, step_size)`.
    pub fn window_params(&self) -> (u32, u32) {
        self.window
    }

    /// Source file name.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/payload/movie.rs"]
mod tests;
