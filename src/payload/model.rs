use crate::foundation::error::{PhyloError, PhyloResult};

/// A subtree or split as it appears on the wire: leaf indices, any order.
pub type WireLeafSet = Vec<u32>;

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Upstream movie payload produced by the tree interpolation service.
///
/// The model is deliberately permissive: required collections are `Option`s
/// so that a missing field becomes a validation issue with a path instead of
/// a deserialization failure, and frames stay raw JSON until
/// [`crate::validate_movie`] converts them to [`crate::TreeNode`]s.
pub struct MovieData {
    /// Interpolated frames, full trees and intermediates alternating.
    #[serde(default, alias = "treeList", skip_serializing_if = "Option::is_none")]
    pub tree_list: Option<Vec<serde_json::Value>>,
    /// One label per frame (`T<k>`, intermediates, `C_<k>`).
    #[serde(default, alias = "treeNames", skip_serializing_if = "Option::is_none")]
    pub tree_names: Option<Vec<String>>,
    /// Robinson-Foulds distance per original transition.
    #[serde(default, alias = "robinsonFouldsDistances")]
    pub rfd_list: Vec<Option<f64>>,
    /// Weighted Robinson-Foulds distance per original transition.
    #[serde(default, alias = "weightedRobinsonFouldsDistances")]
    pub weighted_rfd_list: Vec<Option<f64>>,
    /// Per-transition highlight solutions.
    #[serde(default, alias = "highlightData", skip_serializing_if = "Option::is_none")]
    pub highlight_data: Option<HighlightData>,
    /// Moving subtree per frame (raw; normalized during validation).
    #[serde(default, alias = "subtreeTracking")]
    pub subtree_tracking: Vec<serde_json::Value>,
    /// Active change edge per frame (raw; normalized during validation).
    #[serde(default, alias = "activeChangeEdgeTracking")]
    pub active_change_edge_tracking: Vec<serde_json::Value>,
    /// Coordinate scale per frame.
    #[serde(default, alias = "scaleList")]
    pub scale_list: Vec<Option<f64>>,
    /// Canonical leaf ordering; split indices point into this list.
    #[serde(default, alias = "sortedLeaves")]
    pub sorted_leaves: Vec<String>,
    /// Alignment window width in columns.
    #[serde(default, alias = "windowSize", skip_serializing_if = "Option::is_none")]
    pub window_size: Option<u32>,
    /// Alignment window step in columns.
    #[serde(default, alias = "windowStepSize", skip_serializing_if = "Option::is_none")]
    pub window_step_size: Option<u32>,
    /// Optional multiple sequence alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msa: Option<MsaData>,
    /// Source file name; embedders use it as a cache key.
    #[serde(default, alias = "fileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    // Legacy spellings emitted next to the canonical ones by older backends.
    #[serde(default, skip_serializing)]
    interpolated_trees: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing)]
    wrfd_list: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing)]
    weighted_robinson_foulds_distance_list: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing)]
    lattice_edge_tracking: Option<Vec<serde_json::Value>>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Highlight solutions, parallel to original transitions.
pub struct HighlightData {
    /// Jumping subtrees per transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jumping_taxa: Option<Vec<Vec<WireLeafSet>>>,
    /// Lattice (s-)edges per transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s_edges: Option<Vec<Vec<WireLeafSet>>>,
    /// Cover sets per transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers: Option<Vec<Vec<WireLeafSet>>>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Multiple sequence alignment attached to a movie.
pub struct MsaData {
    /// Aligned sequences.
    #[serde(default)]
    pub sequences: Vec<AlignedSequence>,
    /// Raw alignment text as uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Alignment length in columns, when known upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_length: Option<u32>,
    /// Window width override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_size: Option<u32>,
    /// Window step override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One aligned sequence.
pub struct AlignedSequence {
    /// Taxon name.
    #[serde(alias = "id")]
    pub name: String,
    /// Aligned residues including gaps.
    #[serde(alias = "seq")]
    pub sequence: String,
}

impl MsaData {
    /// Alignment length: the explicit value, else the longest sequence.
    pub fn alignment_length(&self) -> Option<u32> {
        if let Some(len) = self.alignment_length.filter(|&l| l > 0) {
            return Some(len);
        }
        self.sequences
            .iter()
            .map(|s| s.sequence.chars().count())
            .max()
            .filter(|&l| l > 0)
            .map(|l| u32::try_from(l).unwrap_or(u32::MAX))
    }
}

impl MovieData {
    /// Parse a payload from JSON text and fold legacy field spellings.
    pub fn from_json_str(s: &str) -> PhyloResult<Self> {
        let data: MovieData =
            serde_json::from_str(s).map_err(|e| PhyloError::serde(e.to_string()))?;
        Ok(data.normalized())
    }

    /// Parse a payload from a JSON value and fold legacy field spellings.
    pub fn from_value(value: serde_json::Value) -> PhyloResult<Self> {
        let data: MovieData =
            serde_json::from_value(value).map_err(|e| PhyloError::serde(e.to_string()))?;
        Ok(data.normalized())
    }

    /// Move legacy spellings into the canonical fields when those are empty.
    pub fn normalized(mut self) -> Self {
        if let Some(trees) = self.interpolated_trees.take() {
            if self.tree_list.is_none() {
                self.tree_list = Some(trees);
            }
        }
        for legacy in [
            self.wrfd_list.take(),
            self.weighted_robinson_foulds_distance_list.take(),
        ]
        .into_iter()
        .flatten()
        {
            if self.weighted_rfd_list.is_empty() {
                self.weighted_rfd_list = legacy;
            }
        }
        if let Some(tracking) = self.lattice_edge_tracking.take() {
            if self.active_change_edge_tracking.is_empty() {
                self.active_change_edge_tracking = tracking;
            }
        }
        self
    }

    /// Number of interpolated frames (`N`), taken from `tree_list`.
    pub fn frame_count(&self) -> usize {
        self.tree_list.as_ref().map_or(0, Vec::len)
    }

    /// Effective alignment window `(window_size, step_size)`.
    ///
    /// Values on the `msa` object win over the top-level ones; both default
    /// to `1` as the upstream service does.
    pub fn window_params(&self) -> (u32, u32) {
        let msa = self.msa.as_ref();
        let window = msa
            .and_then(|m| m.window_size)
            .or(self.window_size)
            .unwrap_or(1);
        let step = msa
            .and_then(|m| m.step_size)
            .or(self.window_step_size)
            .unwrap_or(1);
        (window, step)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/payload/model.rs"]
mod tests;
