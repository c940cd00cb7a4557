use std::fmt;

use crate::foundation::core::LeafSet;
use crate::highlight::change_edge::try_resolve_active_edge_set;
use crate::payload::model::{MovieData, WireLeafSet};
use crate::payload::tree::TreeNode;
use crate::timeline::resolver::{FrameKind, TransitionResolver};

/// Stable codes for validator findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// `tree_list` is absent.
    MissingTreeList,
    /// `tree_names` is absent.
    MissingTreeNames,
    /// `tree_list` and `tree_names` differ in length.
    FrameCountMismatch,
    /// No frame is named like a full tree.
    NoFullTrees,
    /// A frame is not a tree-shaped object.
    FrameNonconforming,
    /// A highlight array is not parallel to the original transitions.
    HighlightLengthMismatch,
    /// A distance array differs from `M - 1` in length.
    DistanceLengthDrift,
    /// A distance array is absent although there are transitions.
    DistancesMissing,
    /// Full-tree numbers are not `0, 1, 2, ...`.
    NonConsecutiveFullTrees,
    /// A distance value is null, NaN or outside `[0, 1]`.
    InvalidDistance,
    /// A scale entry is missing or not positive.
    NonPositiveScale,
    /// `scale_list` is not parallel to the frames.
    ScaleLengthMismatch,
    /// A tracking array is not parallel to the frames.
    TrackingLengthMismatch,
    /// A tracking entry is neither null nor a leaf-index array.
    TrackingEntryMalformed,
    /// Some transitions have very few intermediates.
    SparseInterpolation,
    /// Transitions have very many intermediates on average.
    DenseInterpolation,
    /// A frame name matches no known pattern.
    UnrecognizedFrameName,
    /// The first or last frame is not a full tree; fatal.
    BoundaryNotFull,
    /// A node's `split_indices` is not strictly increasing.
    UnsortedSplit,
    /// Alignment window parameters are zero.
    InvalidWindow,
}

impl DiagnosticCode {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingTreeList => "missing_tree_list",
            Self::MissingTreeNames => "missing_tree_names",
            Self::FrameCountMismatch => "frame_count_mismatch",
            Self::NoFullTrees => "no_full_trees",
            Self::FrameNonconforming => "frame_nonconforming",
            Self::HighlightLengthMismatch => "highlight_length_mismatch",
            Self::DistanceLengthDrift => "distance_length_drift",
            Self::DistancesMissing => "distances_missing",
            Self::NonConsecutiveFullTrees => "non_consecutive_full_trees",
            Self::InvalidDistance => "invalid_distance",
            Self::NonPositiveScale => "non_positive_scale",
            Self::ScaleLengthMismatch => "scale_length_mismatch",
            Self::TrackingLengthMismatch => "tracking_length_mismatch",
            Self::TrackingEntryMalformed => "tracking_entry_malformed",
            Self::SparseInterpolation => "sparse_interpolation",
            Self::DenseInterpolation => "dense_interpolation",
            Self::UnrecognizedFrameName => "unrecognized_frame_name",
            Self::BoundaryNotFull => "boundary_not_full",
            Self::UnsortedSplit => "unsorted_split",
            Self::InvalidWindow => "invalid_window",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElem {
    Field(&'static str),
    Index(usize),
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// One validator finding.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// Stable code.
    pub code: DiagnosticCode,
    /// JSON-path-like location (`$.tree_list[3]`).
    pub path: String,
    /// One-line human message.
    pub message: String,
}

impl Diagnostic {
    fn at(code: DiagnosticCode, path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            code,
            path: format_path(path),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.as_str(), self.path, self.message)
    }
}

/// Outcome of payload validation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ValidationReport {
    /// Fatal findings; any entry prevents playback.
    pub issues: Vec<Diagnostic>,
    /// Soft findings; playback continues.
    pub warnings: Vec<Diagnostic>,
    /// Suggestions for the upstream producer.
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Return `true` when there are no fatal issues.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Return `true` when any issue or warning carries `code`.
    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.issues
            .iter()
            .chain(self.warnings.iter())
            .any(|d| d.code == code)
    }

    fn recommend(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !self.recommendations.contains(&text) {
            self.recommendations.push(text);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.issues.iter().chain(self.warnings.iter()).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

/// Thresholds used by the validator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValidationOpts {
    /// Largest tolerated `|len(distances) - (M - 1)|` before the payload is rejected.
    pub distance_drift_tolerance: usize,
    /// Transitions with fewer intermediates than this are reported as sparse.
    pub sparse_gap_threshold: usize,
    /// Average intermediates per transition above this are reported as dense.
    pub dense_average_threshold: f64,
}

impl Default for ValidationOpts {
    fn default() -> Self {
        Self {
            distance_drift_tolerance: 5,
            sparse_gap_threshold: 3,
            dense_average_threshold: 20.0,
        }
    }
}

/// Check a payload against the engine contract.
///
/// This is a pure check; [`Movie::ingest`](crate::payload::movie::Movie::ingest)
/// runs the same pass and also keeps the converted frames.
#[tracing::instrument(skip_all)]
pub fn validate_movie(data: &MovieData, opts: &ValidationOpts) -> ValidationReport {
    run(data, opts).0
}

pub(crate) struct Converted {
    pub(crate) frames: Vec<TreeNode>,
    pub(crate) resolver: TransitionResolver,
    pub(crate) subtree_tracking: Vec<LeafSet>,
    pub(crate) active_edges: Vec<LeafSet>,
}

pub(crate) fn run(data: &MovieData, opts: &ValidationOpts) -> (ValidationReport, Option<Converted>) {
    let mut report = ValidationReport::default();

    let Some(tree_list) = data.tree_list.as_ref() else {
        report.issues.push(Diagnostic::at(
            DiagnosticCode::MissingTreeList,
            &[PathElem::Field("tree_list")],
            "tree_list is required",
        ));
        if data.tree_names.is_none() {
            report.issues.push(missing_names());
        }
        return (report, None);
    };
    let Some(names) = data.tree_names.as_ref() else {
        report.issues.push(missing_names());
        return (report, None);
    };

    let n = tree_list.len();
    if names.len() != n {
        report.issues.push(Diagnostic::at(
            DiagnosticCode::FrameCountMismatch,
            &[PathElem::Field("tree_names")],
            format!("tree_names has {} entries but tree_list has {n}", names.len()),
        ));
    }

    let resolver = TransitionResolver::new(names);
    let m = resolver.full_tree_count();
    if m == 0 {
        report.issues.push(Diagnostic::at(
            DiagnosticCode::NoFullTrees,
            &[PathElem::Field("tree_names")],
            "no frame is named like a full tree (T<k>)",
        ));
    }

    let frames = convert_frames(tree_list, &mut report);

    check_names(&resolver, names, &mut report);
    check_highlights(data, m, &mut report);
    check_distances(data, m, opts, &mut report);
    check_scales(data, n, &mut report);
    let subtree_tracking = normalize_tracking(
        &data.subtree_tracking,
        "subtree_tracking",
        n,
        &mut report,
    );
    let active_edges = normalize_tracking(
        &data.active_change_edge_tracking,
        "active_change_edge_tracking",
        n,
        &mut report,
    );
    check_density(&resolver, opts, &mut report);
    check_window(data, &mut report);

    if report.is_valid() {
        tracing::debug!(
            frames = n,
            full_trees = m,
            warnings = report.warnings.len(),
            "payload validated"
        );
        let converted = Converted {
            frames,
            resolver,
            subtree_tracking,
            active_edges,
        };
        (report, Some(converted))
    } else {
        tracing::warn!(issues = report.issues.len(), "payload rejected");
        (report, None)
    }
}

fn missing_names() -> Diagnostic {
    Diagnostic::at(
        DiagnosticCode::MissingTreeNames,
        &[PathElem::Field("tree_names")],
        "tree_names is required",
    )
}

fn convert_frames(tree_list: &[serde_json::Value], report: &mut ValidationReport) -> Vec<TreeNode> {
    let mut frames = Vec::with_capacity(tree_list.len());
    for (i, value) in tree_list.iter().enumerate() {
        let path = [PathElem::Field("tree_list"), PathElem::Index(i)];
        if !value.is_object() {
            report.issues.push(Diagnostic::at(
                DiagnosticCode::FrameNonconforming,
                &path,
                "frame must be a tree object",
            ));
            continue;
        }
        match serde_json::from_value::<TreeNode>(value.clone()) {
            Ok(tree) if !tree.has_splits() => report.issues.push(Diagnostic::at(
                DiagnosticCode::FrameNonconforming,
                &path,
                "every node needs a non-empty split_indices",
            )),
            Ok(tree) => {
                if !tree.has_sorted_splits() {
                    report.warnings.push(Diagnostic::at(
                        DiagnosticCode::UnsortedSplit,
                        &path,
                        "split_indices are not strictly increasing",
                    ));
                }
                frames.push(tree);
            }
            Err(e) => report.issues.push(Diagnostic::at(
                DiagnosticCode::FrameNonconforming,
                &path,
                format!("frame does not match {{children, split_indices, name?}}: {e}"),
            )),
        }
    }
    frames
}

fn check_names(resolver: &TransitionResolver, names: &[String], report: &mut ValidationReport) {
    for (i, class) in resolver.classes().iter().enumerate() {
        if !class.recognized {
            report.warnings.push(Diagnostic::at(
                DiagnosticCode::UnrecognizedFrameName,
                &[PathElem::Field("tree_names"), PathElem::Index(i)],
                format!("'{}' matches no known frame pattern; treated as intermediate", names[i]),
            ));
        }
    }

    let numbers = resolver.full_indices().iter().filter_map(|&t| match resolver.kind(t) {
        Some(FrameKind::Full { number }) => Some((t, number)),
        _ => None,
    });
    for (expected, (t, number)) in numbers.enumerate() {
        if number as usize != expected {
            report.warnings.push(Diagnostic::at(
                DiagnosticCode::NonConsecutiveFullTrees,
                &[PathElem::Field("tree_names"), PathElem::Index(t)],
                format!("expected T{expected}, found T{number}"),
            ));
            break;
        }
    }

    let n = resolver.len();
    if n > 0 && resolver.full_tree_count() > 0 {
        for t in [0, n - 1] {
            if !resolver.is_full_tree(t) {
                report.issues.push(Diagnostic::at(
                    DiagnosticCode::BoundaryNotFull,
                    &[PathElem::Field("tree_names"), PathElem::Index(t)],
                    "movies must start and end on a full tree",
                ));
            }
        }
    }
}

fn check_highlights(data: &MovieData, m: usize, report: &mut ValidationReport) {
    let Some(highlight) = data.highlight_data.as_ref() else {
        return;
    };
    let expected = m.saturating_sub(1);
    let fields: [(&'static str, Option<&Vec<Vec<WireLeafSet>>>); 3] = [
        ("jumping_taxa", highlight.jumping_taxa.as_ref()),
        ("s_edges", highlight.s_edges.as_ref()),
        ("covers", highlight.covers.as_ref()),
    ];
    for (name, field) in fields {
        let Some(values) = field else { continue };
        if values.len() != expected {
            report.issues.push(Diagnostic::at(
                DiagnosticCode::HighlightLengthMismatch,
                &[PathElem::Field("highlight_data"), PathElem::Field(name)],
                format!(
                    "{name} has {} entries; expected one per transition ({expected})",
                    values.len()
                ),
            ));
        }
    }
}

fn check_distances(data: &MovieData, m: usize, opts: &ValidationOpts, report: &mut ValidationReport) {
    let expected = m.saturating_sub(1);
    let lists: [(&'static str, &Vec<Option<f64>>); 2] = [
        ("rfd_list", &data.rfd_list),
        ("weighted_rfd_list", &data.weighted_rfd_list),
    ];
    for (name, values) in lists {
        let path = [PathElem::Field(name)];
        if values.is_empty() {
            if expected > 0 {
                report.warnings.push(Diagnostic::at(
                    DiagnosticCode::DistancesMissing,
                    &path,
                    format!("{name} is empty; distance readouts are unavailable"),
                ));
            }
            continue;
        }

        let drift = values.len().abs_diff(expected);
        if drift > opts.distance_drift_tolerance {
            report.issues.push(Diagnostic::at(
                DiagnosticCode::DistanceLengthDrift,
                &path,
                format!(
                    "{name} has {} entries for {expected} transitions (drift {drift} > {})",
                    values.len(),
                    opts.distance_drift_tolerance
                ),
            ));
        } else if drift > 0 {
            report.warnings.push(Diagnostic::at(
                DiagnosticCode::DistanceLengthDrift,
                &path,
                format!(
                    "{name} has {} entries for {expected} transitions",
                    values.len()
                ),
            ));
        }

        for (i, v) in values.iter().enumerate() {
            let valid = v.is_some_and(|d| d.is_finite() && (0.0..=1.0).contains(&d));
            if !valid {
                report.warnings.push(Diagnostic::at(
                    DiagnosticCode::InvalidDistance,
                    &[PathElem::Field(name), PathElem::Index(i)],
                    format!("distance {v:?} is not a normalized value in [0, 1]"),
                ));
            }
        }
    }
}

fn check_scales(data: &MovieData, n: usize, report: &mut ValidationReport) {
    if data.scale_list.len() != n {
        report.warnings.push(Diagnostic::at(
            DiagnosticCode::ScaleLengthMismatch,
            &[PathElem::Field("scale_list")],
            format!(
                "scale_list has {} entries for {n} frames; missing scales default to 1",
                data.scale_list.len()
            ),
        ));
    }
    for (i, s) in data.scale_list.iter().enumerate() {
        if !s.is_some_and(|v| v.is_finite() && v > 0.0) {
            report.warnings.push(Diagnostic::at(
                DiagnosticCode::NonPositiveScale,
                &[PathElem::Field("scale_list"), PathElem::Index(i)],
                format!("scale {s:?} must be a positive number; using 1"),
            ));
        }
    }
}

fn normalize_tracking(
    entries: &[serde_json::Value],
    name: &'static str,
    n: usize,
    report: &mut ValidationReport,
) -> Vec<LeafSet> {
    if entries.len() != n {
        report.warnings.push(Diagnostic::at(
            DiagnosticCode::TrackingLengthMismatch,
            &[PathElem::Field(name)],
            format!("{name} has {} entries for {n} frames", entries.len()),
        ));
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, v)| {
            try_resolve_active_edge_set(v).unwrap_or_else(|| {
                report.warnings.push(Diagnostic::at(
                    DiagnosticCode::TrackingEntryMalformed,
                    &[PathElem::Field(name), PathElem::Index(i)],
                    "expected null or an array of leaf indices",
                ));
                LeafSet::new()
            })
        })
        .collect()
}

fn check_density(resolver: &TransitionResolver, opts: &ValidationOpts, report: &mut ValidationReport) {
    let gaps = resolver.intermediates_per_transition();
    if gaps.is_empty() {
        return;
    }

    let sparse = gaps
        .iter()
        .filter(|&&g| g < opts.sparse_gap_threshold)
        .count();
    if sparse > 0 {
        report.warnings.push(Diagnostic::at(
            DiagnosticCode::SparseInterpolation,
            &[PathElem::Field("tree_names")],
            format!(
                "{sparse} of {} transitions have fewer than {} intermediate frames",
                gaps.len(),
                opts.sparse_gap_threshold
            ),
        ));
        report.recommend("increase interpolation density so transitions animate smoothly");
    }

    let average = gaps.iter().sum::<usize>() as f64 / gaps.len() as f64;
    if average > opts.dense_average_threshold {
        report.warnings.push(Diagnostic::at(
            DiagnosticCode::DenseInterpolation,
            &[PathElem::Field("tree_names")],
            format!(
                "{average:.1} intermediate frames per transition on average (> {})",
                opts.dense_average_threshold
            ),
        ));
        report.recommend("reduce interpolation density to shorten the movie and the payload");
    }
}

fn check_window(data: &MovieData, report: &mut ValidationReport) {
    if data.msa.is_none() {
        report.recommend("attach an alignment to enable MSA window sync");
        return;
    }
    let (window, step) = data.window_params();
    if window == 0 || step == 0 {
        report.warnings.push(Diagnostic::at(
            DiagnosticCode::InvalidWindow,
            &[PathElem::Field("msa")],
            format!("window_size ({window}) and step_size ({step}) must be at least 1"),
        ));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/payload/validate.rs"]
mod tests;
