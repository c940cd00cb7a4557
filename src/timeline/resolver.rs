use std::ops::RangeInclusive;

/// Kind of an interpolated frame, derived from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum FrameKind {
    /// An uploaded tree `T<number>`.
    Full {
        /// Number parsed from the name.
        number: u32,
    },
    /// A synthetic tween frame.
    Intermediate,
    /// A consensus frame `C_<number>`.
    Consensus {
        /// Number parsed from the name.
        number: u32,
    },
}

/// Interpolation phase a frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FramePhase {
    /// An uploaded tree.
    Original,
    /// Branches of the change edge shrinking.
    Down,
    /// Collapsed consensus topology.
    Collapse,
    /// Leaves reordering inside the collapsed topology.
    Reorder,
    /// Branches growing towards the target topology.
    PreSnap,
    /// Snapping onto the target reference lengths.
    Snap,
    /// No phase marker in the name.
    Unknown,
}

impl FramePhase {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Down => "DOWN",
            Self::Collapse => "COLLAPSE",
            Self::Reorder => "REORDER",
            Self::PreSnap => "PRE_SNAP",
            Self::Snap => "SNAP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Classification of one frame name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameClass {
    /// Frame kind.
    #[serde(flatten)]
    pub kind: FrameKind,
    /// Interpolation phase.
    pub phase: FramePhase,
    /// `false` when the name matched no known pattern (classified as intermediate).
    pub recognized: bool,
}

impl FrameClass {
    /// Return `true` for uploaded trees.
    pub fn is_full(&self) -> bool {
        matches!(self.kind, FrameKind::Full { .. })
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn phase_from_markers(name: &str) -> FramePhase {
    if name.contains("_down_") {
        FramePhase::Down
    } else if name.contains("_reorder") {
        FramePhase::Reorder
    } else if name.starts_with('C') {
        FramePhase::Collapse
    } else if name.contains("_up_") {
        FramePhase::PreSnap
    } else if name.contains("_ref_") {
        FramePhase::Snap
    } else {
        FramePhase::Unknown
    }
}

/// Classify a frame by its name.
///
/// - `T<k>` is a full tree.
/// - `C_<k>` (optionally followed by `_...`) is a consensus frame.
/// - `IT...`, `I<digit>...` or any name carrying a phase marker is an intermediate.
/// - Anything else is treated as an unrecognized intermediate.
pub fn classify_name(name: &str) -> FrameClass {
    let name = name.trim();

    if let Some(number) = name.strip_prefix('T').and_then(parse_number) {
        return FrameClass {
            kind: FrameKind::Full { number },
            phase: FramePhase::Original,
            recognized: true,
        };
    }

    let phase = phase_from_markers(name);

    if let Some(rest) = name.strip_prefix("C_") {
        let digits = rest.split('_').next().unwrap_or_default();
        if let Some(number) = parse_number(digits) {
            return FrameClass {
                kind: FrameKind::Consensus { number },
                phase,
                recognized: true,
            };
        }
    }

    let intermediate_prefix = name.starts_with("IT")
        || (name.starts_with('I')
            && name[1..].chars().next().is_some_and(|c| c.is_ascii_digit()));

    FrameClass {
        kind: FrameKind::Intermediate,
        phase,
        recognized: intermediate_prefix || phase != FramePhase::Unknown,
    }
}

/// Frame classifier and interpolated-index to transition-index mapping.
///
/// Built once from the payload's frame names; immutable afterwards.
#[derive(Clone, Debug)]
pub struct TransitionResolver {
    classes: Vec<FrameClass>,
    full_indices: Vec<usize>,
}

impl TransitionResolver {
    /// Classify every frame name and collect the full-tree indices `P`.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let classes: Vec<FrameClass> = names.iter().map(|n| classify_name(n.as_ref())).collect();
        let full_indices = classes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_full())
            .map(|(i, _)| i)
            .collect();
        Self {
            classes,
            full_indices,
        }
    }

    /// Number of frames `N`.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Return `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Sorted indices of full trees (`P`).
    pub fn full_indices(&self) -> &[usize] {
        &self.full_indices
    }

    /// Number of full trees `M`.
    pub fn full_tree_count(&self) -> usize {
        self.full_indices.len()
    }

    /// Number of original transitions `M - 1` (zero when `M < 2`).
    pub fn transition_count(&self) -> usize {
        self.full_indices.len().saturating_sub(1)
    }

    /// Classification of frame `t`.
    pub fn class(&self, t: usize) -> Option<&FrameClass> {
        self.classes.get(t)
    }

    /// All frame classifications in frame order.
    pub fn classes(&self) -> &[FrameClass] {
        &self.classes
    }

    /// Kind of frame `t`.
    pub fn kind(&self, t: usize) -> Option<FrameKind> {
        self.classes.get(t).map(|c| c.kind)
    }

    /// Return `true` when `t ∈ P`.
    pub fn is_full_tree(&self, t: usize) -> bool {
        self.full_indices.binary_search(&t).is_ok()
    }

    /// Rank of `t` within `P`, if `t` is a full tree.
    pub fn full_rank(&self, t: usize) -> Option<usize> {
        self.full_indices.binary_search(&t).ok()
    }

    /// Original transition index for frame `t`.
    ///
    /// `first_full` only matters when `t` is a full tree: `false` makes it the
    /// end of the previous transition, `true` the start of the next one. The
    /// result is always in `[0, M - 1)` when `M >= 2`, and `0` otherwise.
    pub fn transition_index(&self, t: usize, first_full: bool) -> usize {
        let m = self.full_indices.len();
        if m < 2 {
            return 0;
        }
        let last = m - 2;
        match self.full_indices.binary_search(&t) {
            Ok(rank) if first_full => rank.min(last),
            Ok(rank) => rank.saturating_sub(1),
            Err(0) => 0,
            Err(pos) => (pos - 1).min(last),
        }
    }

    /// Frames spanned by transition `i`: `P[i]..=P[i+1]`.
    pub fn transition_frames(&self, i: usize) -> Option<RangeInclusive<usize>> {
        let start = *self.full_indices.get(i)?;
        let end = *self.full_indices.get(i + 1)?;
        Some(start..=end)
    }

    /// Number of non-full frames strictly between consecutive full trees.
    pub fn intermediates_per_transition(&self) -> Vec<usize> {
        self.full_indices
            .windows(2)
            .map(|w| w[1] - w[0] - 1)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolver.rs"]
mod tests;
