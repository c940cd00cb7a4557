use crate::timeline::resolver::{FrameKind, TransitionResolver};

/// How frame durations are laid out on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SegmentLayout {
    /// One segment per frame. Full trees are zero-duration anchors.
    PerFrame {
        /// Duration of each intermediate frame.
        intermediate_ms: f64,
        /// Duration of each consensus frame.
        consensus_ms: f64,
    },
    /// One grouped segment per original transition; every consecutive frame
    /// pair inside a group gets an equal share of `transition_ms`.
    PerTransition {
        /// Duration of each transition.
        transition_ms: f64,
    },
}

impl Default for SegmentLayout {
    fn default() -> Self {
        Self::PerFrame {
            intermediate_ms: 120.0,
            consensus_ms: 120.0,
        }
    }
}

/// What a segment plays.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentBody {
    /// Tween into frame `i` from its predecessor.
    Frame(usize),
    /// Embedded sub-steps over consecutive member frames.
    Grouped {
        /// Member frame indices in playback order.
        interpolation_data: Vec<usize>,
    },
}

/// One timeline segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Segment content.
    pub body: SegmentBody,
    /// Non-negative duration.
    pub duration_ms: f64,
}

impl Segment {
    /// The frame shown when the segment is rendered without a tween.
    ///
    /// Grouped segments show their first member; an empty group has none.
    pub fn instant_frame(&self) -> Option<usize> {
        match &self.body {
            SegmentBody::Frame(i) => Some(*i),
            SegmentBody::Grouped { interpolation_data } => interpolation_data.first().copied(),
        }
    }

    /// Return `true` when the segment contains frame `t`.
    pub fn contains_frame(&self, t: usize) -> bool {
        match &self.body {
            SegmentBody::Frame(i) => *i == t,
            SegmentBody::Grouped { interpolation_data } => interpolation_data.contains(&t),
        }
    }
}

fn sanitize(ms: f64) -> f64 {
    if ms.is_finite() { ms.max(0.0) } else { 0.0 }
}

/// Cumulative-duration timeline over segments.
///
/// `cumulative[i]` is the end time of segment `i`; segment `i` covers
/// `[cumulative[i - 1], cumulative[i])` with `cumulative[-1] = 0`.
#[derive(Clone, Debug, Default)]
pub struct SegmentModel {
    segments: Vec<Segment>,
    cumulative: Vec<f64>,
}

impl SegmentModel {
    /// One segment per frame with the given durations.
    pub fn from_durations(durations: &[f64]) -> Self {
        Self::from_segments(
            durations
                .iter()
                .enumerate()
                .map(|(i, &d)| Segment {
                    body: SegmentBody::Frame(i),
                    duration_ms: d,
                })
                .collect(),
        )
    }

    /// Build segments from explicit values; negative or non-finite durations become zero.
    pub fn from_segments(mut segments: Vec<Segment>) -> Self {
        let mut total = 0.0;
        let cumulative = segments
            .iter_mut()
            .map(|s| {
                s.duration_ms = sanitize(s.duration_ms);
                total += s.duration_ms;
                total
            })
            .collect();
        Self {
            segments,
            cumulative,
        }
    }

    /// Lay out the frames of `resolver` according to `layout`.
    pub fn build(resolver: &TransitionResolver, layout: &SegmentLayout) -> Self {
        match *layout {
            SegmentLayout::PerFrame {
                intermediate_ms,
                consensus_ms,
            } => {
                let durations: Vec<f64> = resolver
                    .classes()
                    .iter()
                    .map(|c| match c.kind {
                        FrameKind::Full { .. } => 0.0,
                        FrameKind::Consensus { .. } => consensus_ms,
                        FrameKind::Intermediate => intermediate_ms,
                    })
                    .collect();
                Self::from_durations(&durations)
            }
            SegmentLayout::PerTransition { transition_ms } => {
                Self::from_segments(group_segments(resolver, transition_ms))
            }
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return `true` when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment `i`.
    pub fn segment(&self, i: usize) -> Option<&Segment> {
        self.segments.get(i)
    }

    /// Cumulative end times.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Total movie length `L`.
    pub fn total_ms(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Start time of segment `i` (`cumulative[i - 1]`, or `0`).
    pub fn segment_start_ms(&self, i: usize) -> f64 {
        match i {
            0 => 0.0,
            _ => self.cumulative.get(i - 1).copied().unwrap_or_else(|| self.total_ms()),
        }
    }

    /// Segment playing at `ms`.
    ///
    /// Returns the smallest `i` with `ms < cumulative[i]`. Zero-duration
    /// segments sharing a cumulative time with their predecessor are skipped,
    /// so the result always has a positive duration. Returns `None` for
    /// `ms >= L` and for NaN; negative times clamp to `0`.
    pub fn time_to_segment_index(&self, ms: f64) -> Option<usize> {
        if ms.is_nan() {
            return None;
        }
        let ms = ms.max(0.0);
        let i = self.cumulative.partition_point(|&c| c <= ms);
        (i < self.cumulative.len()).then_some(i)
    }

    /// Time at which frame `t` is fully shown.
    pub fn time_of_frame(&self, t: usize) -> Option<f64> {
        for (i, seg) in self.segments.iter().enumerate() {
            match &seg.body {
                SegmentBody::Frame(f) if *f == t => return Some(self.cumulative[i]),
                SegmentBody::Frame(_) => {}
                SegmentBody::Grouped { interpolation_data } => {
                    let Some(pos) = interpolation_data.iter().position(|&f| f == t) else {
                        continue;
                    };
                    let start = self.segment_start_ms(i);
                    let pairs = interpolation_data.len().saturating_sub(1);
                    if pairs == 0 {
                        return Some(start);
                    }
                    return Some(start + seg.duration_ms * pos as f64 / pairs as f64);
                }
            }
        }
        None
    }
}

fn group_segments(resolver: &TransitionResolver, transition_ms: f64) -> Vec<Segment> {
    let n = resolver.len();
    if n < 2 {
        return Vec::new();
    }

    let full = resolver.full_indices();
    let mut bounds: Vec<usize> = Vec::with_capacity(full.len() + 2);
    if full.first() != Some(&0) {
        bounds.push(0);
    }
    bounds.extend_from_slice(full);
    if full.last() != Some(&(n - 1)) {
        bounds.push(n - 1);
    }

    bounds
        .windows(2)
        .map(|w| Segment {
            body: SegmentBody::Grouped {
                interpolation_data: (w[0]..=w[1]).collect(),
            },
            duration_ms: transition_ms,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/segments.rs"]
mod tests;
