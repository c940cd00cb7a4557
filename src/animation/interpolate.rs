use crate::animation::stage::{Stage, detect_stage};
use crate::foundation::core::LeafSet;
use crate::payload::movie::Movie;
use crate::payload::tree::TreeNode;
use crate::timeline::resolver::FramePhase;
use crate::timeline::segments::{SegmentBody, SegmentModel};

/// Source/target frame pair and local progress at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Pose {
    /// Frame tweened from.
    pub source: usize,
    /// Frame tweened to.
    pub target: usize,
    /// Local progress in `[0, 1]`.
    pub progress: f64,
    /// Segment the pose was taken from; `None` past the end or for static poses.
    pub segment: Option<usize>,
    /// `false` when the segment was rendered without a tween.
    pub tweened: bool,
}

impl Pose {
    /// A pose that shows `target` fully, arriving from `source`.
    pub fn settled(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            progress: 1.0,
            segment: None,
            tweened: false,
        }
    }

    /// The nearer of source and target.
    pub fn nearest_frame(&self) -> usize {
        if self.progress >= 0.5 {
            self.target
        } else {
            self.source
        }
    }
}

/// Pose lookup outcome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolation {
    /// Resolved pose.
    pub pose: Pose,
    /// Grouped segment that had no usable sub-steps, if the pose fell back.
    pub degraded_segment: Option<usize>,
}

/// Frame shown for segment `i` without tweening.
///
/// Grouped segments show the first member of their `interpolation_data`.
pub fn render_segment(model: &SegmentModel, i: usize) -> Option<usize> {
    model.segment(i)?.instant_frame()
}

/// Resolve the pose at playback time `ms`.
///
/// Times at or past the end settle on the last frame. Returns `None` only
/// for an empty movie.
pub fn interpolate(model: &SegmentModel, ms: f64, frame_count: usize) -> Option<Interpolation> {
    let last = frame_count.checked_sub(1)?;
    let Some(i) = model.time_to_segment_index(ms) else {
        return Some(Interpolation {
            pose: Pose::settled(last, last),
            degraded_segment: None,
        });
    };
    let segment = model.segment(i)?;
    let start = model.segment_start_ms(i);
    let local = if segment.duration_ms > 0.0 {
        ((ms.max(0.0) - start) / segment.duration_ms).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let interpolation = match &segment.body {
        SegmentBody::Frame(target) => {
            let source = match i {
                0 => *target,
                _ => render_segment(model, i - 1).unwrap_or(*target),
            };
            Interpolation {
                pose: Pose {
                    source,
                    target: *target,
                    progress: local,
                    segment: Some(i),
                    tweened: true,
                },
                degraded_segment: None,
            }
        }
        SegmentBody::Grouped { interpolation_data } if interpolation_data.len() >= 2 => {
            let pairs = interpolation_data.len() - 1;
            let scaled = local * pairs as f64;
            let step = (scaled.floor() as usize).min(pairs - 1);
            Interpolation {
                pose: Pose {
                    source: interpolation_data[step],
                    target: interpolation_data[step + 1],
                    progress: (scaled - step as f64).clamp(0.0, 1.0),
                    segment: Some(i),
                    tweened: true,
                },
                degraded_segment: None,
            }
        }
        SegmentBody::Grouped { .. } => {
            let frame = render_segment(model, i)
                .or_else(|| i.checked_sub(1).and_then(|p| render_segment(model, p)))
                .unwrap_or(0)
                .min(last);
            tracing::debug!(segment = i, "grouped segment without sub-steps; rendering without tween");
            Interpolation {
                pose: Pose {
                    segment: Some(i),
                    ..Pose::settled(frame, frame)
                },
                degraded_segment: Some(i),
            }
        }
    };
    Some(interpolation)
}

/// Everything a renderer needs for one tick.
///
/// Borrows the movie; nothing here owns upstream trees.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDescriptor<'a> {
    /// Tree tweened from.
    pub source_tree: &'a TreeNode,
    /// Tree tweened to.
    pub target_tree: &'a TreeNode,
    /// Index of the source tree.
    pub source_index: usize,
    /// Index of the target tree.
    pub target_index: usize,
    /// Nearest frame to the current pose.
    pub interpolated_index: usize,
    /// Local progress in `[0, 1]`.
    pub progress: f64,
    /// Visual stage of the source → target delta.
    pub stage: Stage,
    /// Interpolation phase of the target frame.
    pub phase: FramePhase,
    /// Active change edge of the target frame.
    pub active_change_edge: &'a LeafSet,
    /// Moving subtree of the target frame.
    pub subtree: &'a LeafSet,
    /// Coordinate scale, linearly blended between source and target.
    pub scale: f64,
    /// `false` when the frame is shown without tweening.
    pub tweened: bool,
}

impl<'a> RenderDescriptor<'a> {
    /// Build the descriptor for `pose`.
    pub fn from_pose(movie: &'a Movie, pose: Pose) -> Option<Self> {
        let source_tree = movie.frame(pose.source)?;
        let target_tree = movie.frame(pose.target)?;
        let s0 = movie.scale(pose.source);
        let s1 = movie.scale(pose.target);
        let phase = movie
            .resolver()
            .class(pose.target)
            .map_or(FramePhase::Unknown, |c| c.phase);
        Some(Self {
            source_tree,
            target_tree,
            source_index: pose.source,
            target_index: pose.target,
            interpolated_index: pose.nearest_frame(),
            progress: pose.progress,
            stage: detect_stage(Some(source_tree), Some(target_tree)),
            phase,
            active_change_edge: movie.active_change_edge(pose.target),
            subtree: movie.subtree(pose.target),
            scale: s0 + (s1 - s0) * pose.progress,
            tweened: pose.tweened,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interpolate.rs"]
mod tests;
