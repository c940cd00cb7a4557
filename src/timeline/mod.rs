//! Frame classification, timeline layout, navigation and the playback clock.

/// Playback clock driven by the embedder's tick source.
pub mod clock;
/// Direction-aware navigation over frame stops.
pub mod navigation;
/// Frame kinds, phases and transition indices.
pub mod resolver;
/// Cumulative-duration segment model.
pub mod segments;
