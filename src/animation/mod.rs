//! Pose interpolation and stage detection.

/// Playback time to source/target pose and render descriptors.
pub mod interpolate;
/// COLLAPSE / REORDER / EXPAND classification.
pub mod stage;
