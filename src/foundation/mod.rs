//! Shared types and the error taxonomy.

/// Leaf sets, clamping helpers and geometry re-exports.
pub mod core;
/// Crate error type and recoverable conditions.
pub mod error;
