//! Alignment window synchronization.

/// Debounced `msa-sync-request` events.
pub mod sync;
/// Column windows and window parameter inference.
pub mod window;
