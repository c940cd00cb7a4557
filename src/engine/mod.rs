//! Session-oriented engine API.

/// Engine options.
pub mod opts;
/// The engine state machine.
pub mod session;
