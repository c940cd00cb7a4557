//! Upstream payload boundary.
//!
//! The serde model mirrors the wire format; validation converts it into an
//! immutable [`movie::Movie`] with derived indices.

/// Serde model of the upstream JSON payload.
pub mod model;
/// Validated movie with derived indices.
pub mod movie;
/// Typed tree frames.
pub mod tree;
/// Payload contract validation.
pub mod validate;
