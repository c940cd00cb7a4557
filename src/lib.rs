//! PhyloMovies timeline engine.
//!
//! Turns an upstream "phylogenetic movie" payload (a sequence of interpolated
//! tree frames with highlight and distance metadata) into a navigable,
//! playable timeline. The API is session-oriented:
//!
//! - Parse a [`MovieData`] payload
//! - [`Engine::load`] validates it and builds the derived indices
//! - Navigate, play and tick the [`Engine`], reading [`Snapshot`]s and
//!   [`RenderDescriptor`]s
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod animation;
pub mod engine;
pub mod foundation;
pub mod highlight;
pub mod msa;
pub mod payload;
pub mod timeline;

pub use crate::animation::interpolate::{Pose, RenderDescriptor};
pub use crate::animation::stage::{Stage, detect_stage};
pub use crate::engine::opts::EngineOpts;
pub use crate::engine::session::{
    Command, Engine, MovieSummary, Snapshot, TickReport, TransitionDistances,
};
pub use crate::foundation::core::{BezPath, LeafSet, Point};
pub use crate::foundation::error::{Condition, ConditionCode, PhyloError, PhyloResult};
pub use crate::msa::sync::MsaSyncRequest;
pub use crate::msa::window::{MsaWindow, WindowParams};
pub use crate::payload::model::MovieData;
pub use crate::payload::movie::Movie;
pub use crate::payload::tree::TreeNode;
pub use crate::payload::validate::{
    Diagnostic, DiagnosticCode, ValidationOpts, ValidationReport, validate_movie,
};
pub use crate::timeline::navigation::Position;
pub use crate::timeline::segments::SegmentLayout;
