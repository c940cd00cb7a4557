use crate::payload::validate::ValidationReport;

/// Convenience result type used across PhyloMovies.
pub type PhyloResult<T> = Result<T, PhyloError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only conditions that abort an operation are errors. Recoverable conditions
/// (clamped indices, missing alignment, degenerate segments) are reported as
/// [`Condition`] values and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum PhyloError {
    /// The upstream payload failed contract validation.
    #[error("payload invalid: {}", summarize_issues(.0))]
    PayloadInvalid(Box<ValidationReport>),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhyloError {
    /// Build a [`PhyloError::PayloadInvalid`] value.
    pub fn payload_invalid(report: ValidationReport) -> Self {
        Self::PayloadInvalid(Box::new(report))
    }

    /// Build a [`PhyloError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PhyloError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Validation report attached to a [`PhyloError::PayloadInvalid`] error.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::PayloadInvalid(report) => Some(report),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PhyloError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

fn summarize_issues(report: &ValidationReport) -> String {
    match report.issues.first() {
        None => "no issues recorded".to_owned(),
        Some(first) if report.issues.len() == 1 => first.to_string(),
        Some(first) => format!("{first} (+{} more)", report.issues.len() - 1),
    }
}

/// Stable codes for recoverable engine conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCode {
    /// Index, time or rate outside the valid domain; the value was clamped or ignored.
    OutOfRange,
    /// Payload arrays disagree within tolerance.
    Inconsistent,
    /// An alignment window was requested but the payload carries no MSA.
    MissingMsa,
    /// A grouped segment has no usable sub-steps; rendered without tween.
    TopologyChange,
}

impl ConditionCode {
    /// Stable identifier for logs and embedders.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfRange => "out_of_range",
            Self::Inconsistent => "inconsistent",
            Self::MissingMsa => "missing_msa",
            Self::TopologyChange => "topology_change",
        }
    }
}

impl std::fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable condition surfaced by the engine: a stable code and a one-line message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Condition {
    /// Stable condition code.
    pub code: ConditionCode,
    /// Human readable one-liner.
    pub message: String,
}

impl Condition {
    /// Build a condition from a code and message.
    pub fn new(code: ConditionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
