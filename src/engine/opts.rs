use crate::foundation::error::{PhyloError, PhyloResult};
use crate::payload::validate::ValidationOpts;
use crate::timeline::segments::SegmentLayout;

/// Options controlling an [`Engine`](crate::engine::session::Engine).
///
/// Deserializes with per-field defaults, so a config file only names the
/// fields it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOpts {
    /// Timeline layout of the frames.
    pub segments: SegmentLayout,
    /// Coalescing window for `msa-sync-request` events.
    pub msa_sync_debounce_ms: f64,
    /// Wrap around at the ends instead of stopping.
    pub loop_playback: bool,
    /// Smallest accepted playback rate magnitude.
    pub min_rate: f64,
    /// Largest accepted playback rate magnitude.
    pub max_rate: f64,
    /// Derive window parameters from the alignment when the payload carries
    /// the `(1, 1)` placeholder.
    pub infer_msa_window: bool,
    /// Payload validation thresholds.
    pub validation: ValidationOpts,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            segments: SegmentLayout::default(),
            msa_sync_debounce_ms: 16.0,
            loop_playback: false,
            min_rate: 0.1,
            max_rate: 8.0,
            infer_msa_window: true,
            validation: ValidationOpts::default(),
        }
    }
}

impl EngineOpts {
    /// Parse options from a JSON document and check them.
    pub fn from_json_str(s: &str) -> PhyloResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| PhyloError::config(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject option combinations the engine cannot run with.
    pub fn validate(&self) -> PhyloResult<()> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            return Err(PhyloError::config("min_rate must be finite and > 0"));
        }
        if !(self.max_rate.is_finite() && self.max_rate >= self.min_rate) {
            return Err(PhyloError::config("max_rate must be finite and >= min_rate"));
        }
        if !finite_non_negative(self.msa_sync_debounce_ms) {
            return Err(PhyloError::config("msa_sync_debounce_ms must be finite and >= 0"));
        }
        let durations_ok = match self.segments {
            SegmentLayout::PerFrame {
                intermediate_ms,
                consensus_ms,
            } => finite_non_negative(intermediate_ms) && finite_non_negative(consensus_ms),
            SegmentLayout::PerTransition { transition_ms } => finite_non_negative(transition_ms),
        };
        if !durations_ok {
            return Err(PhyloError::config("segment durations must be finite and >= 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/opts.rs"]
mod tests;
