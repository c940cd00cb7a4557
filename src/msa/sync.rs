use crate::msa::window::MsaWindow;
use crate::timeline::navigation::Position;

/// Payload of an `msa-sync-request` event.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsaSyncRequest {
    /// Names of the highlighted leaves.
    pub highlighted_taxa: Vec<String>,
    /// Indices of the highlighted leaves.
    pub highlighted_leaves: Vec<u32>,
    /// Navigation stop that produced the request.
    pub position: Position,
    /// Column window, `None` without an alignment.
    pub window_info: Option<MsaWindow>,
}

impl MsaSyncRequest {
    /// `true` when both requests select the same columns and taxa.
    pub fn same_selection(&self, other: &Self) -> bool {
        self.window_info == other.window_info && self.highlighted_leaves == other.highlighted_leaves
    }
}

/// Debounces `msa-sync-request` events.
///
/// Requests are offered after every state change; only changes of window or
/// highlight set are kept. A pending request is released once it has waited
/// for the debounce window, latest wins, and `poll` yields at most one per
/// call.
#[derive(Clone, Debug)]
pub struct MsaSyncCoalescer {
    debounce_ms: f64,
    pending: Option<MsaSyncRequest>,
    pending_since_ms: Option<f64>,
    last_emitted: Option<MsaSyncRequest>,
}

impl MsaSyncCoalescer {
    /// Coalescer with the given debounce window.
    pub fn new(debounce_ms: f64) -> Self {
        Self {
            debounce_ms: if debounce_ms.is_finite() { debounce_ms.max(0.0) } else { 0.0 },
            pending: None,
            pending_since_ms: None,
            last_emitted: None,
        }
    }

    /// Offer the request describing the state at `now_ms`.
    pub fn offer(&mut self, request: MsaSyncRequest, now_ms: f64) {
        let unchanged = self
            .last_emitted
            .as_ref()
            .is_some_and(|last| last.same_selection(&request));
        if unchanged {
            // Scrubbed back to what listeners already have.
            self.pending = None;
            self.pending_since_ms = None;
            return;
        }
        self.pending_since_ms.get_or_insert(now_ms);
        self.pending = Some(request);
    }

    /// `true` while a request waits for release.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending request once the debounce window has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<MsaSyncRequest> {
        let since = self.pending_since_ms?;
        if now_ms - since < self.debounce_ms {
            return None;
        }
        self.flush()
    }

    /// Release the pending request immediately.
    pub fn flush(&mut self) -> Option<MsaSyncRequest> {
        self.pending_since_ms = None;
        let request = self.pending.take()?;
        self.last_emitted = Some(request.clone());
        Some(request)
    }

    /// Forget all state, including what was last emitted.
    pub fn reset(&mut self) {
        self.pending = None;
        self.pending_since_ms = None;
        self.last_emitted = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/msa/sync.rs"]
mod tests;
