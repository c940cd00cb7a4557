use crate::payload::model::MsaData;

/// Alignment columns shown for one transition, 1-based and inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsaWindow {
    /// First column.
    pub start: u32,
    /// Last column.
    pub end: u32,
    /// Original transition the window belongs to.
    pub transition_index: usize,
}

impl MsaWindow {
    /// Number of columns covered.
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Column window for transition `transition_index`.
///
/// `start = max(1, i * step + 1)`, `end = max(start, start + window - 1)`.
/// The full-tree boundary rule is already folded into `transition_index`.
pub fn msa_window(transition_index: usize, window_size: u32, step_size: u32) -> MsaWindow {
    let i = u32::try_from(transition_index).unwrap_or(u32::MAX);
    let start = i.saturating_mul(step_size).saturating_add(1).max(1);
    let end = start.saturating_add(window_size.saturating_sub(1)).max(start);
    MsaWindow {
        start,
        end,
        transition_index,
    }
}

/// Sliding-window parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    /// Window width in columns.
    pub window_size: u32,
    /// Columns between consecutive window starts.
    pub step_size: u32,
    /// `true` when consecutive windows share columns.
    pub overlapping: bool,
}

impl WindowParams {
    /// Explicit parameters; zero values are raised to `1`.
    pub fn new(window_size: u32, step_size: u32) -> Self {
        let window_size = window_size.max(1);
        let step_size = step_size.max(1);
        Self {
            window_size,
            step_size,
            overlapping: step_size < window_size,
        }
    }

    /// Split the alignment evenly across the trees.
    ///
    /// One tree (or none) gets the whole alignment as a single window.
    pub fn infer(num_trees: usize, alignment_length: u32) -> Self {
        if num_trees <= 1 {
            return Self::new(alignment_length, alignment_length);
        }
        let n = u32::try_from(num_trees).unwrap_or(u32::MAX);
        let size = (alignment_length / n).max(1);
        Self::new(size, size)
    }

    /// `true` for the `(1, 1)` placeholder the upstream service sends when
    /// no window was configured.
    pub fn is_placeholder(&self) -> bool {
        self.window_size == 1 && self.step_size == 1
    }
}

/// Alignment length from raw FASTA, PHYLIP or Clustal text.
pub fn alignment_length_from_text(content: &str) -> Option<u32> {
    let lines: Vec<&str> = content.trim().lines().collect();
    let first = lines.first()?;

    let len = if lines.iter().any(|l| l.starts_with('>')) {
        // FASTA: length of the first record.
        let mut seq = String::new();
        let mut seen_header = false;
        for line in &lines {
            if line.starts_with('>') {
                if seen_header && !seq.is_empty() {
                    break;
                }
                seen_header = true;
            } else {
                seq.push_str(line.trim());
            }
        }
        seq.chars().count()
    } else if let Some(cols) = phylip_columns(first) {
        cols
    } else if lines.iter().take(3).any(|l| l.to_uppercase().contains("CLUSTAL")) {
        let row = lines.iter().find(|l| {
            let t = l.trim();
            !t.is_empty()
                && !l.starts_with("CLUSTAL")
                && !t.starts_with('*')
                && t.split_whitespace().count() >= 2
        })?;
        row.split_whitespace().skip(1).map(|p| p.chars().count()).sum()
    } else {
        return None;
    };
    u32::try_from(len).ok().filter(|&l| l > 0)
}

fn phylip_columns(header: &str) -> Option<usize> {
    let mut parts = header.split_whitespace();
    let _taxa: usize = parts.next()?.parse().ok()?;
    parts.next()?.parse().ok()
}

/// Alignment length of an attached MSA: explicit value, longest sequence,
/// then the raw text.
pub fn alignment_length(msa: &MsaData) -> Option<u32> {
    msa.alignment_length()
        .or_else(|| msa.content.as_deref().and_then(alignment_length_from_text))
}

#[cfg(test)]
#[path = "../../tests/unit/msa/window.rs"]
mod tests;
