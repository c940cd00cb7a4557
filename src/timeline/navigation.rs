use crate::foundation::core::clamp_index;
use crate::timeline::resolver::TransitionResolver;

/// A navigation stop: a frame plus the full-tree disambiguator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Position {
    /// Interpolated frame index.
    pub index: usize,
    /// For full trees: `true` = start of the next transition, `false` = end
    /// of the previous one. Always `false` on other frames.
    pub first_full: bool,
}

/// Direction-aware cursor over the interpolated frames.
///
/// Frames are walked as a sequence of stops. A non-full frame is one stop; a
/// full tree is two stops, `(t, false)` then `(t, true)`, so stepping forward
/// dwells on it once before moving on. Consensus frames are passed through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: usize,
    previous: Option<usize>,
    first_full: bool,
}

impl Navigator {
    /// Start at the first frame; a full first frame starts its transition.
    pub fn new(resolver: &TransitionResolver) -> Self {
        Self {
            len: resolver.len(),
            current: 0,
            previous: None,
            first_full: resolver.is_full_tree(0),
        }
    }

    /// Current frame index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Frame index before the last move, if any.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// Full-tree disambiguator of the current stop.
    pub fn first_full(&self) -> bool {
        self.first_full
    }

    /// Current stop.
    pub fn position(&self) -> Position {
        Position {
            index: self.current,
            first_full: self.first_full,
        }
    }

    /// `true` when the last move went to a lower index.
    pub fn is_backward(&self) -> bool {
        self.previous.is_some_and(|p| self.current < p)
    }

    /// Jump to frame `k`, clamped into `[0, N)`.
    ///
    /// Records the old index as previous. A jump onto the initial frame before
    /// any move keeps previous unset. Landing on a full tree while moving
    /// backward selects the start of its next transition. Returns `true` when
    /// `k` had to be clamped.
    pub fn go_to_position(&mut self, k: i64, resolver: &TransitionResolver) -> bool {
        let (index, clamped) = clamp_index(k, self.len);
        if self.previous.is_some() || index != self.current {
            self.previous = Some(self.current);
        }
        self.current = index;
        self.first_full = resolver.is_full_tree(index) && self.is_backward();
        clamped
    }

    /// Step to the next stop. Returns `false` at the last stop.
    pub fn forward(&mut self, resolver: &TransitionResolver) -> bool {
        if resolver.is_full_tree(self.current) && !self.first_full {
            self.first_full = true;
            return true;
        }
        if self.current + 1 >= self.len {
            return false;
        }
        self.previous = Some(self.current);
        self.current += 1;
        self.first_full = false;
        true
    }

    /// Step to the previous stop. Returns `false` at the first stop.
    pub fn backward(&mut self, resolver: &TransitionResolver) -> bool {
        if resolver.is_full_tree(self.current) && self.first_full {
            self.first_full = false;
            return true;
        }
        if self.current == 0 {
            return false;
        }
        self.previous = Some(self.current);
        self.current -= 1;
        self.first_full = resolver.is_full_tree(self.current);
        true
    }

    /// Follow a playhead-derived stop.
    ///
    /// Moving to a new frame records the old one as previous; staying on the
    /// same frame only updates the disambiguator.
    pub fn follow(&mut self, position: Position) {
        if position.index != self.current {
            self.previous = Some(self.current);
            self.current = position.index.min(self.len.saturating_sub(1));
        }
        self.first_full = position.first_full;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/navigation.rs"]
mod tests;
