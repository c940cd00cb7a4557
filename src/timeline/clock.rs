use crate::foundation::core::clamp_ms;

/// Result of advancing the clock by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockAdvance {
    /// Milliseconds of movie time advanced (signed by direction).
    pub delta_ms: f64,
    /// Playback reached a movie boundary and stopped.
    pub finished: bool,
    /// Playback wrapped around a boundary.
    pub wrapped: bool,
}

/// Rejected rate change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidRate(pub f64);

/// Playback clock: playhead, rate and play state.
///
/// The clock is driven by the embedder's tick source; it never reads wall
/// time on its own. The first tick after `play()` only records the tick time.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClock {
    playhead_ms: f64,
    rate: f64,
    playing: bool,
    loop_playback: bool,
    last_tick_ms: Option<f64>,
}

impl PlaybackClock {
    /// Paused clock at time zero with rate 1.
    pub fn new(loop_playback: bool) -> Self {
        Self {
            playhead_ms: 0.0,
            rate: 1.0,
            playing: false,
            loop_playback,
            last_tick_ms: None,
        }
    }

    /// Current playhead.
    pub fn playhead_ms(&self) -> f64 {
        self.playhead_ms
    }

    /// Signed playback rate; negative plays in reverse.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Return `true` while playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing. A playhead parked at the boundary it would run into
    /// restarts from the opposite end.
    pub fn play(&mut self, total_ms: f64) {
        if self.rate > 0.0 && self.playhead_ms >= total_ms {
            self.playhead_ms = 0.0;
        } else if self.rate < 0.0 && self.playhead_ms <= 0.0 {
            self.playhead_ms = total_ms;
        }
        self.playing = true;
        self.last_tick_ms = None;
    }

    /// Stop playing; pending ticks are dropped.
    pub fn pause(&mut self) {
        self.playing = false;
        self.last_tick_ms = None;
    }

    /// Set the playback rate.
    ///
    /// The magnitude is clamped into `[min_rate, max_rate]` and the sign kept.
    /// Zero and non-finite rates are rejected. Returns the applied rate.
    pub fn set_rate(&mut self, rate: f64, min_rate: f64, max_rate: f64) -> Result<f64, InvalidRate> {
        self.rate = Self::clamp_rate(rate, min_rate, max_rate)?;
        Ok(self.rate)
    }

    /// The rate [`set_rate`](Self::set_rate) would apply, without a clock.
    pub fn clamp_rate(rate: f64, min_rate: f64, max_rate: f64) -> Result<f64, InvalidRate> {
        if !rate.is_finite() || rate == 0.0 {
            return Err(InvalidRate(rate));
        }
        let magnitude = rate.abs().clamp(min_rate, max_rate.max(min_rate));
        Ok(magnitude.copysign(rate))
    }

    /// Move the playhead, clamped into `[0, total_ms]`. Returns `true` when clamped.
    pub fn seek(&mut self, ms: f64, total_ms: f64) -> bool {
        let (ms, clamped) = clamp_ms(ms, total_ms);
        self.playhead_ms = ms;
        clamped
    }

    /// Advance by the time elapsed since the previous tick.
    pub fn tick(&mut self, now_ms: f64, total_ms: f64) -> ClockAdvance {
        let last = self.last_tick_ms.replace(now_ms);
        if !self.playing {
            return ClockAdvance::default();
        }
        let Some(last) = last else {
            return ClockAdvance::default();
        };

        let elapsed = (now_ms - last).max(0.0);
        let delta_ms = elapsed * self.rate;
        let mut out = ClockAdvance {
            delta_ms,
            ..ClockAdvance::default()
        };
        let next = self.playhead_ms + delta_ms;

        if total_ms <= 0.0 {
            self.playhead_ms = 0.0;
            self.playing = false;
            out.finished = true;
            return out;
        }

        if next >= total_ms || (next <= 0.0 && self.rate < 0.0) {
            if self.loop_playback {
                self.playhead_ms = next.rem_euclid(total_ms);
                out.wrapped = true;
            } else {
                self.playhead_ms = next.clamp(0.0, total_ms);
                self.playing = false;
                out.finished = true;
            }
        } else {
            self.playhead_ms = next.max(0.0);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
