use std::collections::{BTreeMap, HashSet};

use crate::animation::interpolate::{Interpolation, Pose, RenderDescriptor, interpolate};
use crate::engine::opts::EngineOpts;
use crate::foundation::error::{Condition, ConditionCode, PhyloResult};
use crate::msa::sync::{MsaSyncCoalescer, MsaSyncRequest};
use crate::msa::window::{MsaWindow, WindowParams, alignment_length, msa_window};
use crate::payload::model::MovieData;
use crate::payload::movie::Movie;
use crate::payload::validate::{DiagnosticCode, ValidationReport};
use crate::timeline::clock::{ClockAdvance, PlaybackClock};
use crate::timeline::navigation::{Navigator, Position};
use crate::timeline::segments::SegmentModel;

/// Point-in-time view of the engine state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Current frame.
    pub current_tree_index: usize,
    /// Frame before the last move; `None` before the first move.
    pub previous_tree_index: Option<usize>,
    /// The last move went to a lower index.
    pub is_backward: bool,
    /// Full-tree disambiguator.
    pub first_full: bool,
    /// Original transition of the current stop.
    pub transition_index: usize,
    /// The current frame is a full tree.
    pub is_full_tree: bool,
    /// Playback time.
    pub playhead_ms: f64,
    /// Playback is running.
    pub playing: bool,
    /// Signed playback rate.
    pub rate: f64,
}

/// Outcome of one [`Engine::tick`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// State after the tick.
    pub snapshot: Snapshot,
    /// Movie time advanced by this tick.
    pub delta_ms: f64,
    /// Playback stopped at a boundary during this tick.
    pub finished: bool,
    /// Playback wrapped around during this tick.
    pub wrapped: bool,
    /// `msa-sync-request` released by this tick, if any.
    pub msa_sync: Option<MsaSyncRequest>,
}

/// Distances of the current original transition.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDistances {
    /// Transition the values belong to.
    pub transition_index: usize,
    /// Robinson-Foulds distance.
    pub rfd: Option<f64>,
    /// Weighted Robinson-Foulds distance.
    pub weighted_rfd: Option<f64>,
}

/// Shape of the loaded movie.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    /// Source file name, if the payload carried one.
    pub file_name: Option<String>,
    /// Interpolated frames `N`.
    pub frames: usize,
    /// Full trees `M`.
    pub full_trees: usize,
    /// Original transitions.
    pub transitions: usize,
    /// Movie length `L`.
    pub duration_ms: f64,
    /// Non-full frames per transition.
    pub intermediates_per_transition: Vec<usize>,
    /// Frame count per interpolation phase.
    pub phases: BTreeMap<&'static str, usize>,
    /// Alignment window in use.
    pub msa_window: Option<WindowParams>,
}

/// Scriptable engine operation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Jump to a frame.
    GoToIndex {
        /// Target frame; clamped into `[0, N)`.
        index: i64,
    },
    /// Step one stop forward.
    Forward,
    /// Step one stop backward.
    Backward,
    /// Start playback.
    Play,
    /// Stop playback.
    Pause,
    /// Change the playback rate.
    SetRate {
        /// Signed rate.
        rate: f64,
    },
    /// Move the playhead.
    SeekMs {
        /// Target time; clamped into `[0, L]`.
        ms: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Driver {
    Navigation,
    Playhead,
}

struct Session {
    movie: Movie,
    segments: SegmentModel,
    nav: Navigator,
    clock: PlaybackClock,
    window: Option<WindowParams>,
    driver: Driver,
}

/// Timeline engine for one phylogenetic movie.
///
/// A pure state machine: the embedder loads a payload, drives it through
/// navigation and `tick` calls, and reads snapshots and render descriptors.
/// Recoverable conditions never fail a call; they are recorded once each and
/// drained with [`Engine::take_conditions`].
pub struct Engine {
    opts: EngineOpts,
    session: Option<Session>,
    msa_sync: MsaSyncCoalescer,
    rate: f64,
    now_ms: f64,
    conditions: Vec<Condition>,
    raised: HashSet<Condition>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOpts::default())
    }
}

impl Engine {
    /// Create an empty engine.
    pub fn new(opts: EngineOpts) -> Self {
        let msa_sync = MsaSyncCoalescer::new(opts.msa_sync_debounce_ms);
        Self {
            opts,
            session: None,
            msa_sync,
            rate: 1.0,
            now_ms: 0.0,
            conditions: Vec::new(),
            raised: HashSet::new(),
        }
    }

    /// Options in use.
    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    /// Validate and load a payload.
    ///
    /// Fatal issues fail with [`PhyloError::PayloadInvalid`] and leave the
    /// engine unloaded. On success the report carries the warnings and the
    /// engine stands on the first frame.
    ///
    /// [`PhyloError::PayloadInvalid`]: crate::foundation::error::PhyloError::PayloadInvalid
    #[tracing::instrument(skip(self, data))]
    pub fn load(&mut self, data: MovieData) -> PhyloResult<ValidationReport> {
        self.session = None;
        self.msa_sync.reset();
        self.conditions.clear();
        self.raised.clear();

        let (movie, report) = Movie::ingest(data, &self.opts.validation)?;
        let segments = SegmentModel::build(movie.resolver(), &self.opts.segments);
        let nav = Navigator::new(movie.resolver());
        let window = self.window_params(&movie);

        tracing::info!(
            frames = movie.len(),
            full_trees = movie.resolver().full_tree_count(),
            duration_ms = segments.total_ms(),
            warnings = report.warnings.len(),
            "movie loaded"
        );

        let mut clock = PlaybackClock::new(self.opts.loop_playback);
        if let Ok(rate) = clock.set_rate(self.rate, self.opts.min_rate, self.opts.max_rate) {
            self.rate = rate;
        }

        self.session = Some(Session {
            movie,
            segments,
            nav,
            clock,
            window,
            driver: Driver::Navigation,
        });

        for d in report
            .warnings
            .iter()
            .filter(|d| d.code == DiagnosticCode::DistanceLengthDrift)
        {
            self.raise(ConditionCode::Inconsistent, d.message.clone());
        }
        if window.is_none() {
            self.raise(ConditionCode::MissingMsa, "no alignment data");
        }
        self.offer_msa_sync();
        Ok(report)
    }

    fn window_params(&self, movie: &Movie) -> Option<WindowParams> {
        let msa = movie.msa()?;
        let (w, s) = movie.window_params();
        let declared = WindowParams::new(w, s);
        if !(self.opts.infer_msa_window && declared.is_placeholder()) {
            return Some(declared);
        }
        let Some(len) = alignment_length(msa) else {
            tracing::warn!("alignment length unknown; keeping placeholder window");
            return Some(declared);
        };
        let inferred = WindowParams::infer(movie.resolver().full_tree_count(), len);
        tracing::info!(
            alignment_length = len,
            window_size = inferred.window_size,
            step_size = inferred.step_size,
            overlapping = inferred.overlapping,
            "inferred msa window"
        );
        Some(inferred)
    }

    /// `true` once a payload is loaded.
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Loaded movie.
    pub fn movie(&self) -> Option<&Movie> {
        self.session.as_ref().map(|s| &s.movie)
    }

    /// Number of interpolated frames `N`.
    pub fn length(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.movie.len())
    }

    /// Number of full trees `M`.
    pub fn full_tree_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| s.movie.resolver().full_tree_count())
    }

    /// Movie length `L`.
    pub fn duration_ms(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.segments.total_ms())
    }

    /// Timeline segments.
    pub fn segments(&self) -> Option<&SegmentModel> {
        self.session.as_ref().map(|s| &s.segments)
    }

    /// Jump to frame `k`, clamped into `[0, N)`.
    pub fn go_to_index(&mut self, k: i64) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let clamped = s.nav.go_to_position(k, s.movie.resolver());
        let n = s.movie.len();
        Self::park_playhead(s);
        if clamped {
            self.raise(
                ConditionCode::OutOfRange,
                format!("index {k} clamped into [0, {n})"),
            );
        }
        self.offer_msa_sync();
    }

    /// Step one stop forward. Returns `false` at the last stop.
    pub fn forward(&mut self) -> bool {
        let Some(s) = self.session.as_mut() else {
            return false;
        };
        let moved = s.nav.forward(s.movie.resolver());
        Self::park_playhead(s);
        self.offer_msa_sync();
        moved
    }

    /// Step one stop backward. Returns `false` at the first stop.
    pub fn backward(&mut self) -> bool {
        let Some(s) = self.session.as_mut() else {
            return false;
        };
        let moved = s.nav.backward(s.movie.resolver());
        Self::park_playhead(s);
        self.offer_msa_sync();
        moved
    }

    fn park_playhead(s: &mut Session) {
        s.driver = Driver::Navigation;
        if let Some(ms) = s.segments.time_of_frame(s.nav.current()) {
            s.clock.seek(ms, s.segments.total_ms());
        }
    }

    /// Start playback from the playhead.
    pub fn play(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.clock.play(s.segments.total_ms());
            tracing::debug!(playhead_ms = s.clock.playhead_ms(), "play");
        }
    }

    /// Stop playback. Pending ticks are dropped.
    pub fn pause(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.clock.pause();
            tracing::debug!(playhead_ms = s.clock.playhead_ms(), "pause");
        }
    }

    /// Set the playback rate; returns the applied rate.
    ///
    /// The magnitude is clamped into `[min_rate, max_rate]`. Zero and
    /// non-finite rates are rejected and leave the rate unchanged. A rate set
    /// before [`load`](Self::load) carries into the loaded movie.
    pub fn set_rate(&mut self, rate: f64) -> f64 {
        let (min, max) = (self.opts.min_rate, self.opts.max_rate);
        let result = match self.session.as_mut() {
            Some(s) => s.clock.set_rate(rate, min, max),
            None => PlaybackClock::clamp_rate(rate, min, max),
        };
        match result {
            Ok(applied) => {
                self.rate = applied;
                if applied != rate {
                    self.raise(
                        ConditionCode::OutOfRange,
                        format!("rate {rate} clamped to {applied}"),
                    );
                }
                applied
            }
            Err(invalid) => {
                self.raise(
                    ConditionCode::OutOfRange,
                    format!("rate {} rejected", invalid.0),
                );
                self.rate
            }
        }
    }

    /// Move the playhead to `ms`, clamped into `[0, L]`.
    pub fn seek_ms(&mut self, ms: f64) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let total = s.segments.total_ms();
        let clamped = s.clock.seek(ms, total);
        s.driver = Driver::Playhead;
        if clamped {
            self.raise(
                ConditionCode::OutOfRange,
                format!("time {ms} ms clamped into [0, {total}]"),
            );
        }
        self.follow_playhead();
        self.offer_msa_sync();
    }

    /// Advance playback to the embedder's clock time `now_ms`.
    ///
    /// Observes one consistent state: the clock moves, navigation follows the
    /// playhead, then at most one `msa-sync-request` is released.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        self.now_ms = now_ms;
        let mut advance = ClockAdvance::default();
        if let Some(s) = self.session.as_mut() {
            let was_playing = s.clock.is_playing();
            advance = s.clock.tick(now_ms, s.segments.total_ms());
            if was_playing && (advance.delta_ms != 0.0 || advance.finished || advance.wrapped) {
                s.driver = Driver::Playhead;
                self.follow_playhead();
                self.offer_msa_sync();
            }
        }
        TickReport {
            snapshot: self.snapshot(),
            delta_ms: advance.delta_ms,
            finished: advance.finished,
            wrapped: advance.wrapped,
            msa_sync: self.msa_sync.poll(now_ms),
        }
    }

    fn follow_playhead(&mut self) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let Some(interp) = interpolate(&s.segments, s.clock.playhead_ms(), s.movie.len()) else {
            return;
        };
        let pose = interp.pose;
        let index = pose.nearest_frame();
        let first_full = s.movie.resolver().is_full_tree(index)
            && index == pose.source
            && pose.source != pose.target;
        s.nav.follow(Position { index, first_full });
        if let Some(seg) = interp.degraded_segment {
            self.raise(
                ConditionCode::TopologyChange,
                format!("segment {seg} has no interpolation data; rendered without tween"),
            );
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot {
        let Some(s) = self.session.as_ref() else {
            return Snapshot {
                current_tree_index: 0,
                previous_tree_index: None,
                is_backward: false,
                first_full: false,
                transition_index: 0,
                is_full_tree: false,
                playhead_ms: 0.0,
                playing: false,
                rate: self.rate,
            };
        };
        let resolver = s.movie.resolver();
        let current = s.nav.current();
        Snapshot {
            current_tree_index: current,
            previous_tree_index: s.nav.previous(),
            is_backward: s.nav.is_backward(),
            first_full: s.nav.first_full(),
            transition_index: resolver.transition_index(current, s.nav.first_full()),
            is_full_tree: resolver.is_full_tree(current),
            playhead_ms: s.clock.playhead_ms(),
            playing: s.clock.is_playing(),
            rate: s.clock.rate(),
        }
    }

    fn current_pose(s: &Session) -> Option<Pose> {
        match s.driver {
            Driver::Navigation => {
                let current = s.nav.current();
                Some(Pose::settled(s.nav.previous().unwrap_or(current), current))
            }
            Driver::Playhead => interpolate(&s.segments, s.clock.playhead_ms(), s.movie.len())
                .map(|i: Interpolation| i.pose),
        }
    }

    /// Render descriptor for the current state.
    ///
    /// After navigation the descriptor is static (progress 1, from the
    /// previous frame to the current one); during playback and after a seek
    /// it follows the playhead.
    pub fn current_render_descriptor(&self) -> Option<RenderDescriptor<'_>> {
        let s = self.session.as_ref()?;
        RenderDescriptor::from_pose(&s.movie, Self::current_pose(s)?)
    }

    /// Alignment window of the current stop; `None` without an alignment.
    pub fn msa_window(&self) -> Option<MsaWindow> {
        let s = self.session.as_ref()?;
        let params = s.window?;
        let i = s
            .movie
            .resolver()
            .transition_index(s.nav.current(), s.nav.first_full());
        Some(msa_window(i, params.window_size, params.step_size))
    }

    /// Window parameters in use; `None` without an alignment.
    pub fn msa_window_params(&self) -> Option<WindowParams> {
        self.session.as_ref().and_then(|s| s.window)
    }

    /// Distances of the current original transition.
    pub fn current_distances(&self) -> Option<TransitionDistances> {
        let s = self.session.as_ref()?;
        if s.movie.resolver().transition_count() == 0 {
            return None;
        }
        let i = s
            .movie
            .resolver()
            .transition_index(s.nav.current(), s.nav.first_full());
        Some(TransitionDistances {
            transition_index: i,
            rfd: s.movie.rfd(i),
            weighted_rfd: s.movie.weighted_rfd(i),
        })
    }

    /// Request describing the current selection.
    pub fn msa_sync_request(&self) -> Option<MsaSyncRequest> {
        let s = self.session.as_ref()?;
        let position = s.nav.position();
        let i = s
            .movie
            .resolver()
            .transition_index(position.index, position.first_full);
        let leaves = s.movie.highlighted_leaves(i);
        let highlighted_taxa = leaves
            .iter()
            .filter_map(|&l| s.movie.leaf_name(l).map(str::to_owned))
            .collect();
        Some(MsaSyncRequest {
            highlighted_taxa,
            highlighted_leaves: leaves.into_iter().collect(),
            position,
            window_info: self.msa_window(),
        })
    }

    fn offer_msa_sync(&mut self) {
        if let Some(request) = self.msa_sync_request() {
            self.msa_sync.offer(request, self.now_ms);
        }
    }

    /// Release any pending `msa-sync-request` without waiting for the debounce window.
    pub fn flush_msa_sync(&mut self) -> Option<MsaSyncRequest> {
        self.msa_sync.flush()
    }

    /// Shape of the loaded movie.
    pub fn summary(&self) -> Option<MovieSummary> {
        let s = self.session.as_ref()?;
        let resolver = s.movie.resolver();
        let mut phases = BTreeMap::new();
        for class in resolver.classes() {
            *phases.entry(class.phase.as_str()).or_insert(0) += 1;
        }
        Some(MovieSummary {
            file_name: s.movie.file_name().map(str::to_owned),
            frames: s.movie.len(),
            full_trees: resolver.full_tree_count(),
            transitions: resolver.transition_count(),
            duration_ms: s.segments.total_ms(),
            intermediates_per_transition: resolver.intermediates_per_transition(),
            phases,
            msa_window: s.window,
        })
    }

    /// Apply a scripted command.
    pub fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "apply");
        match command {
            Command::GoToIndex { index } => self.go_to_index(index),
            Command::Forward => {
                self.forward();
            }
            Command::Backward => {
                self.backward();
            }
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::SetRate { rate } => {
                self.set_rate(rate);
            }
            Command::SeekMs { ms } => self.seek_ms(ms),
        }
    }

    fn raise(&mut self, code: ConditionCode, message: impl Into<String>) {
        let condition = Condition::new(code, message);
        if self.raised.insert(condition.clone()) {
            tracing::warn!(code = code.as_str(), message = %condition.message, "condition");
            self.conditions.push(condition);
        }
    }

    /// Drain conditions recorded since the last call.
    pub fn take_conditions(&mut self) -> Vec<Condition> {
        std::mem::take(&mut self.conditions)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;
