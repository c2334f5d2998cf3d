//! # Gesture Recognizer Module
//!
//! Turns a continuous stream of raw sensor readings into discrete, de-bounced
//! gesture events, and records new gestures on request.
//!
//! ## Per-Tick Flow
//! raw sample → low-pass filter → history buffer (age + evict + append) →
//! DTW against every library entry → threshold + hold → event
//!
//! ## States
//! - `Idle`: matching continuously against the library
//! - `Recording`: capturing a trial, no matching
//! - `ResultHold`: a recognition just fired; further announcements are
//!   suppressed for `result_duration` seconds
//!
//! ## Why A Baseline Pattern
//! The best match is an argmin, so noise always matches *something*. A
//! near-neutral "stationary" template in every profile absorbs idle input,
//! and matching it never produces an event.

use std::path::PathBuf;

use crate::config::RecognizerConfig;
use crate::dtw::DtwMatcher;
use crate::error::{ConfigError, RecognizerError};
use crate::filter::SampleFilter;
use crate::library::{BestMatch, PatternLibrary};
use crate::pattern_file::PatternStore;
use crate::template::PatternTemplate;
use crate::timeseries::{HistoryBuffer, Sample, SampleSliceExt};

/// A gesture recognized in the live stream
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub pattern_name: String,
    pub distance: f32,
    /// Wall-clock time of the tick that fired
    pub timestamp: f64,
}

/// Whether a recording starts a new pattern or refines the latest one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    New,
    Trial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerState {
    Idle,
    Recording { mode: RecordingMode },
    ResultHold { event: RecognitionEvent, elapsed: f64 },
}

impl RecognizerState {
    pub fn label(&self) -> &'static str {
        match self {
            RecognizerState::Idle => "idle",
            RecognizerState::Recording { .. } => "recording",
            RecognizerState::ResultHold { .. } => "result_hold",
        }
    }
}

/// Outcome of a finished recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub pattern_name: String,
    /// Index of the trial just added (0-based)
    pub trial: usize,
    pub trial_len: usize,
    pub template_len: usize,
}

/// Diagnostic snapshot for display
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerStatus<const N: usize> {
    pub smoothed: Option<Sample<N>>,
    pub history_len: usize,
    pub state: &'static str,
    /// Best candidate on the last matching tick
    pub last_match: Option<BestMatch>,
    pub held: Option<RecognitionEvent>,
    pub recording_len: usize,
}

pub struct GestureRecognizer<const N: usize> {
    config: RecognizerConfig,
    matcher: DtwMatcher,
    baseline: String,
    filter: SampleFilter<N>,
    history: HistoryBuffer<N>,
    library: PatternLibrary<N>,
    active_profile: Option<String>,
    state: RecognizerState,
    record: Vec<Sample<N>>,
    recorded: Vec<PatternTemplate<N>>,
    /// 1-based index of the most recently created pattern; 0 when none
    pattern_index: usize,
    last_match: Option<BestMatch>,
    /// Result of a recording stopped by the length cap, until collected
    auto_stopped: Option<Result<RecordingSummary, RecognizerError>>,
    store: Option<Box<dyn PatternStore<N> + Send>>,
}

pub type AccelRecognizer = GestureRecognizer<3>;
pub type TouchRecognizer = GestureRecognizer<2>;

impl<const N: usize> GestureRecognizer<N> {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            matcher: config.matcher(),
            baseline: config.baseline_name(),
            filter: SampleFilter::new(config.alpha),
            config,
            history: HistoryBuffer::new(),
            library: PatternLibrary::new(),
            active_profile: None,
            state: RecognizerState::Idle,
            record: Vec::new(),
            recorded: Vec::new(),
            pattern_index: 0,
            last_match: None,
            auto_stopped: None,
            store: None,
        }
    }

    /// Like `new`, but rejects a config that fails `RecognizerConfig::validate`
    pub fn try_new(config: RecognizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Persist finished recordings through `store`
    pub fn with_store(mut self, store: impl PatternStore<N> + Send + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Replace the library wholesale
    pub fn with_library(mut self, library: PatternLibrary<N>) -> Self {
        self.library = library;
        self
    }

    /// Advance one frame.
    ///
    /// `raw` is the unfiltered reading, `dt` the seconds since the previous
    /// tick and `now` the current wall-clock time in seconds.
    pub fn tick(&mut self, raw: [f32; N], dt: f64, now: f64) -> Option<RecognitionEvent> {
        let seeding = self.filter.last().is_none();
        let smoothed = self.filter.update(raw, now);

        // The seed enters the history ahead of the first filtered sample, so
        // the very first match already sees a two-sample window
        if seeding {
            self.history.append(smoothed);
        }
        self.history.tick(dt, self.config.lookback);
        self.history.append(smoothed);

        if let RecognizerState::Recording { .. } = self.state {
            self.record.push(smoothed);
            // Cap trial length at the lookback window
            let too_long = self
                .record
                .first()
                .map(|first| first.t_abs - now < self.config.lookback)
                .unwrap_or(false);
            if too_long {
                log::warn!(
                    "Recording exceeded {}s, stopping automatically",
                    -self.config.lookback
                );
                let outcome = self.end_recording();
                if let Err(e) = &outcome {
                    log::error!("Automatic stop failed: {}", e);
                }
                self.auto_stopped = Some(outcome);
            }
            return None;
        }

        self.last_match = self.library.best_match(self.history.samples(), &self.matcher);
        if let Some(best) = &self.last_match {
            log::debug!("Best match {} at {:.3}", best.name, best.distance);
        }

        if let RecognizerState::ResultHold { elapsed, .. } = &mut self.state {
            if *elapsed < self.config.result_duration {
                *elapsed += dt;
                return None;
            }
            self.state = RecognizerState::Idle;
        }

        let best = self.last_match.as_ref()?;
        if best.distance < self.config.match_threshold && best.name != self.baseline {
            let event = RecognitionEvent {
                pattern_name: best.name.clone(),
                distance: best.distance,
                timestamp: now,
            };
            log::info!("Recognized {} (distance {:.3})", event.pattern_name, event.distance);
            self.state = RecognizerState::ResultHold {
                event: event.clone(),
                elapsed: 0.0,
            };
            return Some(event);
        }

        None
    }

    /// Start recording a brand-new pattern
    pub fn begin_new_recording(&mut self) -> Result<(), RecognizerError> {
        self.begin_recording(RecordingMode::New)
    }

    /// Start recording another trial of the most recent pattern
    pub fn begin_trial_recording(&mut self) -> Result<(), RecognizerError> {
        if self.recorded.is_empty() {
            return Err(RecognizerError::NoPatternForTrial);
        }
        self.begin_recording(RecordingMode::Trial)
    }

    fn begin_recording(&mut self, mode: RecordingMode) -> Result<(), RecognizerError> {
        if let RecognizerState::Recording { .. } = self.state {
            return Err(RecognizerError::AlreadyRecording);
        }
        log::info!("Recording started ({:?})", mode);
        self.record.clear();
        self.state = RecognizerState::Recording { mode };
        Ok(())
    }

    /// Finish the current recording.
    ///
    /// The trial becomes a new pattern or is added to the latest one, the
    /// template is recalculated, both are realigned to end at `t = 0` and
    /// written to the pattern store (if any).
    pub fn end_recording(&mut self) -> Result<RecordingSummary, RecognizerError> {
        let mode = match self.state {
            RecognizerState::Recording { mode } => mode,
            _ => return Err(RecognizerError::NotRecording),
        };
        self.state = RecognizerState::Idle;

        let trial = std::mem::take(&mut self.record);
        if trial.is_empty() {
            return Err(RecognizerError::EmptyRecording);
        }

        let pattern = match mode {
            RecordingMode::New => {
                self.pattern_index += 1;
                let name = format!("pattern_{}", self.pattern_index);
                self.recorded.push(PatternTemplate::from_trial(name, trial));
                self.recorded.last_mut()
            }
            RecordingMode::Trial => self.recorded.last_mut().map(|pattern| {
                pattern.add_trial(trial);
                pattern
            }),
        }
        .ok_or(RecognizerError::NoPatternForTrial)?;

        pattern.realign_to_end();

        let summary = RecordingSummary {
            pattern_name: pattern.name().to_string(),
            trial: pattern.trial_count() - 1,
            trial_len: pattern.last_trial().map(|t| t.len()).unwrap_or(0),
            template_len: pattern.data().len(),
        };
        log::info!(
            "Recording finished: {} trial {} ({} samples, template {})",
            summary.pattern_name,
            summary.trial,
            summary.trial_len,
            summary.template_len
        );

        if let Some(store) = self.store.as_mut() {
            let ext = &self.config.pattern_extension;
            let stem = format!("pattern{}_{}", self.pattern_index, summary.trial);
            let trial = pattern.last_trial().unwrap_or(&[]);
            store.store(&format!("{}.{}", stem, ext), trial)?;
            store.store(&format!("{}d.{}", stem, ext), pattern.data())?;
        }

        Ok(summary)
    }

    /// Outcome of the last recording stopped by the length cap, if not yet collected
    pub fn take_auto_stopped(&mut self) -> Option<Result<RecordingSummary, RecognizerError>> {
        self.auto_stopped.take()
    }

    /// Forget every recorded pattern
    pub fn clear_all_recorded_patterns(&mut self) {
        log::info!("Clearing {} recorded patterns", self.recorded.len());
        self.recorded.clear();
        self.pattern_index = 0;
    }

    /// Swap the library for the patterns of `profile`.
    ///
    /// The library is cleared first. If any file fails to import, it stays
    /// empty and the error is returned.
    pub fn set_active_profile(&mut self, profile: &str) -> Result<(), RecognizerError> {
        self.library.clear();
        self.last_match = None;
        self.active_profile = None;

        if !self.config.has_profile(profile) {
            log::warn!("Unknown profile '{}', loading baseline pattern only", profile);
        }

        let files = self.config.profile_files(profile);
        let dir: PathBuf = self.config.pattern_dir.clone();
        self.library = PatternLibrary::load(&dir, &files)?;
        self.active_profile = Some(profile.to_string());

        log::info!(
            "Active profile '{}' with {} patterns",
            profile,
            self.library.len()
        );
        Ok(())
    }

    pub fn status(&self) -> RecognizerStatus<N> {
        let held = match &self.state {
            RecognizerState::ResultHold { event, .. } => Some(event.clone()),
            _ => None,
        };
        RecognizerStatus {
            smoothed: self.filter.last().copied(),
            history_len: self.history.len(),
            state: self.state.label(),
            last_match: self.last_match.clone(),
            held,
            recording_len: self.record.len(),
        }
    }

    pub fn state(&self) -> &RecognizerState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecognizerState::Recording { .. })
    }

    pub fn library(&self) -> &PatternLibrary<N> {
        &self.library
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    pub fn recorded_patterns(&self) -> &[PatternTemplate<N>] {
        &self.recorded
    }

    pub fn history(&self) -> &HistoryBuffer<N> {
        &self.history
    }

    /// Samples captured so far in the current recording, realigned so the
    /// newest sits at `t = 0`
    pub fn recording_snapshot(&self) -> Vec<Sample<N>> {
        let mut snapshot = self.record.clone();
        snapshot.realign_to_end();
        snapshot
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }
}
