//! # gesture-warp
//!
//! Gesture recognition for continuous sensor streams (3-axis acceleration or
//! 2-axis touch displacement) by banded dynamic time warping against a
//! library of recorded reference patterns.
//!
//! ## Module Map
//! - `filter` / `timeseries`: smoothing and the sliding history window
//! - `template` / `dtw`: building reference templates and scoring windows
//! - `library` / `pattern_file`: loading and storing patterns
//! - `recognizer`: the per-tick state machine
//! - `worker`: runs a recognizer on its own thread
//! - `sensor`: frame timing and touch displacement
//! - `config` / `error`: settings and error types

pub mod config;
pub mod dtw;
pub mod error;
pub mod filter;
pub mod library;
pub mod pattern_file;
pub mod recognizer;
pub mod sensor;
pub mod template;
pub mod timeseries;
pub mod worker;

pub use config::{Config, RecognizerConfig};
pub use dtw::{BandMode, DtwMatcher};
pub use error::{ConfigError, PatternImportError, PatternStoreError, RecognizerError};
pub use library::PatternLibrary;
pub use recognizer::{
    AccelRecognizer, GestureRecognizer, RecognitionEvent, RecognizerStatus, TouchRecognizer,
};
pub use timeseries::Sample;
pub use worker::{RecognizerCommand, RecognizerUpdate, RecognizerWorker};
