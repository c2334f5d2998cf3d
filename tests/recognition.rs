//! End-to-end recognition against pattern files on disk.

use std::fs;
use std::path::Path;

use gesture_warp::error::ImportErrorKind;
use gesture_warp::pattern_file::DirectoryPatternStore;
use gesture_warp::{AccelRecognizer, RecognitionEvent, RecognizerConfig, RecognizerError};
use tempfile::tempdir;

const DT: f64 = 0.1;
const REST: [f32; 3] = [0.0, 0.0, 0.0];
const TAP: [f32; 3] = [1.0, 5.0, 0.0];
const LIFT: [f32; 3] = [0.0, 0.0, 5.0];

fn write_patterns(dir: &Path) {
    fs::write(
        dir.join("stationary.txt"),
        "-0.4,0,0,0\n-0.3,0,0,0\n-0.2,0,0,0\n-0.1,0,0,0\n0,0,0,0\n",
    )
    .unwrap();
    fs::write(dir.join("tap.txt"), "-0.2,0,0,0\n-0.1,1,5,0\n0,0,0,0\n").unwrap();
    fs::write(dir.join("lift.txt"), "-0.2,0,0,0\n-0.1,0,0,5\n\n0,0,0,0\n").unwrap();
}

/// Three-sample window, no smoothing
fn config(dir: &Path) -> RecognizerConfig {
    let mut config = RecognizerConfig::accel();
    config.alpha = 1.0;
    config.lookback = -0.25;
    config.baseline_pattern = "stationary.txt".to_string();
    config.pattern_dir = dir.to_path_buf();
    config.profiles.clear();
    config.profiles.insert("taps".to_string(), vec!["tap.txt".to_string()]);
    config.profiles.insert("lifts".to_string(), vec!["lift.txt".to_string()]);
    config
}

struct Replay {
    recognizer: AccelRecognizer,
    clock: f64,
}

impl Replay {
    fn new(recognizer: AccelRecognizer) -> Self {
        Self {
            recognizer,
            clock: 0.0,
        }
    }

    fn feed(&mut self, input: &[[f32; 3]]) -> Vec<RecognitionEvent> {
        let mut events = Vec::new();
        for raw in input {
            self.clock += DT;
            if let Some(event) = self.recognizer.tick(*raw, DT, self.clock) {
                events.push(event);
            }
        }
        events
    }

    fn names(&mut self, input: &[[f32; 3]]) -> Vec<String> {
        self.feed(input).into_iter().map(|e| e.pattern_name).collect()
    }
}

#[test]
fn test_tap_recognized_once_per_hold() {
    let dir = tempdir().unwrap();
    write_patterns(dir.path());

    let mut recognizer = AccelRecognizer::new(config(dir.path()));
    recognizer.set_active_profile("taps").unwrap();
    let mut replay = Replay::new(recognizer);

    assert!(replay.feed(&[REST; 10]).is_empty());

    let events = replay.feed(&[TAP, REST]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].pattern_name, "tap");
    assert!(events[0].distance < 1e-3);

    // Still inside the 1.5 s hold
    assert!(replay.feed(&[REST, TAP, REST, TAP, REST]).is_empty());

    replay.feed(&[REST; 20]);
    assert_eq!(replay.names(&[TAP, REST]), vec!["tap"]);
}

#[test]
fn test_profile_switch_replaces_library() {
    let dir = tempdir().unwrap();
    write_patterns(dir.path());

    let mut recognizer = AccelRecognizer::new(config(dir.path()));
    recognizer.set_active_profile("lifts").unwrap();
    let mut replay = Replay::new(recognizer);

    assert!(replay.names(&[REST, TAP, REST]).is_empty());
    assert_eq!(replay.names(&[LIFT, REST]), vec!["lift"]);

    replay.recognizer.set_active_profile("taps").unwrap();
    assert!(!replay.recognizer.library().contains("lift"));
    replay.feed(&[REST; 20]);

    assert!(replay.names(&[LIFT, REST]).is_empty());
    assert_eq!(replay.names(&[REST, TAP, REST]), vec!["tap"]);
}

#[test]
fn test_broken_profile_fails_closed() {
    let dir = tempdir().unwrap();
    write_patterns(dir.path());
    fs::write(dir.path().join("bad.txt"), "0,1,2\n").unwrap();

    let mut config = config(dir.path());
    config
        .profiles
        .insert("broken".to_string(), vec!["tap.txt".to_string(), "bad.txt".to_string()]);

    let mut recognizer = AccelRecognizer::new(config);
    recognizer.set_active_profile("taps").unwrap();

    match recognizer.set_active_profile("broken") {
        Err(RecognizerError::Import(e)) => {
            assert!(matches!(e.kind, ImportErrorKind::Parse { line: 1, .. }));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(recognizer.library().is_empty());

    let mut replay = Replay::new(recognizer);
    assert!(replay.feed(&[REST, TAP, REST, REST]).is_empty());
}

#[test]
fn test_recorded_pattern_is_recognized_after_reload() {
    let base = tempdir().unwrap();
    let store = DirectoryPatternStore::session(base.path());
    let session_dir = store.dir().to_path_buf();

    let mut recorder = AccelRecognizer::new(config(base.path())).with_store(store);
    recorder.begin_new_recording().unwrap();
    let mut replay = Replay::new(recorder);
    replay.feed(&[REST, LIFT, REST]);
    let summary = replay.recognizer.end_recording().unwrap();
    assert_eq!(summary.pattern_name, "pattern_1");

    assert!(session_dir.join("pattern1_0.txt").exists());
    let template = fs::read_to_string(session_dir.join("pattern1_0d.txt")).unwrap();
    assert_eq!(template.lines().count(), 3);
    assert_eq!(template.lines().last(), Some("0,0,0,0"));

    write_patterns(&session_dir);
    let mut config = config(&session_dir);
    config
        .profiles
        .insert("mine".to_string(), vec!["pattern1_0d.txt".to_string()]);

    let mut recognizer = AccelRecognizer::new(config);
    recognizer.set_active_profile("mine").unwrap();
    let mut replay = Replay::new(recognizer);
    assert_eq!(replay.names(&[REST, LIFT, REST]), vec!["pattern1_0d"]);
}

#[test]
fn test_non_finite_baseline_is_rejected() {
    let dir = tempdir().unwrap();
    write_patterns(dir.path());
    fs::write(dir.path().join("stationary.txt"), "0,nan,0,0\n0,0,0,0\n0,0,0,0\n").unwrap();
    fs::write(dir.path().join("noise.txt"), "0,3,3,3\n0,3,3,3\n0,3,3,3\n").unwrap();

    let mut config = config(dir.path());
    config
        .profiles
        .insert("noise".to_string(), vec!["noise.txt".to_string()]);

    let mut recognizer = AccelRecognizer::new(config);
    match recognizer.set_active_profile("noise") {
        Err(RecognizerError::Import(e)) => {
            assert!(e.file.ends_with("stationary.txt"));
            assert!(matches!(e.kind, ImportErrorKind::Parse { line: 1, .. }));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let mut replay = Replay::new(recognizer);
    assert!(replay.feed(&[REST; 5]).is_empty());
}
