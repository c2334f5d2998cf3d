//! # Recognizer Worker Module
//!
//! Runs one `GestureRecognizer` on a dedicated thread so the host's frame
//! loop never blocks on DTW matching.
//!
//! ## Key Components
//! - `RecognizerWorker`: owns the thread and both channel ends the host uses
//! - `RecognizerCommand`: frames and recording/profile commands from the host
//! - `RecognizerUpdate`: recognitions and command outcomes back to the host
//!
//! ## Why
//! The recognizer holds mutable state (history, library, recordings) with no
//! locking. Confining it to one thread and talking to it over channels keeps
//! that state single-owner while sensor acquisition and display live elsewhere.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

use crate::recognizer::{GestureRecognizer, RecognitionEvent, RecognizerStatus, RecordingSummary};
use crate::sensor::SensorFrame;

/// Commands sent from the host to the worker thread
#[derive(Debug, Clone)]
pub enum RecognizerCommand<const N: usize> {
    /// Process one sensor frame
    Tick(SensorFrame<N>),
    BeginNewRecording,
    BeginTrialRecording,
    EndRecording,
    ClearRecordedPatterns,
    SetProfile(String),
    /// Request a `RecognizerUpdate::Status` snapshot
    QueryStatus,
    /// Stop the worker loop
    Shutdown,
}

/// Updates sent from the worker thread to the host
#[derive(Debug, Clone)]
pub enum RecognizerUpdate<const N: usize> {
    Recognized(RecognitionEvent),
    RecordingStarted,
    RecordingFinished(RecordingSummary),
    ProfileChanged { profile: String, patterns: usize },
    Status(RecognizerStatus<N>),
    CommandFailed { command: &'static str, reason: String },
}

/// Handle to a recognizer running on its own thread
pub struct RecognizerWorker<const N: usize> {
    command_tx: Sender<RecognizerCommand<N>>,
    update_rx: Receiver<RecognizerUpdate<N>>,
    thread: Option<thread::JoinHandle<GestureRecognizer<N>>>,
}

impl<const N: usize> RecognizerWorker<N> {
    /// Move `recognizer` onto a new thread and start processing commands
    pub fn spawn(recognizer: GestureRecognizer<N>) -> Self {
        let (command_tx, command_rx) = unbounded();
        let (update_tx, update_rx) = unbounded();

        let thread = thread::spawn(move || Self::worker_loop(recognizer, command_rx, update_tx));

        Self {
            command_tx,
            update_rx,
            thread: Some(thread),
        }
    }

    /// A sender for issuing commands, e.g. from the sensor thread
    pub fn sender(&self) -> Sender<RecognizerCommand<N>> {
        self.command_tx.clone()
    }

    pub fn updates(&self) -> &Receiver<RecognizerUpdate<N>> {
        &self.update_rx
    }

    pub fn send(&self, command: RecognizerCommand<N>) -> Result<(), String> {
        self.command_tx
            .send(command)
            .map_err(|e| format!("Failed to send recognizer command: {}", e))
    }

    /// Stop the worker and take the recognizer back
    pub fn shutdown(mut self) -> Option<GestureRecognizer<N>> {
        let _ = self.command_tx.send(RecognizerCommand::Shutdown);
        self.thread.take().and_then(|handle| handle.join().ok())
    }

    /// Worker thread loop
    ///
    /// Processes commands until `Shutdown` or until every sender is dropped.
    fn worker_loop(
        mut recognizer: GestureRecognizer<N>,
        command_rx: Receiver<RecognizerCommand<N>>,
        update_tx: Sender<RecognizerUpdate<N>>,
    ) -> GestureRecognizer<N> {
        let send = |update: RecognizerUpdate<N>| {
            if update_tx.send(update).is_err() {
                log::debug!("Recognizer worker: update receiver dropped");
            }
        };

        loop {
            let command = match command_rx.recv() {
                Ok(command) => command,
                Err(_) => {
                    log::info!("Recognizer worker: command channel closed");
                    break;
                }
            };

            match command {
                RecognizerCommand::Tick(frame) => {
                    if let Some(event) = recognizer.tick(frame.raw, frame.dt, frame.now) {
                        send(RecognizerUpdate::Recognized(event));
                    }
                    match recognizer.take_auto_stopped() {
                        Some(Ok(summary)) => send(RecognizerUpdate::RecordingFinished(summary)),
                        Some(Err(e)) => send(RecognizerUpdate::CommandFailed {
                            command: "end_recording",
                            reason: e.to_string(),
                        }),
                        None => {}
                    }
                }
                RecognizerCommand::BeginNewRecording => match recognizer.begin_new_recording() {
                    Ok(()) => send(RecognizerUpdate::RecordingStarted),
                    Err(e) => send(RecognizerUpdate::CommandFailed {
                        command: "begin_new_recording",
                        reason: e.to_string(),
                    }),
                },
                RecognizerCommand::BeginTrialRecording => match recognizer.begin_trial_recording() {
                    Ok(()) => send(RecognizerUpdate::RecordingStarted),
                    Err(e) => send(RecognizerUpdate::CommandFailed {
                        command: "begin_trial_recording",
                        reason: e.to_string(),
                    }),
                },
                RecognizerCommand::EndRecording => match recognizer.end_recording() {
                    Ok(summary) => send(RecognizerUpdate::RecordingFinished(summary)),
                    Err(e) => {
                        log::error!("Failed to finish recording: {}", e);
                        send(RecognizerUpdate::CommandFailed {
                            command: "end_recording",
                            reason: e.to_string(),
                        })
                    }
                },
                RecognizerCommand::ClearRecordedPatterns => {
                    recognizer.clear_all_recorded_patterns();
                }
                RecognizerCommand::SetProfile(profile) => {
                    match recognizer.set_active_profile(&profile) {
                        Ok(()) => send(RecognizerUpdate::ProfileChanged {
                            patterns: recognizer.library().len(),
                            profile,
                        }),
                        Err(e) => {
                            log::error!("Failed to load profile '{}': {}", profile, e);
                            send(RecognizerUpdate::CommandFailed {
                                command: "set_active_profile",
                                reason: e.to_string(),
                            })
                        }
                    }
                }
                RecognizerCommand::QueryStatus => {
                    send(RecognizerUpdate::Status(recognizer.status()));
                }
                RecognizerCommand::Shutdown => {
                    log::info!("Recognizer worker stopped");
                    break;
                }
            }
        }

        recognizer
    }
}

impl<const N: usize> Drop for RecognizerWorker<N> {
    fn drop(&mut self) {
        // Signal worker thread to stop
        let _ = self.command_tx.send(RecognizerCommand::Shutdown);

        // Wait for worker thread to finish
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecognizerConfig;
    use crate::library::PatternLibrary;
    use crate::recognizer::AccelRecognizer;
    use crate::timeseries::Sample;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn recognizer() -> AccelRecognizer {
        let mut config = RecognizerConfig::accel();
        config.alpha = 1.0;
        config.lookback = -0.25;
        config.baseline_pattern = "stationary.txt".to_string();

        let mut library = PatternLibrary::new();
        library.insert("stationary", (0..5).map(|_| Sample::new(0.0, [0.0; 3])).collect());
        library.insert(
            "tap",
            vec![
                Sample::new(0.0, [0.0, 0.0, 0.0]),
                Sample::new(0.0, [1.0, 5.0, 0.0]),
                Sample::new(0.0, [0.0, 0.0, 0.0]),
            ],
        );
        AccelRecognizer::new(config).with_library(library)
    }

    #[test]
    fn test_worker_emits_recognition() {
        let worker = RecognizerWorker::spawn(recognizer());
        let frames = [[0.0, 0.0, 0.0], [1.0, 5.0, 0.0], [0.0, 0.0, 0.0]];
        for (i, raw) in frames.iter().enumerate() {
            let now = 0.1 * (i + 1) as f64;
            worker
                .send(RecognizerCommand::Tick(SensorFrame { raw: *raw, dt: 0.1, now }))
                .unwrap();
        }

        match worker.updates().recv_timeout(TIMEOUT) {
            Ok(RecognizerUpdate::Recognized(event)) => assert_eq!(event.pattern_name, "tap"),
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_worker_reports_command_failure() {
        let worker = RecognizerWorker::spawn(recognizer());
        worker.send(RecognizerCommand::EndRecording).unwrap();

        match worker.updates().recv_timeout(TIMEOUT) {
            Ok(RecognizerUpdate::CommandFailed { command, .. }) => {
                assert_eq!(command, "end_recording")
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_worker_status_and_shutdown() {
        let worker = RecognizerWorker::spawn(recognizer());
        worker
            .send(RecognizerCommand::Tick(SensorFrame { raw: [0.0; 3], dt: 0.0, now: 0.0 }))
            .unwrap();
        worker.send(RecognizerCommand::QueryStatus).unwrap();

        match worker.updates().recv_timeout(TIMEOUT) {
            Ok(RecognizerUpdate::Status(status)) => {
                assert_eq!(status.state, "idle");
                assert_eq!(status.history_len, 2);
            }
            other => panic!("unexpected update: {:?}", other),
        }

        let recognizer = worker.shutdown().expect("worker returns recognizer");
        assert_eq!(recognizer.history().len(), 2);
    }

    #[test]
    fn test_worker_recording_round_trip() {
        let worker = RecognizerWorker::spawn(recognizer());
        let sender = worker.sender();
        sender.send(RecognizerCommand::BeginNewRecording).unwrap();
        for i in 0..2 {
            let frame = SensorFrame { raw: [1.0, 0.0, 0.0], dt: 0.1, now: 0.1 * i as f64 };
            sender.send(RecognizerCommand::Tick(frame)).unwrap();
        }
        sender.send(RecognizerCommand::EndRecording).unwrap();

        let updates: Vec<_> = (0..2)
            .map(|_| worker.updates().recv_timeout(TIMEOUT).expect("update"))
            .collect();
        assert!(matches!(updates[0], RecognizerUpdate::RecordingStarted));
        match &updates[1] {
            RecognizerUpdate::RecordingFinished(summary) => {
                assert_eq!(summary.pattern_name, "pattern_1");
                assert_eq!(summary.trial_len, 2);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }
}
