//! # Pattern Template Module
//!
//! Builds one reference template from several recordings of the same gesture.
//!
//! ## Algorithm
//! 1. Each trial is registered against the previous template by the integer
//!    shift that maximizes their cross-correlation (sum of per-channel dot
//!    products over the overlap).
//! 2. The overlap common to all shifted trials is kept.
//! 3. Every kept position is the per-channel mean across trials.
//!
//! ## Why Align First
//! Hand-recorded repetitions never start at the same instant. Averaging them
//! unaligned smears the gesture; aligning by maximal correlation keeps the
//! template representative.

use crate::timeseries::{Sample, SampleSliceExt};

/// Cross-correlation of `a` and `b` with `b` shifted right by `offset` samples.
///
/// Sums `a[k] · b[k - offset]` over the overlapping index range.
pub fn xcorr_at<const N: usize>(a: &[Sample<N>], b: &[Sample<N>], offset: isize) -> f32 {
    let n1 = a.len() as isize;
    let n2 = b.len() as isize;
    let start = offset.max(0);
    let end = n1.min(n2 + offset);

    (start..end)
        .map(|k| a[k as usize].dot(&b[(k - offset) as usize]))
        .sum()
}

/// Shift of `b` relative to `a` with maximal cross-correlation.
///
/// Offsets range over `-(len(b) - 1) ..= len(a) - 1`. The search is seeded
/// with a correlation of zero, so an empty `a` or a correlation that is
/// negative everywhere yields 0; ties keep the lowest offset.
pub fn best_offset<const N: usize>(a: &[Sample<N>], b: &[Sample<N>]) -> isize {
    let n1 = a.len() as isize;
    let n2 = b.len() as isize;

    let mut max_xcorr = 0.0f32;
    let mut best = 0isize;

    for offset in -(n2 - 1)..n1 {
        let current = xcorr_at(a, b, offset);
        if current > max_xcorr {
            max_xcorr = current;
            best = offset;
        }
    }

    best
}

/// Align `trials` against `previous` and average them into a new template.
///
/// Pure function of its inputs. Returns an empty template when there are no
/// trials or when the aligned trials do not overlap. Output samples carry the
/// first trial's `t_abs` at the matching position and a zero offset.
pub fn calculate_data<const N: usize>(
    previous: &[Sample<N>],
    trials: &[Vec<Sample<N>>],
) -> Vec<Sample<N>> {
    if trials.is_empty() {
        return Vec::new();
    }

    let offsets: Vec<isize> = trials
        .iter()
        .map(|trial| best_offset(previous, trial))
        .collect();

    let start = offsets.iter().copied().max().unwrap_or(0);
    let end = trials
        .iter()
        .zip(offsets.iter())
        .map(|(trial, offset)| trial.len() as isize + offset)
        .min()
        .unwrap_or(0);

    if end <= start {
        return Vec::new();
    }

    let count = trials.len() as f32;
    (0..end - start)
        .map(|p| {
            let mut values = [0.0f32; N];
            for (trial, offset) in trials.iter().zip(offsets.iter()) {
                let sample = &trial[(p + start - offset) as usize];
                for (c, value) in values.iter_mut().enumerate() {
                    *value += sample.values[c];
                }
            }
            for value in values.iter_mut() {
                *value /= count;
            }

            let anchor = &trials[0][(p + start - offsets[0]) as usize];
            Sample::new(anchor.t_abs, values)
        })
        .collect()
}

/// A named gesture with its recorded trials and derived template
#[derive(Debug, Clone)]
pub struct PatternTemplate<const N: usize> {
    name: String,
    trials: Vec<Vec<Sample<N>>>,
    data: Vec<Sample<N>>,
}

impl<const N: usize> PatternTemplate<N> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trials: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Create a pattern from a single trial
    pub fn from_trial(name: impl Into<String>, trial: Vec<Sample<N>>) -> Self {
        let mut pattern = Self::new(name);
        pattern.add_trial(trial);
        pattern
    }

    /// Add a trial and recalculate the template.
    pub fn add_trial(&mut self, trial: Vec<Sample<N>>) {
        self.trials.push(trial);
        self.data = calculate_data(&self.data, &self.trials);
    }

    /// Move the reference instant of the newest trial and of the template to
    /// their own last sample, so both end at `t = 0`.
    pub fn realign_to_end(&mut self) {
        if let Some(trial) = self.trials.last_mut() {
            trial.realign_to_end();
        }
        self.data.realign_to_end();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trials(&self) -> &[Vec<Sample<N>>] {
        &self.trials
    }

    pub fn last_trial(&self) -> Option<&[Sample<N>]> {
        self.trials.last().map(|t| t.as_slice())
    }

    pub fn data(&self) -> &[Sample<N>] {
        &self.data
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }
}
