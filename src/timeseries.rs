//! # Sample Time Series Module
//!
//! Timestamped N-channel samples and the bounded-lookback history buffer the
//! recognizer matches against.
//!
//! ## Time Fields
//! - `t_abs`: wall-clock seconds at creation, never changed afterwards
//! - `t`: signed offset in seconds relative to a reference instant; recomputed
//!   whenever the reference changes (live tracking vs. trial end)
//!
//! ## Why Const Generics
//! Acceleration (3 channels) and touch displacement (2 channels) run the same
//! algorithms. The channel count is a type parameter so there is one
//! implementation of filtering, alignment and matching.

/// One smoothed sensor reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<const N: usize> {
    /// Offset relative to the current reference instant (seconds, usually <= 0)
    pub t: f64,
    /// Wall-clock time at creation (seconds)
    pub t_abs: f64,
    pub values: [f32; N],
}

impl<const N: usize> Sample<N> {
    /// Create a sample at wall-clock time `t_abs` with a zero relative offset
    pub fn new(t_abs: f64, values: [f32; N]) -> Self {
        Self {
            t: 0.0,
            t_abs,
            values,
        }
    }

    /// Create a sample with an explicit relative offset
    pub fn with_offset(t: f64, t_abs: f64, values: [f32; N]) -> Self {
        Self { t, t_abs, values }
    }

    /// Sum of per-channel products
    pub fn dot(&self, other: &Self) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean distance over all channels
    pub fn distance(&self, other: &Self) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }
}

pub trait SampleSliceExt {
    /// Recompute every `t` as `t_abs - reference`
    fn realign(&mut self, reference: f64);
    /// Realign so the last sample sits at `t = 0`
    fn realign_to_end(&mut self);
}

impl<const N: usize> SampleSliceExt for [Sample<N>] {
    fn realign(&mut self, reference: f64) {
        for sample in self.iter_mut() {
            sample.t = sample.t_abs - reference;
        }
    }

    fn realign_to_end(&mut self) {
        if let Some(last) = self.last() {
            let reference = last.t_abs;
            self.realign(reference);
        }
    }
}

/// Chronologically ordered samples covering the last `|lookback|` seconds
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer<const N: usize> {
    data: Vec<Sample<N>>,
}

impl<const N: usize> HistoryBuffer<N> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Insert at the tail (newest end)
    pub fn append(&mut self, sample: Sample<N>) {
        self.data.push(sample);
    }

    /// Age every sample by `dt` seconds and drop those older than `lookback`.
    ///
    /// `lookback` is negative (e.g. -1.5). Eviction is a single compaction
    /// pass, so no element is skipped when its predecessor is removed.
    pub fn tick(&mut self, dt: f64, lookback: f64) {
        for sample in self.data.iter_mut() {
            sample.t -= dt;
        }

        let before = self.data.len();
        self.data.retain(|sample| sample.t >= lookback);

        let evicted = before - self.data.len();
        if evicted > 0 {
            log::trace!("History: evicted {} samples older than {}s", evicted, lookback);
        }
    }

    /// Recompute every offset relative to `reference`
    pub fn realign(&mut self, reference: f64) {
        self.data.realign(reference);
    }

    pub fn samples(&self) -> &[Sample<N>] {
        &self.data
    }

    pub fn last(&self) -> Option<&Sample<N>> {
        self.data.last()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
