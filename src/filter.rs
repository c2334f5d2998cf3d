//! # Low-Pass Filter Module
//!
//! Exponential smoothing of raw sensor samples to attenuate jitter before
//! they enter the history buffer. We never integrate the smoothed signal, so
//! the lag introduced here does not accumulate as drift.

use crate::timeseries::Sample;

/// Default smoothing factor
pub const DEFAULT_ALPHA: f32 = 0.15;

/// Stateful exponential low-pass filter over N channels
#[derive(Debug, Clone)]
pub struct SampleFilter<const N: usize> {
    alpha: f32,
    last: Option<Sample<N>>,
}

impl<const N: usize> SampleFilter<N> {
    /// `alpha` must lie in (0, 1]; 1.0 disables smoothing
    pub fn new(alpha: f32) -> Self {
        Self { alpha, last: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Most recent smoothed output
    pub fn last(&self) -> Option<&Sample<N>> {
        self.last.as_ref()
    }

    /// Feed one raw reading taken at wall-clock time `now`.
    ///
    /// The first reading seeds the filter unchanged. A non-finite channel
    /// holds its previous smoothed value (0 before seeding), so one bad
    /// reading cannot stick in the filter state.
    pub fn update(&mut self, mut raw: [f32; N], now: f64) -> Sample<N> {
        if raw.iter().any(|v| !v.is_finite()) {
            log::warn!("Non-finite sensor reading {:?} at {:.3}s, holding previous value", raw, now);
            for (c, value) in raw.iter_mut().enumerate() {
                if !value.is_finite() {
                    *value = self.last.map(|s| s.values[c]).unwrap_or(0.0);
                }
            }
        }
        let raw = Sample::new(now, raw);
        let smoothed = match &self.last {
            Some(previous) => smooth(previous, &raw, self.alpha),
            None => raw,
        };
        self.last = Some(smoothed);
        smoothed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// One step of `alpha * raw + (1 - alpha) * previous`, channel by channel.
///
/// The result takes the raw sample's timestamp with a zero relative offset.
pub fn smooth<const N: usize>(previous: &Sample<N>, raw: &Sample<N>, alpha: f32) -> Sample<N> {
    let mut values = [0.0f32; N];
    for (c, value) in values.iter_mut().enumerate() {
        *value = alpha * raw.values[c] + (1.0 - alpha) * previous.values[c];
    }
    Sample::new(raw.t_abs, values)
}
