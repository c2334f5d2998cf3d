//! # Dynamic Time Warping Module
//!
//! Banded DTW distance between the live sample window and a reference template.
//!
//! ## Band Handling
//! The Sakoe-Chiba band limits how far the warp path may leave the diagonal.
//! `BandMode::FirstRowColumn` applies it only to the first row and column of
//! the cost matrix, which is how the gesture thresholds were calibrated.
//! `BandMode::Strict` also blocks interior cells outside the band.

use serde::{Deserialize, Serialize};

use crate::timeseries::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandMode {
    /// Band enforced on the first row and column only
    #[default]
    FirstRowColumn,
    /// Band enforced on every cell
    Strict,
}

/// Banded DTW matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtwMatcher {
    band_width: usize,
    mode: BandMode,
}

impl DtwMatcher {
    pub fn new(band_width: usize, mode: BandMode) -> Self {
        Self { band_width, mode }
    }

    pub fn band_width(&self) -> usize {
        self.band_width
    }

    pub fn mode(&self) -> BandMode {
        self.mode
    }

    /// DTW distance between `window` and `template`.
    ///
    /// Returns `f32::INFINITY` when either side is empty or when the band
    /// leaves no path to the final cell.
    pub fn distance<const N: usize>(&self, window: &[Sample<N>], template: &[Sample<N>]) -> f32 {
        let rows = window.len();
        let cols = template.len();
        if rows == 0 || cols == 0 {
            return f32::INFINITY;
        }

        let band = self.band_width;
        let at = |i: usize, j: usize| i * cols + j;
        let mut cost = vec![f32::INFINITY; rows * cols];

        cost[at(0, 0)] = window[0].distance(&template[0]);

        // First column: window samples against the first template point
        for i in 1..rows.min(band) {
            cost[at(i, 0)] = window[i].distance(&template[0]) + cost[at(i - 1, 0)];
        }

        // First row: first window sample against template points
        for j in 1..cols.min(band) {
            cost[at(0, j)] = window[0].distance(&template[j]) + cost[at(0, j - 1)];
        }

        for j in 1..cols {
            for i in 1..rows {
                if self.mode == BandMode::Strict && i.abs_diff(j) >= band {
                    continue;
                }

                let best_prev = cost[at(i, j - 1)]
                    .min(cost[at(i - 1, j - 1)])
                    .min(cost[at(i - 1, j)]);
                cost[at(i, j)] = window[i].distance(&template[j]) + best_prev;
            }
        }

        cost[at(rows - 1, cols - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[[f32; 3]]) -> Vec<Sample<3>> {
        values.iter().map(|v| Sample::new(0.0, *v)).collect()
    }

    fn wave() -> Vec<Sample<3>> {
        (0..12)
            .map(|i| {
                let x = i as f32 * 0.5;
                Sample::new(0.0, [x.sin(), x.cos(), 0.1 * x])
            })
            .collect()
    }

    #[test]
    fn test_empty_inputs_are_infinite() {
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);
        let t = wave();
        assert_eq!(matcher.distance(&[], &t), f32::INFINITY);
        assert_eq!(matcher.distance(&t, &[]), f32::INFINITY);
    }

    #[test]
    fn test_self_distance_is_zero() {
        let t = wave();
        for band in 1..5 {
            for mode in [BandMode::FirstRowColumn, BandMode::Strict] {
                let matcher = DtwMatcher::new(band, mode);
                assert_eq!(matcher.distance(&t, &t), 0.0);
            }
        }
    }

    #[test]
    fn test_single_point() {
        let matcher = DtwMatcher::new(1, BandMode::FirstRowColumn);
        let a = series(&[[0.0, 3.0, 0.0]]);
        let b = series(&[[4.0, 0.0, 0.0]]);
        assert!((matcher.distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_offset_increases_distance() {
        let template = wave();
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);
        let base = matcher.distance(&template, &template);

        let shifted: Vec<Sample<3>> = template
            .iter()
            .map(|s| Sample::new(0.0, [s.values[0] + 0.7, s.values[1] - 0.4, s.values[2] + 0.2]))
            .collect();
        assert!(matcher.distance(&shifted, &template) > base);
    }

    #[test]
    fn test_time_stretch_is_absorbed() {
        let template = series(&[[0.0, 0.0, 0.0], [1.0, 5.0, 0.0], [0.0, 0.0, 0.0]]);
        let stretched = series(&[
            [0.0, 0.0, 0.0],
            [1.0, 5.0, 0.0],
            [1.0, 5.0, 0.0],
            [0.0, 0.0, 0.0],
        ]);
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);
        assert_eq!(matcher.distance(&stretched, &template), 0.0);
    }

    #[test]
    fn test_first_row_outside_band_is_unreachable() {
        // one window sample cannot cover a template longer than the band
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);
        let window = series(&[[0.0, 0.0, 0.0]]);
        let template = series(&[[0.0, 0.0, 0.0]; 5]);
        assert_eq!(matcher.distance(&window, &template), f32::INFINITY);

        let short = series(&[[0.0, 0.0, 0.0]; 3]);
        assert_eq!(matcher.distance(&window, &short), 0.0);
    }

    #[test]
    fn test_strict_band_blocks_interior_detours() {
        // Length mismatch beyond the band is reachable only through the
        // unbanded interior
        let window = series(&[[0.0, 0.0, 0.0]; 8]);
        let template = series(&[[0.0, 0.0, 0.0]; 3]);

        let loose = DtwMatcher::new(2, BandMode::FirstRowColumn);
        let strict = DtwMatcher::new(2, BandMode::Strict);
        assert_eq!(loose.distance(&window, &template), 0.0);
        assert_eq!(strict.distance(&window, &template), f32::INFINITY);
    }
}
