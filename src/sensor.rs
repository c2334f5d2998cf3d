//! # Sensor Input Module
//!
//! Adapters between raw sensor readings and the per-tick input the
//! recognizer consumes.
//!
//! ## Key Types
//! - `SensorFrame`: one raw reading with its timing
//! - `FrameClock`: derives Δt from successive wall-clock timestamps
//! - `TouchDisplacement`: turns absolute touch positions into per-frame
//!   displacement, the 2-channel signal touch gestures are recorded in

/// One raw reading as delivered by the host each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame<const N: usize> {
    pub raw: [f32; N],
    /// Seconds since the previous frame
    pub dt: f64,
    /// Wall-clock seconds
    pub now: f64,
}

/// Tracks the previous timestamp to produce frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call; 0 on the first call.
    ///
    /// Timestamps that go backwards yield 0 rather than a negative delta.
    pub fn advance(&mut self, now: f64) -> f64 {
        let dt = match self.last {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(now);
        dt
    }

    /// Wrap a raw reading taken at `now` into a frame
    pub fn frame<const N: usize>(&mut self, raw: [f32; N], now: f64) -> SensorFrame<N> {
        SensorFrame {
            raw,
            dt: self.advance(now),
            now,
        }
    }
}

/// Per-frame touch displacement.
///
/// No touch is treated as position (0, 0), so lifting or placing a finger
/// shows up as a large jump; the no-touch baseline pattern is recorded the
/// same way.
#[derive(Debug, Clone, Default)]
pub struct TouchDisplacement {
    last: [f32; 2],
}

impl TouchDisplacement {
    pub fn new() -> Self {
        Self { last: [0.0, 0.0] }
    }

    /// Displacement from the previous frame's position
    pub fn update(&mut self, position: Option<[f32; 2]>) -> [f32; 2] {
        let current = position.unwrap_or([0.0, 0.0]);
        let delta = [current[0] - self.last[0], current[1] - self.last[1]];
        self.last = current;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_deltas() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(10.0), 0.0);
        assert!((clock.advance(10.25) - 0.25).abs() < 1e-12);
        assert_eq!(clock.advance(10.0), 0.0);
    }

    #[test]
    fn test_frame_wraps_reading() {
        let mut clock = FrameClock::new();
        clock.advance(1.0);
        let frame = clock.frame([0.1f32, 0.2, 0.3], 1.5);
        assert_eq!(frame.dt, 0.5);
        assert_eq!(frame.now, 1.5);
        assert_eq!(frame.raw, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_touch_displacement() {
        let mut touch = TouchDisplacement::new();
        assert_eq!(touch.update(Some([100.0, 50.0])), [100.0, 50.0]);
        assert_eq!(touch.update(Some([110.0, 45.0])), [10.0, -5.0]);
        assert_eq!(touch.update(Some([110.0, 45.0])), [0.0, 0.0]);
        // finger lifted
        assert_eq!(touch.update(None), [-110.0, -45.0]);
        assert_eq!(touch.update(None), [0.0, 0.0]);
    }
}
