//! Fixed-timestep frame clock.
//!
//! Simulation runs at a fixed 60 Hz while frames arrive at whatever rate the
//! host manages. Each frame reports how many fixed steps are due; leftover
//! time stays in the accumulator and shows up as the interpolation alpha.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame the clock will account for. Anything longer is clamped and
/// the simulation falls behind wall-clock time instead of spiralling.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Work due for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Fixed steps of [`FIXED_DT`] to simulate before drawing.
    pub steps: u32,
    /// Fraction of a step left over, in `[0.0, 1.0)`.
    pub alpha: f64,
}

/// Accumulator-based frame clock.
#[derive(Debug)]
pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    /// Creates a clock starting from the current instant.
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Starts a frame using wall-clock time since the previous one.
    pub fn tick(&mut self) -> Frame {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.advance(frame_time)
    }

    /// Starts a frame that lasted `frame_time` seconds.
    pub fn advance(&mut self, frame_time: f64) -> Frame {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            self.accumulator -= FIXED_DT;
            self.total_sim_time += FIXED_DT;
            steps += 1;
        }
        self.update_count += u64::from(steps);
        self.frame_count += 1;

        Frame {
            steps,
            alpha: self.alpha(),
        }
    }

    /// Interpolation alpha for the time left in the accumulator.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    /// Frames started so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Fixed steps handed out so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Simulated time in seconds.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dt_value() {
        assert!((FIXED_DT - 1.0 / 60.0).abs() < f64::EPSILON * 10.0);
    }

    #[test]
    fn test_single_step() {
        let mut clock = GameLoop::new();
        let frame = clock.advance(FIXED_DT);
        assert_eq!(frame.steps, 1);
        assert!(clock.accumulator.abs() < 1e-12);
    }

    #[test]
    fn test_multiple_steps() {
        let mut clock = GameLoop::new();
        let frame = clock.advance(3.0 * FIXED_DT + 1e-9);
        assert_eq!(frame.steps, 3);
        assert!((clock.total_sim_time() - 3.0 * FIXED_DT).abs() < 1e-12);
    }

    #[test]
    fn test_partial_frame_carries_over() {
        let mut clock = GameLoop::new();
        let frame = clock.advance(0.5 * FIXED_DT);
        assert_eq!(frame.steps, 0);
        assert!((frame.alpha - 0.5).abs() < 1e-10);

        let frame = clock.advance(0.6 * FIXED_DT);
        assert_eq!(frame.steps, 1);
        assert!((frame.alpha - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut clock = GameLoop::new();
        let frame = clock.advance(1.0);
        let max_steps = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(frame.steps <= max_steps);
        assert!(frame.steps > 0);
    }

    #[test]
    fn test_negative_and_zero_frame_time() {
        let mut clock = GameLoop::new();
        assert_eq!(clock.advance(0.0), Frame { steps: 0, alpha: 0.0 });
        assert_eq!(clock.advance(-1.0), Frame { steps: 0, alpha: 0.0 });
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_counters_agree_with_sim_time() {
        let mut clock = GameLoop::new();
        for ft in [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018] {
            clock.advance(ft);
        }
        let expected = clock.update_count() as f64 * FIXED_DT;
        assert!((clock.total_sim_time() - expected).abs() < 1e-10);
        assert_eq!(clock.frame_count(), 7);
    }

    #[test]
    fn test_wall_clock_tick_counts_frames() {
        let mut clock = GameLoop::default();
        clock.tick();
        clock.tick();
        assert_eq!(clock.frame_count(), 2);
    }
}
