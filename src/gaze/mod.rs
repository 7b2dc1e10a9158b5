//! Gaze interpolation - turns sparse raw fixations into a smooth pointer path
//!
//! The eye tracker reports fixations at its native rate (~60 Hz), noisy and
//! irregular. Only one fixation per sampling window is kept as the next
//! target; the straight path from the current position to that target is
//! resampled into `samples_per_window` points, which a fixed-rate ticker
//! then plays back one by one.
//!
//! ```text
//! fixation ──► Interpolator::on_fixation ──► queue ──► ticker ──► InputEvent::Gaze
//!              (debounce, lerp, clamp)                (period = window / samples)
//! ```

mod pipeline;
mod source;

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use crate::error::{Error, Result};
use crate::geometry::{DisplayBounds, Point};

pub use pipeline::GazePipeline;
pub use source::{ChannelGazeSource, GazeSignal, RawGazeSource, ReplayGazeSource};

/// One raw fixation from the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub timestamp_ms: f64,
    pub position: Point,
}

impl GazeSample {
    pub fn new(timestamp_ms: f64, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            position: Point::new(x, y),
        }
    }
}

/// Interpolation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeParams {
    /// Sampling / debounce window
    pub window_ms: u64,
    /// Playback rate of interpolated positions
    pub fps: u32,
    /// Allowed overshoot beyond the display edges
    pub tolerance: f64,
}

impl Default for GazeParams {
    fn default() -> Self {
        Self {
            window_ms: 500,
            fps: 50,
            tolerance: 10.0,
        }
    }
}

impl GazeParams {
    /// Reject parameters that would not produce at least one sample per window.
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(Error::InvalidConfig("gaze window must be positive".into()));
        }
        if self.fps == 0 {
            return Err(Error::InvalidConfig("gaze fps must be positive".into()));
        }
        let samples = self
            .window_ms
            .checked_mul(u64::from(self.fps))
            .map(|product| product / 1000)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "a {}ms window at {} fps is out of range",
                    self.window_ms, self.fps
                ))
            })?;
        if samples == 0 {
            return Err(Error::InvalidConfig(format!(
                "a {}ms window at {} fps yields no samples",
                self.window_ms, self.fps
            )));
        }
        if u32::try_from(samples).is_err() {
            return Err(Error::InvalidConfig(format!(
                "a {}ms window at {} fps yields too many samples",
                self.window_ms, self.fps
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig("gaze tolerance must be >= 0".into()));
        }
        Ok(())
    }

    /// Number of interpolated points per window
    pub fn samples_per_window(&self) -> usize {
        (self.window_ms.saturating_mul(u64::from(self.fps)) / 1000) as usize
    }

    /// Period of the playback ticker
    pub fn tick_period(&self) -> Duration {
        let samples = u32::try_from(self.samples_per_window().max(1)).unwrap_or(u32::MAX);
        Duration::from_millis(self.window_ms) / samples
    }
}

/// What happened to a fixation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixation {
    /// New target accepted; this many points were queued
    Accepted(usize),
    /// Within the window of the last accepted fixation
    Debounced,
    /// Non-finite values or a timestamp older than the last accepted one
    Dropped,
}

/// Interpolation state: last target timestamp, last played position, queue.
#[derive(Debug)]
pub struct Interpolator {
    params: GazeParams,
    bounds: DisplayBounds,
    last_timestamp_ms: f64,
    last_position: Point,
    queue: VecDeque<Point>,
}

impl Interpolator {
    pub fn new(params: GazeParams, bounds: DisplayBounds, start: Point) -> Self {
        Self {
            params,
            bounds,
            last_timestamp_ms: 0.0,
            last_position: start,
            queue: VecDeque::with_capacity(params.samples_per_window()),
        }
    }

    pub fn params(&self) -> &GazeParams {
        &self.params
    }

    pub fn set_bounds(&mut self, bounds: DisplayBounds) {
        self.bounds = bounds;
    }

    /// Position the next path will start from
    pub fn last_position(&self) -> Point {
        self.last_position
    }

    /// Interpolated points not yet played
    pub fn pending(&self) -> impl Iterator<Item = &Point> {
        self.queue.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Feed one raw fixation.
    ///
    /// A fixation more than one window after the last accepted one replaces
    /// the queue with the path from the current position to it.
    pub fn on_fixation(&mut self, sample: GazeSample) -> Fixation {
        if !sample.timestamp_ms.is_finite() || !sample.position.is_finite() {
            return Fixation::Dropped;
        }
        let elapsed = sample.timestamp_ms - self.last_timestamp_ms;
        if elapsed < 0.0 {
            return Fixation::Dropped;
        }
        if elapsed <= self.params.window_ms as f64 {
            return Fixation::Debounced;
        }

        self.last_timestamp_ms = sample.timestamp_ms;
        self.queue.clear();

        let start = self.last_position;
        let end = sample.position;
        let samples = self.params.samples_per_window();
        for i in 1..=samples {
            let point = start.lerp(end, i, samples);
            self.queue
                .push_back(self.bounds.clamp(point, self.params.tolerance));
        }
        trace!(from = %start, to = %end, samples, "interpolated");
        Fixation::Accepted(samples)
    }

    /// Next point to play, if any. Becomes the start of the next path.
    pub fn next_point(&mut self) -> Option<Point> {
        let point = self.queue.pop_front()?;
        self.last_position = point;
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpolator() -> Interpolator {
        Interpolator::new(
            GazeParams::default(),
            DisplayBounds::new(1000.0, 800.0),
            Point::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_samples_per_window() {
        let params = GazeParams {
            window_ms: 500,
            fps: 50,
            tolerance: 10.0,
        };
        assert_eq!(params.samples_per_window(), 25);
        assert_eq!(params.tick_period(), Duration::from_millis(20));
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let params = GazeParams {
            window_ms: 10,
            fps: 50,
            tolerance: 10.0,
        };
        assert!(params.validate().is_err());
        assert!(GazeParams { fps: 0, ..GazeParams::default() }.validate().is_err());
        assert!(GazeParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_window() {
        let params = GazeParams {
            window_ms: u64::MAX,
            fps: 50,
            tolerance: 10.0,
        };
        assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));

        let params = GazeParams {
            window_ms: 1 << 40,
            fps: u32::MAX,
            tolerance: 10.0,
        };
        assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_first_fixation_at_zero_is_debounced() {
        let mut interp = interpolator();
        assert_eq!(
            interp.on_fixation(GazeSample::new(0.0, 0.0, 0.0)),
            Fixation::Debounced
        );
        assert_eq!(interp.pending_len(), 0);
    }

    #[test]
    fn test_vertical_path() {
        let mut interp = interpolator();
        assert_eq!(
            interp.on_fixation(GazeSample::new(600.0, 0.0, 250.0)),
            Fixation::Accepted(25)
        );
        let points: Vec<Point> = interp.pending().copied().collect();
        assert!(points.iter().all(|p| p.x == 0.0));
        assert_eq!(points[0].y, 10.0);
        assert_eq!(points[24].y, 250.0);
    }

    #[test]
    fn test_within_window_leaves_queue_unchanged() {
        let mut interp = interpolator();
        interp.on_fixation(GazeSample::new(600.0, 100.0, 100.0));
        let before: Vec<Point> = interp.pending().copied().collect();

        assert_eq!(
            interp.on_fixation(GazeSample::new(1100.0, 900.0, 10.0)),
            Fixation::Debounced
        );
        let after: Vec<Point> = interp.pending().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_degenerate_samples_are_dropped() {
        let mut interp = interpolator();
        interp.on_fixation(GazeSample::new(2000.0, 100.0, 100.0));
        assert_eq!(
            interp.on_fixation(GazeSample::new(1000.0, 5.0, 5.0)),
            Fixation::Dropped
        );
        assert_eq!(
            interp.on_fixation(GazeSample::new(f64::NAN, 5.0, 5.0)),
            Fixation::Dropped
        );
        assert_eq!(
            interp.on_fixation(GazeSample::new(9000.0, f64::INFINITY, 5.0)),
            Fixation::Dropped
        );
        assert_eq!(interp.pending_len(), 25);
    }

    #[test]
    fn test_next_path_starts_from_played_position() {
        let mut interp = interpolator();
        interp.on_fixation(GazeSample::new(600.0, 250.0, 0.0));
        for _ in 0..5 {
            interp.next_point();
        }
        assert_eq!(interp.last_position(), Point::new(50.0, 0.0));

        // A new target replaces the rest of the old path
        interp.on_fixation(GazeSample::new(1200.0, 50.0, 250.0));
        assert_eq!(interp.pending_len(), 25);
        assert_eq!(interp.pending().next(), Some(&Point::new(50.0, 10.0)));
    }

    #[test]
    fn test_offscreen_target_is_clamped() {
        let mut interp = interpolator();
        interp.on_fixation(GazeSample::new(600.0, -500.0, 2000.0));
        for p in interp.pending() {
            assert!(p.x >= -10.0 && p.x <= 1010.0);
            assert!(p.y >= -10.0 && p.y <= 810.0);
        }
        assert_eq!(interp.pending().last(), Some(&Point::new(-10.0, 810.0)));
    }

    #[test]
    fn test_next_point_on_empty_queue() {
        let mut interp = interpolator();
        assert_eq!(interp.next_point(), None);
        assert_eq!(interp.last_position(), Point::new(0.0, 0.0));
    }
}
