//! Raw gaze sources: the eye tracker boundary
//!
//! A source yields fixations at its native rate, plus display changes.
//! The replay source plays a recorded trace file; the channel source is fed
//! by the embedding application (or a test).

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use tracing::{debug, warn};

use super::GazeSample;
use crate::actions::{Calibrator, InstantCalibrator};
use crate::error::{Error, Result};
use crate::geometry::DisplayBounds;

/// What a gaze source reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GazeSignal {
    Fixation(GazeSample),
    /// The tracked display changed size
    Bounds(DisplayBounds),
}

/// Eye tracker driver.
///
/// `next_signal` blocks until the next signal; `None` means the device is gone.
pub trait RawGazeSource: Send {
    fn next_signal(&mut self) -> Option<GazeSignal>;

    /// Recalibration entry point of the device
    fn calibrator(&self) -> Arc<dyn Calibrator> {
        Arc::new(InstantCalibrator)
    }
}

/// Replays a gaze trace file.
///
/// One signal per line:
///
/// ```text
/// # comment
/// bounds 1920 1080
/// 0 960 540
/// 620.5 100 80
/// ```
///
/// Fixation lines are `timestamp_ms x y`. Unless pacing is disabled, each
/// fixation is released when its timestamp is reached, relative to the first
/// call to `next_signal`.
pub struct ReplayGazeSource {
    signals: std::vec::IntoIter<GazeSignal>,
    paced: bool,
    started: Option<Instant>,
}

impl ReplayGazeSource {
    /// Open a trace file. A missing or unreadable file means no device.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::GazeUnavailable(format!("{}: {}", path.display(), e)))?;
        let source = Self::parse(&text);
        debug!(path = %path.display(), signals = source.signals.len(), "gaze trace loaded");
        Ok(source)
    }

    /// Parse a trace. Malformed lines are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut signals = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(line) {
                Some(signal) => signals.push(signal),
                None => warn!(line = number + 1, "skipping malformed gaze trace line: {}", line),
            }
        }
        Self {
            signals: signals.into_iter(),
            paced: true,
            started: None,
        }
    }

    /// Release signals as fast as they are read
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }
}

fn parse_line(line: &str) -> Option<GazeSignal> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        ["bounds", w, h] => {
            let width: f64 = w.parse().ok()?;
            let height: f64 = h.parse().ok()?;
            (width > 0.0 && height > 0.0)
                .then(|| GazeSignal::Bounds(DisplayBounds::new(width, height)))
        }
        [t, x, y] => {
            let sample = GazeSample::new(t.parse().ok()?, x.parse().ok()?, y.parse().ok()?);
            // Timestamps too far out to schedule are unusable
            if sample.timestamp_ms > 0.0 && replay_offset(sample.timestamp_ms).is_none() {
                return None;
            }
            Some(GazeSignal::Fixation(sample))
        }
        _ => None,
    }
}

/// Delay of a fixation from the start of the replay
fn replay_offset(timestamp_ms: f64) -> Option<Duration> {
    if timestamp_ms.is_nan() || timestamp_ms <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(timestamp_ms / 1000.0).ok()
}

impl RawGazeSource for ReplayGazeSource {
    fn next_signal(&mut self) -> Option<GazeSignal> {
        let signal = self.signals.next()?;
        if !self.paced {
            return Some(signal);
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        if let GazeSignal::Fixation(sample) = signal {
            let due = replay_offset(sample.timestamp_ms)
                .and_then(|offset| started.checked_add(offset));
            if let Some(due) = due {
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
            }
        }
        Some(signal)
    }
}

/// Gaze source fed through a channel
pub struct ChannelGazeSource {
    rx: Receiver<GazeSignal>,
    calibrator: Arc<dyn Calibrator>,
}

impl ChannelGazeSource {
    /// Source plus the sender that feeds it. Dropping every sender ends the source.
    pub fn new() -> (Self, Sender<GazeSignal>) {
        let (tx, rx) = flume::unbounded();
        (
            Self {
                rx,
                calibrator: Arc::new(InstantCalibrator),
            },
            tx,
        )
    }

    pub fn with_calibrator(mut self, calibrator: Arc<dyn Calibrator>) -> Self {
        self.calibrator = calibrator;
        self
    }
}

impl RawGazeSource for ChannelGazeSource {
    fn next_signal(&mut self) -> Option<GazeSignal> {
        self.rx.recv().ok()
    }

    fn calibrator(&self) -> Arc<dyn Calibrator> {
        Arc::clone(&self.calibrator)
    }
}
