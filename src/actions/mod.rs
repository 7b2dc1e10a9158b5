//! Side-effect capabilities used by the commands
//!
//! The engine never talks to the OS directly. Commands hold one of these
//! capabilities and ask it to warp the pointer, click, press a chord,
//! type text, launch a helper program or recalibrate the tracker.
//!
//! - [`InputSynth`]: synthetic mouse and keyboard input
//! - [`Launcher`]: helper processes (the screen magnifier)
//! - [`Calibrator`]: eye tracker recalibration, provided by the gaze source

mod launcher;
mod log;
mod recording;
#[cfg(feature = "synth")]
mod synth;

use crate::error::Result;
use crate::geometry::Point;

pub use launcher::SystemLauncher;
pub use log::LogSynth;
pub use recording::{RecordedAction, RecordingLauncher, RecordingSynth};
#[cfg(feature = "synth")]
pub use synth::EnigoSynth;

/// Mouse buttons the commands can press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
}

/// Keys used in the chords the commands send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Control,
    Alt,
    Meta,
    F4,
    Char(char),
}

impl Key {
    /// Platform's primary shortcut modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn primary_modifier() -> Key {
        #[cfg(target_os = "macos")]
        {
            Key::Meta
        }
        #[cfg(not(target_os = "macos"))]
        {
            Key::Control
        }
    }
}

/// Synthetic input delivered to the focused application.
///
/// Implementations may queue the work and return before it happens.
pub trait InputSynth: Send + Sync {
    /// Warp the pointer to an absolute screen position
    fn move_pointer(&self, to: Point) -> Result<()>;

    /// Single click at `at`
    fn click(&self, at: Point, button: Button) -> Result<()>;

    /// Press `modifiers`, click `key`, release the modifiers in reverse order
    fn key_combo(&self, modifiers: &[Key], key: Key) -> Result<()>;

    /// Type free text
    fn type_text(&self, text: &str) -> Result<()>;

    /// Current pointer position, when the backend can tell
    fn pointer_position(&self) -> Option<Point> {
        None
    }
}

/// A helper process started by a command
pub trait Launched: Send {
    /// True once the process is gone
    fn has_exited(&mut self) -> bool;

    /// Ask the process to stop
    fn stop(&mut self);
}

/// Starts helper programs
pub trait Launcher: Send + Sync {
    fn launch(&self, program: &str, args: &[String]) -> Result<Box<dyn Launched>>;
}

/// Callback fired once the tracker finished calibrating
pub type CalibrationDone = Box<dyn FnOnce() + Send>;

/// Eye tracker calibration, owned by the gaze device
pub trait Calibrator: Send + Sync {
    /// Start recalibration; `done` fires when the device reports completion.
    fn recalibrate(&self, done: CalibrationDone) -> Result<()>;

    /// Abort a calibration in progress
    fn abort(&self) {}
}

/// Calibrator for devices that need none: completes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantCalibrator;

impl Calibrator for InstantCalibrator {
    fn recalibrate(&self, done: CalibrationDone) -> Result<()> {
        tracing::info!("calibration not supported by this gaze source, skipping");
        done();
        Ok(())
    }
}
