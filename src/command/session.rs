//! Long-running commands whose completion is signaled asynchronously
//!
//! Both hold a shared flag that something other than the dispatcher can
//! clear: the eye tracker when calibration completes, the dictation session
//! when the user toggles it off.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, info, warn};

use super::{Command, CommandKind};
use crate::actions::{Calibrator, InputSynth};
use crate::context::Context;
use crate::pattern::Pattern;

/// Recalibrates the eye tracker on "al calibration".
///
/// Running until the device reports completion; cancel/close abort it.
pub struct Calibrate {
    calibrator: Arc<dyn Calibrator>,
    running: Arc<AtomicBool>,
}

impl Calibrate {
    pub fn new(calibrator: Arc<dyn Calibrator>) -> Self {
        Self {
            calibrator,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Command for Calibrate {
    fn kind(&self) -> CommandKind {
        CommandKind::Calibrate
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::Calibrate) {
            return false;
        }
        info!("starts calibration");
        // Set before starting: a device may report completion synchronously
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let done = Box::new(move || {
            running.store(false, Ordering::SeqCst);
            info!("calibration finished");
        });
        if let Err(e) = self.calibrator.recalibrate(done) {
            warn!("calibration failed to start: {}", e);
            self.running.store(false, Ordering::SeqCst);
        }
        true
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn intercept(&mut self, context: &Context) -> bool {
        if !(context.is(Pattern::Cancel) || context.is(Pattern::Close)) || !self.is_running() {
            return false;
        }
        info!("calibration aborted");
        self.calibrator.abort();
        self.running.store(false, Ordering::SeqCst);
        true
    }
}

/// Dictation state shared between the dictation command and the voice listener
pub struct DictationSession {
    synth: Arc<dyn InputSynth>,
    active: AtomicBool,
    fragments: AtomicUsize,
}

impl DictationSession {
    pub fn new(synth: Arc<dyn InputSynth>) -> Arc<Self> {
        Arc::new(Self {
            synth,
            active: AtomicBool::new(false),
            fragments: AtomicUsize::new(0),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        self.fragments.store(0, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Type a recognized free-text fragment if the session is open.
    ///
    /// Returns true when the text was typed. Fragments after the first get
    /// a separating space.
    pub fn dictate(&self, text: &str) -> bool {
        let text = text.trim();
        if !self.is_active() || text.is_empty() {
            return false;
        }
        let typed = if self.fragments.fetch_add(1, Ordering::SeqCst) == 0 {
            text.to_string()
        } else {
            format!(" {}", text)
        };
        debug!(text = %typed, "dictated");
        if let Err(e) = self.synth.type_text(&typed) {
            warn!("dictation typing failed: {}", e);
            return false;
        }
        true
    }
}

/// Opens a dictation session on "al texte".
///
/// The same pattern, "annuler" or "fermer" close it again.
pub struct Dictation {
    session: Arc<DictationSession>,
}

impl Dictation {
    pub fn new(session: Arc<DictationSession>) -> Self {
        Self { session }
    }
}

impl Command for Dictation {
    fn kind(&self) -> CommandKind {
        CommandKind::Dictation
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::Dictation) {
            return false;
        }
        info!("dictation started");
        self.session.open();
        true
    }

    fn is_running(&self) -> bool {
        self.session.is_active()
    }

    fn intercept(&mut self, context: &Context) -> bool {
        let closes = context.is(Pattern::Dictation)
            || context.is(Pattern::Cancel)
            || context.is(Pattern::Close);
        if !closes || !self.session.is_active() {
            return false;
        }
        self.session.close();
        info!("dictation ended");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{CalibrationDone, RecordedAction, RecordingSynth};
    use crate::error::Result;
    use crate::geometry::Point;
    use parking_lot::Mutex;

    /// Holds the completion callback until the test fires it
    #[derive(Default)]
    struct ManualCalibrator {
        pending: Mutex<Option<CalibrationDone>>,
        aborted: AtomicBool,
    }

    impl ManualCalibrator {
        fn finish(&self) {
            if let Some(done) = self.pending.lock().take() {
                done();
            }
        }
    }

    impl Calibrator for ManualCalibrator {
        fn recalibrate(&self, done: CalibrationDone) -> Result<()> {
            *self.pending.lock() = Some(done);
            Ok(())
        }

        fn abort(&self) {
            self.aborted.store(true, Ordering::SeqCst);
        }
    }

    fn ctx(pattern: Option<Pattern>) -> Context {
        Context::with_pattern(Point::default(), pattern)
    }

    #[test]
    fn test_calibrate_runs_until_device_reports() {
        let device = Arc::new(ManualCalibrator::default());
        let mut cmd = Calibrate::new(device.clone());

        assert!(!cmd.execute(&ctx(Some(Pattern::LeftClick))));
        assert!(cmd.execute(&ctx(Some(Pattern::Calibrate))));
        assert!(cmd.is_running());
        assert!(!cmd.terminate(&ctx(None)));

        device.finish();
        assert!(!cmd.is_running());
        assert!(cmd.terminate(&ctx(None)));
    }

    #[test]
    fn test_calibrate_intercepts_cancel() {
        let device = Arc::new(ManualCalibrator::default());
        let mut cmd = Calibrate::new(device.clone());
        cmd.execute(&ctx(Some(Pattern::Calibrate)));

        assert!(!cmd.intercept(&ctx(Some(Pattern::LeftClick))));
        assert!(cmd.intercept(&ctx(Some(Pattern::Cancel))));
        assert!(device.aborted.load(Ordering::SeqCst));
        assert!(!cmd.is_running());
    }

    #[test]
    fn test_finished_calibration_does_not_intercept() {
        let device = Arc::new(ManualCalibrator::default());
        let mut cmd = Calibrate::new(device.clone());
        cmd.execute(&ctx(Some(Pattern::Calibrate)));

        device.finish();
        assert!(!cmd.intercept(&ctx(Some(Pattern::Close))));
        assert!(!device.aborted.load(Ordering::SeqCst));
    }

    #[test]
    fn test_dictation_types_only_while_open() {
        let synth = Arc::new(RecordingSynth::new());
        let session = DictationSession::new(synth.clone());
        let mut cmd = Dictation::new(Arc::clone(&session));

        assert!(!session.dictate("ignored"));
        assert!(cmd.execute(&ctx(Some(Pattern::Dictation))));
        assert!(cmd.is_running());

        assert!(session.dictate("bonjour"));
        assert!(session.dictate(" le monde "));
        assert!(!session.dictate("   "));

        assert!(cmd.intercept(&ctx(Some(Pattern::Dictation))));
        assert!(!cmd.is_running());
        assert!(!session.dictate("after"));

        assert_eq!(
            synth.actions(),
            vec![
                RecordedAction::Text("bonjour".into()),
                RecordedAction::Text(" le monde".into())
            ]
        );
    }

    #[test]
    fn test_dictation_ignores_unrelated_patterns() {
        let synth = Arc::new(RecordingSynth::new());
        let session = DictationSession::new(synth);
        let mut cmd = Dictation::new(session);
        cmd.execute(&ctx(Some(Pattern::Dictation)));
        assert!(!cmd.intercept(&ctx(Some(Pattern::LeftClick))));
        assert!(!cmd.intercept(&ctx(None)));
        assert!(cmd.is_running());
    }
}
