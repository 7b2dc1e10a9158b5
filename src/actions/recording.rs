//! In-memory capabilities that record what the commands asked for.
//!
//! Used by the test-suite and by embedders that want to observe the
//! engine without touching the OS.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{Button, InputSynth, Key, Launched, Launcher};
use crate::error::Result;
use crate::geometry::Point;

/// One recorded side effect
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedAction {
    Move(Point),
    Click(Point, Button),
    Combo(Vec<Key>, Key),
    Text(String),
}

/// Input backend that stores every action
#[derive(Debug, Default)]
pub struct RecordingSynth {
    actions: Mutex<Vec<RecordedAction>>,
    position: Option<Point>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder reporting `position` as the initial pointer position
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// All actions so far
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.actions.lock().clone()
    }

    /// Actions other than pointer moves
    pub fn non_moves(&self) -> Vec<RecordedAction> {
        self.actions
            .lock()
            .iter()
            .filter(|a| !matches!(a, RecordedAction::Move(_)))
            .cloned()
            .collect()
    }

    fn push(&self, action: RecordedAction) {
        self.actions.lock().push(action);
    }
}

impl InputSynth for RecordingSynth {
    fn move_pointer(&self, to: Point) -> Result<()> {
        self.push(RecordedAction::Move(to));
        Ok(())
    }

    fn click(&self, at: Point, button: Button) -> Result<()> {
        self.push(RecordedAction::Click(at, button));
        Ok(())
    }

    fn key_combo(&self, modifiers: &[Key], key: Key) -> Result<()> {
        self.push(RecordedAction::Combo(modifiers.to_vec(), key));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.push(RecordedAction::Text(text.to_string()));
        Ok(())
    }

    fn pointer_position(&self) -> Option<Point> {
        self.position
    }
}

struct RecordedProcess {
    exited: Arc<AtomicBool>,
}

impl Launched for RecordedProcess {
    fn has_exited(&mut self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.exited.store(true, Ordering::SeqCst);
    }
}

/// Launcher that pretends to start programs; tests decide when they exit.
#[derive(Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<(String, Arc<AtomicBool>)>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs launched so far
    pub fn programs(&self) -> Vec<String> {
        self.launched.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Number of launched processes still alive
    pub fn alive(&self) -> usize {
        self.launched
            .lock()
            .iter()
            .filter(|(_, exited)| !exited.load(Ordering::SeqCst))
            .count()
    }

    /// Make every launched process exit on its own
    pub fn exit_all(&self) {
        for (_, exited) in self.launched.lock().iter() {
            exited.store(true, Ordering::SeqCst);
        }
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, program: &str, _args: &[String]) -> Result<Box<dyn Launched>> {
        let exited = Arc::new(AtomicBool::new(false));
        self.launched
            .lock()
            .push((program.to_string(), Arc::clone(&exited)));
        Ok(Box::new(RecordedProcess { exited }))
    }
}
