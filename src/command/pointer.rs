//! Pointer commands: follow the gaze, click, double click

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::{Command, CommandKind};
use crate::actions::{Button, InputSynth};
use crate::context::Context;
use crate::pattern::Pattern;

/// Share of the system double-click time left between the two clicks (3/4).
const DOUBLE_CLICK_NUM: u32 = 3;
const DOUBLE_CLICK_DEN: u32 = 4;

/// Moves the pointer to the last known position on every event
pub struct PointerMove {
    synth: Arc<dyn InputSynth>,
}

impl PointerMove {
    pub fn new(synth: Arc<dyn InputSynth>) -> Self {
        Self { synth }
    }
}

impl Command for PointerMove {
    fn kind(&self) -> CommandKind {
        CommandKind::PointerMove
    }

    fn execute(&mut self, context: &Context) -> bool {
        if let Err(e) = self.synth.move_pointer(context.position()) {
            warn!("pointer move failed: {}", e);
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// Left click at the pointer position on "top"
pub struct LeftClick {
    synth: Arc<dyn InputSynth>,
}

impl LeftClick {
    pub fn new(synth: Arc<dyn InputSynth>) -> Self {
        Self { synth }
    }
}

impl Command for LeftClick {
    fn kind(&self) -> CommandKind {
        CommandKind::LeftClick
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::LeftClick) {
            return false;
        }
        let at = context.position();
        info!(%at, "click");
        if let Err(e) = self.synth.click(at, Button::Left) {
            warn!("click failed: {}", e);
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// Two left clicks on "tiptop", spaced below the system double-click time.
///
/// Blocks the dispatch cycle for the interval between the clicks.
pub struct LeftDoubleClick {
    synth: Arc<dyn InputSynth>,
    interval: Duration,
}

impl LeftDoubleClick {
    /// `double_click_time` is the system's double-click threshold
    pub fn new(synth: Arc<dyn InputSynth>, double_click_time: Duration) -> Self {
        Self {
            synth,
            interval: double_click_time * DOUBLE_CLICK_NUM / DOUBLE_CLICK_DEN,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Command for LeftDoubleClick {
    fn kind(&self) -> CommandKind {
        CommandKind::LeftDoubleClick
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::LeftDoubleClick) {
            return false;
        }
        let at = context.position();
        info!(%at, "double click");
        let clicked = self
            .synth
            .click(at, Button::Left)
            .and_then(|_| {
                thread::sleep(self.interval);
                self.synth.click(at, Button::Left)
            });
        if let Err(e) = clicked {
            warn!("double click failed: {}", e);
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}
