//! Magnifier command

use std::sync::Arc;

use tracing::{info, warn};

use super::{Command, CommandKind};
use crate::actions::{Launched, Launcher};
use crate::context::Context;
use crate::pattern::Pattern;

/// Full-screen magnifier on "al zoom", running while the magnifier process lives.
pub struct Zoom {
    launcher: Arc<dyn Launcher>,
    magnifier: Option<(String, Vec<String>)>,
    process: Option<Box<dyn Launched>>,
}

impl Zoom {
    /// `magnifier` is the program and arguments to launch, `None` if the platform has none
    pub fn new(launcher: Arc<dyn Launcher>, magnifier: Option<(String, Vec<String>)>) -> Self {
        Self {
            launcher,
            magnifier,
            process: None,
        }
    }
}

impl Command for Zoom {
    fn kind(&self) -> CommandKind {
        CommandKind::Zoom
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::ZoomIn) {
            return false;
        }
        let Some((program, args)) = &self.magnifier else {
            warn!("zoom requested but no magnifier is configured");
            return true;
        };
        match self.launcher.launch(program, args) {
            Ok(process) => {
                info!(program = %program, "magnifier started");
                self.process = Some(process);
            }
            Err(e) => warn!("magnifier failed to start: {}", e),
        }
        true
    }

    fn terminate(&mut self, _context: &Context) -> bool {
        if let Some(process) = self.process.as_mut() {
            if process.has_exited() {
                info!("magnifier closed");
                self.process = None;
            }
        }
        self.process.is_none()
    }

    fn is_running(&self) -> bool {
        self.process.is_some()
    }

    fn intercept(&mut self, context: &Context) -> bool {
        let closes = context.is(Pattern::ZoomIn)
            || context.is(Pattern::Cancel)
            || context.is(Pattern::Close);
        if !closes {
            return false;
        }
        let Some(mut process) = self.process.take() else {
            return false;
        };
        if process.has_exited() {
            info!("magnifier closed");
            return false;
        }
        process.stop();
        info!("magnifier stopped");
        true
    }
}
