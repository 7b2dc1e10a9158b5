//! Commands - the actions the dispatcher fans every input event out to
//!
//! A command decides by itself whether the current [`Context`] concerns it.
//! Most commands finish inside [`Command::execute`]. Long-running ones
//! (calibration, dictation, zoom) report [`Command::is_running`] until their
//! own completion condition holds; the dispatcher only observes that flag.

mod control;
mod pointer;
mod session;
mod zoom;

use std::fmt;

use crate::context::Context;

pub use control::{Cancel, Close, Quit};
pub use pointer::{LeftClick, LeftDoubleClick, PointerMove};
pub use session::{Calibrate, Dictation, DictationSession};
pub use zoom::Zoom;

/// Identity of a command; at most one running command per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    PointerMove,
    LeftClick,
    LeftDoubleClick,
    Calibrate,
    Dictation,
    Cancel,
    Close,
    Zoom,
    Quit,
    /// Commands registered by embedders
    Custom(&'static str),
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Custom(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Uniform contract every action implements to take part in dispatch.
pub trait Command: Send {
    fn kind(&self) -> CommandKind;

    /// Try to act on `context`.
    ///
    /// Returns true when the command matched and handled the event, false
    /// when the event does not concern it.
    fn execute(&mut self, context: &Context) -> bool;

    /// Called on running commands before the execution pass.
    ///
    /// Returns true once the command is finished and can leave the running
    /// set. Default: finished once the command cleared its own running flag.
    fn terminate(&mut self, _context: &Context) -> bool {
        !self.is_running()
    }

    /// True while a long-running command is in progress
    fn is_running(&self) -> bool;

    /// Context-sensitive cancel for running commands.
    ///
    /// Called during the termination pass, before [`Command::terminate`],
    /// only while [`Command::is_running`] holds. A command returning true has
    /// consumed the current pattern: no other command sees it in this cycle's
    /// execution pass.
    fn intercept(&mut self, _context: &Context) -> bool {
        false
    }
}
