use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::command::CommandKind;

/// Convenient result type for the crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the engine and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// The eye tracker (or its replay trace) could not be opened. Fatal.
    #[error("Gaze source unavailable: {0}")]
    GazeUnavailable(String),

    /// The speech recognizer could not be started.
    #[error("Speech source unavailable: {0}")]
    SpeechUnavailable(String),

    /// The configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The synthetic input backend failed.
    #[error("Synthetic input error: {0}")]
    Synth(String),

    /// A helper process could not be started.
    #[error("Launch error: {0}")]
    Launch(String),

    /// A second command of an already registered kind.
    #[error("Command {0} is already registered")]
    DuplicateCommand(CommandKind),

    /// No async runtime to host the background tasks.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O failure while reading a file or talking to a process.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
