//! Gaze + voice input fusion
//!
//! Merges an eye-tracker stream (pointer position) and a voice-command
//! stream (clicks, shortcuts, dictation, zoom) into one execution context,
//! and runs a set of mutually exclusive, possibly long-lived commands
//! against it.

pub mod actions;
pub mod command;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod gaze;
pub mod geometry;
pub mod logging;
pub mod pattern;
pub mod signal;
pub mod voice;

pub use config::Config;
pub use context::Context;
pub use engine::{Actions, Dispatcher, Engine, EngineHandle, InputEvent, Inputs};
pub use error::{Error, Result};
pub use geometry::{DisplayBounds, Point};
pub use pattern::Pattern;
pub use signal::CompletionSignal;
