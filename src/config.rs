use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::gaze::GazeParams;
use crate::geometry::DisplayBounds;
use crate::pattern::DEFAULT_WAKE_WORD;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_wake_word")]
    pub wake_word: String,
    #[serde(default)]
    pub gaze: GazeConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_word: default_wake_word(),
            gaze: GazeConfig::default(),
            actions: ActionsConfig::default(),
        }
    }
}

fn default_wake_word() -> String {
    DEFAULT_WAKE_WORD.into()
}

// ============================================================================
// Gaze Config
// ============================================================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GazeConfig {
    /// Debounce window between two interpolation targets
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Pointer updates per second
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Pixels the pointer may overshoot the display edges
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_display_width")]
    pub display_width: f64,
    #[serde(default = "default_display_height")]
    pub display_height: f64,
    /// Gaze trace to replay instead of a live tracker
    #[serde(default)]
    pub trace: Option<PathBuf>,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            fps: default_fps(),
            tolerance: default_tolerance(),
            display_width: default_display_width(),
            display_height: default_display_height(),
            trace: None,
        }
    }
}

fn default_window_ms() -> u64 {
    500
}

fn default_fps() -> u32 {
    50
}

fn default_tolerance() -> f64 {
    10.0
}

fn default_display_width() -> f64 {
    1920.0
}

fn default_display_height() -> f64 {
    1080.0
}

// ============================================================================
// Actions Config
// ============================================================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ActionsConfig {
    /// System double-click time; the clicks are spaced by 3/4 of it
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
    /// Log actions instead of synthesizing input
    #[serde(default)]
    pub dry_run: bool,
    /// Screen magnifier started by "al zoom"
    #[serde(default = "default_magnifier")]
    pub magnifier: Option<MagnifierConfig>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            double_click_ms: default_double_click_ms(),
            dry_run: false,
            magnifier: default_magnifier(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MagnifierConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_double_click_ms() -> u64 {
    500
}

fn default_magnifier() -> Option<MagnifierConfig> {
    #[cfg(target_os = "windows")]
    {
        Some(MagnifierConfig {
            program: "Magnify.exe".into(),
            args: vec!["/fullscreen".into()],
        })
    }
    #[cfg(not(target_os = "windows"))]
    {
        None
    }
}

impl Config {
    /// Load `path`, or `config.toml` when `None`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let config = if path.exists() {
            Self::parse(&fs::read_to_string(path)?)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wake_word.trim().is_empty() {
            return Err(Error::InvalidConfig("wake_word must not be empty".into()));
        }
        self.gaze_params().validate()?;
        let bounds_ok = |v: f64| v.is_finite() && v > 0.0;
        if !bounds_ok(self.gaze.display_width) || !bounds_ok(self.gaze.display_height) {
            return Err(Error::InvalidConfig("display size must be positive".into()));
        }
        if let Some(magnifier) = &self.actions.magnifier {
            if magnifier.program.trim().is_empty() {
                return Err(Error::InvalidConfig("magnifier program must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn gaze_params(&self) -> GazeParams {
        GazeParams {
            window_ms: self.gaze.window_ms,
            fps: self.gaze.fps,
            tolerance: self.gaze.tolerance,
        }
    }

    pub fn display_bounds(&self) -> DisplayBounds {
        DisplayBounds::new(self.gaze.display_width, self.gaze.display_height)
    }

    pub fn double_click_time(&self) -> Duration {
        Duration::from_millis(self.actions.double_click_ms)
    }

    /// Magnifier program and arguments
    pub fn magnifier(&self) -> Option<(String, Vec<String>)> {
        self.actions
            .magnifier
            .as_ref()
            .map(|m| (m.program.clone(), m.args.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.wake_word, "al");
        assert_eq!(config.gaze_params().samples_per_window(), 25);
        assert_eq!(config.double_click_time(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
wake_word = "hal"

[gaze]
window_ms = 400
fps = 60
display_width = 2560
trace = "session.trace"

[actions]
double_click_ms = 400
dry_run = true

[actions.magnifier]
program = "magnify"
args = ["--fullscreen"]
"#,
        )
        .unwrap();
        assert_eq!(config.wake_word, "hal");
        assert_eq!(config.gaze.window_ms, 400);
        assert_eq!(config.gaze.fps, 60);
        assert_eq!(config.gaze.tolerance, 10.0);
        assert_eq!(config.display_bounds(), DisplayBounds::new(2560.0, 1080.0));
        assert_eq!(config.gaze.trace, Some(PathBuf::from("session.trace")));
        assert!(config.actions.dry_run);
        assert_eq!(
            config.magnifier(),
            Some(("magnify".to_string(), vec!["--fullscreen".to_string()]))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.gaze.fps = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.gaze.window_ms = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wake_word = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_overflowing_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gaze]\nwindow_ms = 9223372036854775807").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gaze]\nfps = \"fast\"").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(Error::Config(_))
        ));
    }
}
