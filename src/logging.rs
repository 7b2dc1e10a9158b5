//! Logging setup and CLI flags
//!
//! Filter precedence: `--log-filter`, then `--trace`/`--debug`/`--log-level`
//! (scoped to this crate), then `RUST_LOG`, then crate-scoped `info`.

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Tracing target of this crate
const OUR_CRATE: &str = "gazevox";

/// Logging controls for the CLI.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set log level to trace (this crate only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set log level to debug (this crate only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single log level for this crate (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "gazevox::gaze=trace,gazevox=info"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec these flags select
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
            env::var("RUST_LOG").ok().as_deref(),
        )
    }
}

/// Filter directive setting `level` for this crate.
pub fn level_spec_for(level: &str) -> String {
    format!("{}={}", OUR_CRATE, level.to_ascii_lowercase())
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `rust_log` (the `RUST_LOG` env value)
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => level_spec_for("info"),
    }
}

/// Install the global subscriber. Logs go to stderr so stdin/stdout stay free.
pub fn init(args: &LogArgs) {
    let filter = EnvFilter::new(args.spec());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
