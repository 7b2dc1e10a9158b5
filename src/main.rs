use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use gazevox::actions::{InputSynth, LogSynth, SystemLauncher};
use gazevox::gaze::ReplayGazeSource;
use gazevox::logging::{self, LogArgs};
use gazevox::voice::{LineSpeechSource, RawSpeechSource};
use gazevox::{Actions, Config, Engine, Error, Inputs, Pattern};

#[derive(Parser)]
#[command(name = "gazevox", about = "Drive the pointer with your eyes and your voice")]
struct Cli {
    /// Config file (defaults to ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a recorded gaze trace instead of a live tracker
    #[arg(long)]
    gaze_trace: Option<PathBuf>,

    /// Read utterances from a file instead of stdin
    #[arg(long)]
    speech_script: Option<PathBuf>,

    /// Log actions instead of synthesizing input
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the voice pattern catalog
    Patterns,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let config = Config::load(cli.config.as_deref()).context("loading config")?;

    if matches!(cli.command, Some(Command::Patterns)) {
        print_patterns(&config.wake_word);
        return Ok(());
    }

    let trace = cli
        .gaze_trace
        .or_else(|| config.gaze.trace.clone())
        .ok_or_else(|| Error::GazeUnavailable("no tracker found and no gaze trace given".into()))?;
    let gaze = ReplayGazeSource::open(&trace)?;
    let speech: Box<dyn RawSpeechSource> = match &cli.speech_script {
        Some(path) => Box::new(LineSpeechSource::open(path, &config.wake_word)?),
        None => Box::new(LineSpeechSource::stdin(&config.wake_word)),
    };

    let actions = Actions {
        synth: build_synth(cli.dry_run || config.actions.dry_run)?,
        launcher: Arc::new(SystemLauncher),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let guard = runtime.enter();

    let handle = Engine::start(
        &config,
        Inputs {
            gaze: Box::new(gaze),
            speech,
        },
        actions,
    )?;

    let completion = handle.completion();
    ctrlc::set_handler(move || {
        if completion.set() {
            info!("interrupted");
        }
    })?;

    eprintln!(
        "Listening. Say \"top\" to click, \"{} terminer\" to quit.",
        config.wake_word
    );
    handle.wait();
    handle.shutdown();
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(500));
    Ok(())
}

fn build_synth(dry_run: bool) -> Result<Arc<dyn InputSynth>> {
    if dry_run {
        return Ok(Arc::new(LogSynth));
    }
    #[cfg(feature = "synth")]
    {
        let synth = gazevox::actions::EnigoSynth::new().context("starting input synthesis")?;
        Ok(Arc::new(synth))
    }
    #[cfg(not(feature = "synth"))]
    {
        tracing::warn!("built without input synthesis, actions are only logged");
        Ok(Arc::new(LogSynth))
    }
}

fn print_patterns(wake_word: &str) {
    println!("{:<12} {:<10} {}", "TOKEN", "GRAMMAR", "SAY");
    for pattern in Pattern::ALL {
        let (grammar, say) = if pattern.requires_prefix() {
            ("prefixed", format!("{} {}", wake_word, pattern.token()))
        } else {
            ("direct", pattern.token().to_string())
        };
        println!("{:<12} {:<10} {}", pattern.token(), grammar, say);
    }
}
