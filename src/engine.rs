//! Command dispatch engine
//!
//! Every input event runs one dispatch cycle over the [`Context`]:
//!
//! 1. **Termination pass** over a snapshot of the running set. Each running
//!    command still in progress may first intercept the current pattern,
//!    then every entry is asked to terminate; survivors are swapped in as
//!    the new running set.
//! 2. **Execution pass** over every registered command, in registration
//!    order. Commands already running are skipped; a command that handled
//!    the event and is now running joins the running set.
//!
//! The [`Dispatcher`] is owned by a single dispatch thread draining one
//! event channel, so cycles never overlap.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender};
use tokio::runtime::Handle;
use tracing::{debug, error, info, trace};

use crate::actions::{InputSynth, Launcher};
use crate::command::{
    Calibrate, Cancel, Close, Command, CommandKind, Dictation, DictationSession, LeftClick,
    LeftDoubleClick, PointerMove, Quit, Zoom,
};
use crate::config::Config;
use crate::context::{Context, RunningSet};
use crate::error::{Error, Result};
use crate::gaze::{GazePipeline, Interpolator, RawGazeSource};
use crate::geometry::Point;
use crate::pattern::Pattern;
use crate::signal::CompletionSignal;
use crate::voice::{RawSpeechSource, VoiceListener, VoiceMatcher};

/// How often the dispatch thread checks the completion signal while idle
const DISPATCH_POLL: Duration = Duration::from_millis(50);

/// Event fed to the dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// New interpolated pointer position
    Gaze(Point),
    /// Recognized voice pattern
    Voice(Pattern),
}

/// Owns the context and the registered commands; runs the dispatch cycle.
pub struct Dispatcher {
    context: Context,
    commands: Vec<Box<dyn Command>>,
}

impl Dispatcher {
    pub fn new(position: Point) -> Self {
        Self {
            context: Context::new(position),
            commands: Vec::new(),
        }
    }

    /// Add a command at the end of the execution order.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<()> {
        let kind = command.kind();
        if self.commands.iter().any(|c| c.kind() == kind) {
            return Err(Error::DuplicateCommand(kind));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Registered kinds, in execution order
    pub fn kinds(&self) -> Vec<CommandKind> {
        self.commands.iter().map(|c| c.kind()).collect()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Apply one event to the context and run the cycle.
    pub fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::Gaze(position) => {
                self.context.recognized = None;
                self.context.position = position;
            }
            InputEvent::Voice(pattern) => {
                debug!(%pattern, "voice pattern");
                self.context.recognized = Some(pattern);
            }
        }
        self.run_cycle();
    }

    fn run_cycle(&mut self) {
        self.terminate_running();
        self.execute_all();
    }

    fn terminate_running(&mut self) {
        let context = &self.context;
        let mut survivors = RunningSet::default();
        let mut consumed = false;

        for kind in context.running.snapshot() {
            let Some(command) = self.commands.iter_mut().find(|c| c.kind() == kind) else {
                continue;
            };
            let intercepts = command.is_running()
                && guarded(kind, "intercept", || command.intercept(context)) == Some(true);
            if intercepts {
                debug!(%kind, "pattern intercepted");
                consumed = true;
            }
            match guarded(kind, "terminate", || command.terminate(context)) {
                Some(true) => info!(%kind, "command finished"),
                _ => {
                    survivors.insert(kind);
                }
            }
        }

        self.context.running = survivors;
        if consumed {
            self.context.recognized = None;
        }
    }

    fn execute_all(&mut self) {
        let context = &self.context;
        let mut started = Vec::new();

        for command in self.commands.iter_mut() {
            let kind = command.kind();
            if command.is_running() {
                trace!(%kind, "still running, skipped");
                continue;
            }
            let handled = guarded(kind, "execute", || command.execute(context)) == Some(true);
            if handled && command.is_running() {
                started.push(kind);
            }
        }

        for kind in started {
            if self.context.running.insert(kind) {
                info!(%kind, "command running");
            }
        }
    }
}

/// Run one command call, turning a panic into `None`.
fn guarded<T>(kind: CommandKind, stage: &str, call: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => Some(value),
        Err(payload) => {
            error!(%kind, stage, "command panicked: {}", panic_message(payload.as_ref()));
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Raw input devices
pub struct Inputs {
    pub gaze: Box<dyn RawGazeSource>,
    pub speech: Box<dyn RawSpeechSource>,
}

/// Side-effect capabilities handed to the commands
#[derive(Clone)]
pub struct Actions {
    pub synth: Arc<dyn InputSynth>,
    pub launcher: Arc<dyn Launcher>,
}

/// Entry point wiring sources, dispatcher and commands together
pub struct Engine;

impl Engine {
    /// Start the engine.
    ///
    /// Must be called from within a tokio runtime, which hosts the gaze ticker.
    pub fn start(config: &Config, inputs: Inputs, actions: Actions) -> Result<EngineHandle> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;

        let completion = CompletionSignal::new();
        let bounds = config.display_bounds();
        let start = actions
            .synth
            .pointer_position()
            .unwrap_or_else(|| bounds.center());
        let dictation = DictationSession::new(Arc::clone(&actions.synth));

        let mut dispatcher = Dispatcher::new(start);
        let commands: Vec<Box<dyn Command>> = vec![
            Box::new(PointerMove::new(Arc::clone(&actions.synth))),
            Box::new(Calibrate::new(inputs.gaze.calibrator())),
            Box::new(LeftClick::new(Arc::clone(&actions.synth))),
            Box::new(LeftDoubleClick::new(
                Arc::clone(&actions.synth),
                config.double_click_time(),
            )),
            Box::new(Cancel::new(Arc::clone(&actions.synth))),
            Box::new(Close::new(Arc::clone(&actions.synth))),
            Box::new(Dictation::new(Arc::clone(&dictation))),
            Box::new(Zoom::new(Arc::clone(&actions.launcher), config.magnifier())),
            Box::new(Quit::new(completion.clone())),
        ];
        for command in commands {
            dispatcher.register(command)?;
        }

        let (events, rx) = flume::unbounded();
        let dispatch = spawn_dispatch(dispatcher, rx, completion.clone())?;
        let gaze = GazePipeline::spawn(
            inputs.gaze,
            Interpolator::new(config.gaze_params(), bounds, start),
            events.clone(),
            &runtime,
        )?;
        let voice = VoiceListener::spawn(
            inputs.speech,
            VoiceMatcher::new(&config.wake_word),
            dictation,
            events.clone(),
        )?;

        info!(
            wake_word = %config.wake_word,
            %start,
            fps = config.gaze.fps,
            "engine started"
        );
        Ok(EngineHandle {
            completion,
            events,
            gaze,
            voice,
            dispatch: Some(dispatch),
        })
    }
}

fn spawn_dispatch(
    mut dispatcher: Dispatcher,
    rx: Receiver<InputEvent>,
    completion: CompletionSignal,
) -> Result<JoinHandle<Dispatcher>> {
    let handle = thread::Builder::new()
        .name("dispatch".into())
        .spawn(move || {
            while !completion.is_set() {
                match rx.recv_timeout(DISPATCH_POLL) {
                    Ok(event) => dispatcher.dispatch(event),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("dispatch loop finished");
            dispatcher
        })?;
    Ok(handle)
}

/// Running engine
pub struct EngineHandle {
    completion: CompletionSignal,
    events: Sender<InputEvent>,
    gaze: GazePipeline,
    voice: VoiceListener,
    dispatch: Option<JoinHandle<Dispatcher>>,
}

impl EngineHandle {
    /// Completion latch, set by the quit command. Clone it to stop the engine from elsewhere.
    pub fn completion(&self) -> CompletionSignal {
        self.completion.clone()
    }

    /// Inject an event as if a source had produced it
    pub fn send(&self, event: InputEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Block until the completion signal is set.
    pub fn wait(&self) {
        self.completion.wait();
    }

    /// Block until completion or `timeout`. Returns true if completed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.completion.wait_timeout(timeout)
    }

    /// Stop the sources and the dispatch thread. Returns the final context.
    pub fn shutdown(mut self) -> Option<Context> {
        self.gaze.shutdown();
        self.voice.shutdown();
        self.completion.set();
        let dispatcher = self.dispatch.take()?.join();
        match dispatcher {
            Ok(dispatcher) => {
                info!("engine stopped");
                Some(dispatcher.context)
            }
            Err(_) => {
                error!("dispatch thread panicked");
                None
            }
        }
    }
}
