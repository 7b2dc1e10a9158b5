//! One-shot control commands: cancel, close window, quit

use std::sync::Arc;

use tracing::{info, warn};

use super::{Command, CommandKind};
use crate::actions::{InputSynth, Key};
use crate::context::Context;
use crate::pattern::Pattern;
use crate::signal::CompletionSignal;

/// Sends the undo shortcut on "annuler"
pub struct Cancel {
    synth: Arc<dyn InputSynth>,
}

impl Cancel {
    pub fn new(synth: Arc<dyn InputSynth>) -> Self {
        Self { synth }
    }
}

impl Command for Cancel {
    fn kind(&self) -> CommandKind {
        CommandKind::Cancel
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::Cancel) {
            return false;
        }
        info!("send cancel shortcut");
        if let Err(e) = self
            .synth
            .key_combo(&[Key::primary_modifier()], Key::Char('z'))
        {
            warn!("cancel shortcut failed: {}", e);
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// Closes the focused window on "fermer"
pub struct Close {
    synth: Arc<dyn InputSynth>,
}

impl Close {
    pub fn new(synth: Arc<dyn InputSynth>) -> Self {
        Self { synth }
    }

    fn chord() -> (Key, Key) {
        #[cfg(target_os = "macos")]
        {
            (Key::Meta, Key::Char('w'))
        }
        #[cfg(not(target_os = "macos"))]
        {
            (Key::Alt, Key::F4)
        }
    }
}

impl Command for Close {
    fn kind(&self) -> CommandKind {
        CommandKind::Close
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::Close) {
            return false;
        }
        info!("send close shortcut");
        let (modifier, key) = Self::chord();
        if let Err(e) = self.synth.key_combo(&[modifier], key) {
            warn!("close shortcut failed: {}", e);
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// Sets the completion signal on "terminer"
pub struct Quit {
    completion: CompletionSignal,
}

impl Quit {
    pub fn new(completion: CompletionSignal) -> Self {
        Self { completion }
    }
}

impl Command for Quit {
    fn kind(&self) -> CommandKind {
        CommandKind::Quit
    }

    fn execute(&mut self, context: &Context) -> bool {
        if !context.is(Pattern::Quit) {
            return false;
        }
        if self.completion.set() {
            info!("quit requested");
        }
        true
    }

    fn is_running(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{RecordedAction, RecordingSynth};
    use crate::geometry::Point;

    fn ctx(pattern: Pattern) -> Context {
        Context::with_pattern(Point::default(), Some(pattern))
    }

    #[test]
    fn test_cancel_sends_undo() {
        let synth = Arc::new(RecordingSynth::new());
        let mut cmd = Cancel::new(synth.clone());
        assert!(!cmd.execute(&ctx(Pattern::Close)));
        assert!(cmd.execute(&ctx(Pattern::Cancel)));
        assert_eq!(
            synth.actions(),
            vec![RecordedAction::Combo(
                vec![Key::primary_modifier()],
                Key::Char('z')
            )]
        );
    }

    #[test]
    fn test_close_sends_platform_chord() {
        let synth = Arc::new(RecordingSynth::new());
        let mut cmd = Close::new(synth.clone());
        assert!(!cmd.execute(&ctx(Pattern::Cancel)));
        assert!(cmd.execute(&ctx(Pattern::Close)));
        let (modifier, key) = Close::chord();
        assert_eq!(
            synth.actions(),
            vec![RecordedAction::Combo(vec![modifier], key)]
        );
    }

    #[test]
    fn test_quit_sets_completion() {
        let completion = CompletionSignal::new();
        let mut cmd = Quit::new(completion.clone());
        assert!(!cmd.execute(&Context::new(Point::default())));
        assert!(!completion.is_set());
        assert!(cmd.execute(&ctx(Pattern::Quit)));
        assert!(completion.is_set());
        assert!(!cmd.is_running());
    }
}
