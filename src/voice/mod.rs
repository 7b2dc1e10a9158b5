//! Voice pattern matching
//!
//! The recognizer runs two command grammars at once: the *direct* grammar
//! (clicks, spoken bare) and the *prefixed* grammar (everything else, after
//! the wake word). While dictating, a free-text *dictation* grammar is also
//! active. Each result names the grammar that produced it; the matcher maps
//! it onto a catalog [`Pattern`] or discards it.

mod fuzzy;
mod listener;
mod source;
mod wake;

use tracing::debug;

use crate::pattern::Pattern;

pub use fuzzy::{clean_for_matching, closest, fuzzy_match, levenshtein};
pub use listener::VoiceListener;
pub use source::{ChannelSpeechSource, LineSpeechSource, RawSpeechSource};
pub use wake::WakeWord;

/// Grammar of bare patterns
pub const DIRECT_GRAMMAR: &str = "direct";
/// Grammar of patterns following the wake word
pub const PREFIXED_GRAMMAR: &str = "prefixed";
/// Free-text grammar active during dictation
pub const DICTATION_GRAMMAR: &str = "dictation";

/// Grammars the matcher accepts results from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Direct,
    Prefixed,
    Dictation,
}

impl GrammarKind {
    pub fn from_name(name: &str) -> Option<GrammarKind> {
        match name {
            DIRECT_GRAMMAR => Some(GrammarKind::Direct),
            PREFIXED_GRAMMAR => Some(GrammarKind::Prefixed),
            DICTATION_GRAMMAR => Some(GrammarKind::Dictation),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GrammarKind::Direct => DIRECT_GRAMMAR,
            GrammarKind::Prefixed => PREFIXED_GRAMMAR,
            GrammarKind::Dictation => DICTATION_GRAMMAR,
        }
    }
}

/// One speech recognizer result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Name of the grammar that produced the result
    pub grammar: String,
    /// Full recognized text
    pub text: String,
    /// Semantic command value attached by a command grammar
    pub command: Option<String>,
}

impl Recognition {
    pub fn command(grammar: &str, text: &str, command: &str) -> Self {
        Self {
            grammar: grammar.to_string(),
            text: text.to_string(),
            command: Some(command.to_string()),
        }
    }

    pub fn dictation(text: &str) -> Self {
        Self {
            grammar: DICTATION_GRAMMAR.to_string(),
            text: text.to_string(),
            command: None,
        }
    }
}

/// Where a recognition result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Command { pattern: Pattern, grammar: GrammarKind },
    Dictation(String),
    Discarded,
}

/// Maps recognizer results onto the pattern catalog
#[derive(Debug, Clone)]
pub struct VoiceMatcher {
    wake: WakeWord,
}

impl VoiceMatcher {
    pub fn new(wake_word: &str) -> Self {
        Self {
            wake: WakeWord::new(wake_word),
        }
    }

    pub fn route(&self, result: &Recognition) -> Routed {
        let Some(grammar) = GrammarKind::from_name(&result.grammar) else {
            debug!(grammar = %result.grammar, "result from unknown grammar discarded");
            return Routed::Discarded;
        };
        if grammar == GrammarKind::Dictation {
            let text = result.text.trim();
            if text.is_empty() {
                return Routed::Discarded;
            }
            return Routed::Dictation(text.to_string());
        }

        let Some(pattern) = result.command.as_deref().and_then(Pattern::from_token) else {
            debug!(text = %result.text, "no catalog pattern");
            return Routed::Discarded;
        };
        let accepted = match grammar {
            GrammarKind::Direct => !pattern.requires_prefix(),
            GrammarKind::Prefixed => {
                pattern.requires_prefix() && self.wake.strip_exact(&result.text).is_some()
            }
            GrammarKind::Dictation => false,
        };
        if !accepted {
            debug!(%pattern, grammar = grammar.name(), text = %result.text, "pattern outside its grammar");
            return Routed::Discarded;
        }
        debug!(%pattern, grammar = grammar.name(), "recognized");
        Routed::Command { pattern, grammar }
    }
}
