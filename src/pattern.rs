//! Pattern catalog - the fixed set of spoken tokens the engine reacts to
//!
//! Patterns are compared by identity (enum variant), never by re-parsing
//! the spoken string. Direct patterns are spoken bare; the others must
//! follow the wake word.

use std::fmt;

/// Wake word that must precede every non-direct pattern.
pub const DEFAULT_WAKE_WORD: &str = "al";

/// Recognized voice patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    LeftClick,
    LeftDoubleClick,
    Cancel,
    Close,
    ZoomIn,
    Dictation,
    Calibrate,
    Quit,
}

impl Pattern {
    /// Every supported pattern, in catalog order.
    pub const ALL: [Pattern; 8] = [
        Pattern::LeftClick,
        Pattern::LeftDoubleClick,
        Pattern::Cancel,
        Pattern::Close,
        Pattern::ZoomIn,
        Pattern::Dictation,
        Pattern::Calibrate,
        Pattern::Quit,
    ];

    /// Spoken token for this pattern
    pub const fn token(self) -> &'static str {
        match self {
            Pattern::LeftClick => "top",
            Pattern::LeftDoubleClick => "tiptop",
            Pattern::Cancel => "annuler",
            Pattern::Close => "fermer",
            Pattern::ZoomIn => "zoom",
            Pattern::Dictation => "texte",
            Pattern::Calibrate => "calibration",
            Pattern::Quit => "terminer",
        }
    }

    /// True when the token must follow the wake word.
    ///
    /// Clicks are frequent and short, so they are spoken bare.
    pub const fn requires_prefix(self) -> bool {
        !matches!(self, Pattern::LeftClick | Pattern::LeftDoubleClick)
    }

    /// Exact lookup of a spoken token. `None` if the token is not in the catalog.
    pub fn from_token(token: &str) -> Option<Pattern> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }

    /// Patterns spoken bare, in catalog order
    pub fn direct() -> impl Iterator<Item = Pattern> {
        Self::ALL.into_iter().filter(|p| !p.requires_prefix())
    }

    /// Patterns spoken after the wake word, in catalog order
    pub fn prefixed() -> impl Iterator<Item = Pattern> {
        Self::ALL.into_iter().filter(|p| p.requires_prefix())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_distinct() {
        let tokens: HashSet<_> = Pattern::ALL.iter().map(|p| p.token()).collect();
        assert_eq!(tokens.len(), Pattern::ALL.len());
        assert!(!tokens.contains(DEFAULT_WAKE_WORD));
    }

    #[test]
    fn test_from_token_exact() {
        assert_eq!(Pattern::from_token("top"), Some(Pattern::LeftClick));
        assert_eq!(Pattern::from_token("tiptop"), Some(Pattern::LeftDoubleClick));
        assert_eq!(Pattern::from_token("terminer"), Some(Pattern::Quit));
        // No trimming, no case folding
        assert_eq!(Pattern::from_token("Top"), None);
        assert_eq!(Pattern::from_token(" top"), None);
        assert_eq!(Pattern::from_token("stop"), None);
    }

    #[test]
    fn test_grammar_split() {
        let direct: Vec<_> = Pattern::direct().collect();
        assert_eq!(direct, vec![Pattern::LeftClick, Pattern::LeftDoubleClick]);
        assert_eq!(Pattern::prefixed().count(), 6);
        assert!(Pattern::prefixed().all(|p| p.requires_prefix()));
    }
}
