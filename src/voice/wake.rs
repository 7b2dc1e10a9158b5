use super::fuzzy::fuzzy_match;

/// Wake word detection - checks if an utterance starts with the wake phrase
#[derive(Debug, Clone)]
pub struct WakeWord {
    phrase: String,
    words: Vec<String>,
}

impl WakeWord {
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            words: phrase
                .to_lowercase()
                .split_whitespace()
                .map(String::from)
                .collect(),
        }
    }

    /// Check if text starts with the wake word (fuzzy), return the remaining text if matched
    pub fn detect(&self, text: &str) -> Option<String> {
        self.strip(text, |expected, spoken| fuzzy_match(expected, spoken))
    }

    /// Like [`WakeWord::detect`], but each word must match exactly (case-insensitive)
    pub fn strip_exact(&self, text: &str) -> Option<String> {
        self.strip(text, |expected, spoken| expected == spoken)
    }

    fn strip(&self, text: &str, matches: impl Fn(&str, &str) -> bool) -> Option<String> {
        if self.words.is_empty() {
            return None;
        }
        let text_words: Vec<&str> = text.split_whitespace().collect();
        if text_words.len() < self.words.len() {
            return None;
        }

        for (wake_word, spoken) in self.words.iter().zip(&text_words) {
            let spoken: String = spoken
                .to_lowercase()
                .chars()
                .filter(|c| c.is_alphabetic())
                .collect();
            if !matches(wake_word, &spoken) {
                return None;
            }
        }

        let rest = text_words[self.words.len()..].join(" ");
        Some(rest.trim_start_matches([',', '!', '.', ' ']).to_string())
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}
