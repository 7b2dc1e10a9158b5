//! Raw speech sources: the recognizer boundary

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flume::{Receiver, Sender};
use tracing::{debug, trace, warn};

use super::fuzzy::{clean_for_matching, closest};
use super::wake::WakeWord;
use super::{DIRECT_GRAMMAR, PREFIXED_GRAMMAR, Recognition};
use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Speech recognizer.
///
/// `next_result` blocks until the next result; `None` means the recognizer stopped.
pub trait RawSpeechSource: Send {
    fn next_result(&mut self) -> Option<Recognition>;
}

/// Recognizer over typed or piped utterances, one per line.
///
/// Emulates grammar-constrained recognition: a line starting with the wake
/// word is snapped onto the closest prefixed pattern, a bare line onto the
/// closest direct pattern, and anything else is reported as dictation.
pub struct LineSpeechSource<R> {
    reader: R,
    wake: WakeWord,
    line: String,
}

impl LineSpeechSource<BufReader<io::Stdin>> {
    pub fn stdin(wake_word: &str) -> Self {
        Self::new(BufReader::new(io::stdin()), wake_word)
    }
}

impl LineSpeechSource<BufReader<File>> {
    /// Replay a script of utterances, one per line
    pub fn open(path: &Path, wake_word: &str) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::SpeechUnavailable(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "speech script opened");
        Ok(Self::new(BufReader::new(file), wake_word))
    }
}

impl<R: BufRead> LineSpeechSource<R> {
    pub fn new(reader: R, wake_word: &str) -> Self {
        Self {
            reader,
            wake: WakeWord::new(wake_word),
            line: String::new(),
        }
    }

    /// Recognize one utterance. `None` for silence.
    pub fn recognize(&self, utterance: &str) -> Option<Recognition> {
        let cleaned = clean_for_matching(utterance);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return None;
        }

        if let Some(rest) = self.wake.detect(cleaned) {
            if let Some(token) = closest(rest.trim(), Pattern::prefixed().map(Pattern::token)) {
                let text = format!("{} {}", self.wake.phrase().to_lowercase(), token);
                return Some(Recognition::command(PREFIXED_GRAMMAR, &text, token));
            }
        }
        if let Some(token) = closest(cleaned, Pattern::direct().map(Pattern::token)) {
            return Some(Recognition::command(DIRECT_GRAMMAR, token, token));
        }
        Some(Recognition::dictation(utterance.trim()))
    }
}

impl<R: BufRead + Send> RawSpeechSource for LineSpeechSource<R> {
    fn next_result(&mut self) -> Option<Recognition> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!("speech input failed: {}", e);
                    return None;
                }
            }
            trace!(line = %self.line.trim_end(), "utterance");
            if let Some(result) = self.recognize(&self.line) {
                return Some(result);
            }
        }
    }
}

/// Speech source fed through a channel
pub struct ChannelSpeechSource {
    rx: Receiver<Recognition>,
}

impl ChannelSpeechSource {
    /// Source plus the sender that feeds it. Dropping every sender ends the source.
    pub fn new() -> (Self, Sender<Recognition>) {
        let (tx, rx) = flume::unbounded();
        (Self { rx }, tx)
    }
}

impl RawSpeechSource for ChannelSpeechSource {
    fn next_result(&mut self) -> Option<Recognition> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::DICTATION_GRAMMAR;
    use std::io::{Cursor, Write};

    fn source(input: &str) -> LineSpeechSource<Cursor<Vec<u8>>> {
        LineSpeechSource::new(Cursor::new(input.as_bytes().to_vec()), "al")
    }

    #[test]
    fn test_recognize_grammars() {
        let src = source("");
        assert_eq!(
            src.recognize("Top!"),
            Some(Recognition::command(DIRECT_GRAMMAR, "top", "top"))
        );
        assert_eq!(
            src.recognize("al, anuler"),
            Some(Recognition::command(PREFIXED_GRAMMAR, "al annuler", "annuler"))
        );
        assert_eq!(
            src.recognize("Bonjour tout le monde"),
            Some(Recognition::dictation("Bonjour tout le monde"))
        );
        assert_eq!(src.recognize("  ...  "), None);
    }

    #[test]
    fn test_prefixed_word_without_wake_is_dictation() {
        let result = source("").recognize("fermer").unwrap();
        assert_eq!(result.grammar, DICTATION_GRAMMAR);
    }

    #[test]
    fn test_open_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "top").unwrap();
        writeln!(file, "al terminer").unwrap();

        let mut src = LineSpeechSource::open(file.path(), "al").unwrap();
        assert_eq!(
            src.next_result(),
            Some(Recognition::command(DIRECT_GRAMMAR, "top", "top"))
        );
        assert_eq!(
            src.next_result(),
            Some(Recognition::command(PREFIXED_GRAMMAR, "al terminer", "terminer"))
        );
        assert_eq!(src.next_result(), None);
    }

    #[test]
    fn test_open_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineSpeechSource::open(&dir.path().join("none.txt"), "al")
            .err()
            .unwrap();
        assert!(matches!(err, Error::SpeechUnavailable(_)));
    }

    #[test]
    fn test_next_result_skips_blank_lines() {
        let mut src = source("\n\ntiptop\nal zoom\n");
        assert_eq!(
            src.next_result(),
            Some(Recognition::command(DIRECT_GRAMMAR, "tiptop", "tiptop"))
        );
        assert_eq!(
            src.next_result(),
            Some(Recognition::command(PREFIXED_GRAMMAR, "al zoom", "zoom"))
        );
        assert_eq!(src.next_result(), None);
    }
}
