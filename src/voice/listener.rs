//! Listener thread between the recognizer and the dispatcher

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use flume::Sender;
use tracing::{debug, trace};

use super::{RawSpeechSource, Routed, VoiceMatcher};
use crate::command::DictationSession;
use crate::engine::InputEvent;
use crate::error::Result;

/// Voice listener thread: recognizer results -> pattern events / dictated text
pub struct VoiceListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VoiceListener {
    pub fn spawn(
        mut source: Box<dyn RawSpeechSource>,
        matcher: VoiceMatcher,
        dictation: Arc<DictationSession>,
        events: Sender<InputEvent>,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("voice-listener".into())
            .spawn(move || {
                while !stopped.load(Ordering::SeqCst) {
                    let Some(result) = source.next_result() else {
                        debug!("speech source ended");
                        break;
                    };
                    match matcher.route(&result) {
                        Routed::Command { pattern, .. } => {
                            if events.send(InputEvent::Voice(pattern)).is_err() {
                                debug!("event channel closed, voice listener exits");
                                break;
                            }
                        }
                        Routed::Dictation(text) => {
                            if !dictation.dictate(&text) {
                                trace!(text = %text, "free text outside dictation ignored");
                            }
                        }
                        Routed::Discarded => {}
                    }
                }
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// True once the listener thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stop listening. A thread still blocked on its source is detached.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                debug!("voice listener still blocked, detaching");
            }
        }
    }
}

impl Drop for VoiceListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{RecordedAction, RecordingSynth};
    use crate::pattern::Pattern;
    use crate::voice::{ChannelSpeechSource, DIRECT_GRAMMAR, PREFIXED_GRAMMAR, Recognition};
    use std::time::Duration;

    #[test]
    fn test_listener_routes_results() {
        let (source, tx) = ChannelSpeechSource::new();
        let (events_tx, events_rx) = flume::unbounded();
        let synth = Arc::new(RecordingSynth::new());
        let session = DictationSession::new(synth.clone());
        let mut listener = VoiceListener::spawn(
            Box::new(source),
            VoiceMatcher::new("al"),
            Arc::clone(&session),
            events_tx,
        )
        .unwrap();

        tx.send(Recognition::command(DIRECT_GRAMMAR, "top", "top")).unwrap();
        tx.send(Recognition::command(PREFIXED_GRAMMAR, "top", "top")).unwrap();
        tx.send(Recognition::dictation("ignored")).unwrap();
        tx.send(Recognition::command(PREFIXED_GRAMMAR, "al texte", "texte")).unwrap();

        let first = events_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(first, InputEvent::Voice(Pattern::LeftClick)));
        let second = events_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(second, InputEvent::Voice(Pattern::Dictation)));

        session.open();
        tx.send(Recognition::dictation("bonjour")).unwrap();
        drop(tx);
        for _ in 0..100 {
            if listener.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(listener.is_finished());
        listener.shutdown();
        assert_eq!(synth.actions(), vec![RecordedAction::Text("bonjour".into())]);
    }
}
