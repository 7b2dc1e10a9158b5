//! Process-wide completion latch
//!
//! Set once by the quit command (or Ctrl+C); the bootstrap blocks on it
//! before tearing the engine down.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct Latch {
    set: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable handle to a single shutdown latch.
#[derive(Clone, Default)]
pub struct CompletionSignal {
    inner: Arc<Latch>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latch. Returns true only for the call that actually set it.
    pub fn set(&self) -> bool {
        let mut set = self.inner.set.lock();
        if *set {
            return false;
        }
        *set = true;
        self.inner.cond.notify_all();
        true
    }

    pub fn is_set(&self) -> bool {
        *self.inner.set.lock()
    }

    /// Block until the latch is set.
    pub fn wait(&self) {
        let mut set = self.inner.set.lock();
        while !*set {
            self.inner.cond.wait(&mut set);
        }
    }

    /// Block until the latch is set or `timeout` elapses. Returns the latch state.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut set = self.inner.set.lock();
        if !*set {
            let _ = self.inner.cond.wait_for(&mut set, timeout);
        }
        *set
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_set_only_once() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_set());
        assert!(signal.set());
        assert!(!signal.set());
        assert!(signal.is_set());
    }

    #[test]
    fn test_wait_wakes_on_set() {
        let signal = CompletionSignal::new();
        let setter = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set();
        });
        signal.wait();
        assert!(signal.is_set());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_timeout_expires() {
        let signal = CompletionSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }
}
