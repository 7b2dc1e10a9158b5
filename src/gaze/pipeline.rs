//! Gaze pipeline runtime: reader thread + fixed-rate playback ticker
//!
//! The reader blocks on the device and feeds fixations to the shared
//! interpolator; the ticker pops one point per period and emits it as a
//! gaze event. Both lock the same mutex, so they never touch the queue
//! at the same time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::Sender;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{Fixation, GazeSignal, Interpolator, RawGazeSource};
use crate::engine::InputEvent;
use crate::error::Result;

pub struct GazePipeline {
    token: CancellationToken,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    ticker: Option<tokio::task::JoinHandle<()>>,
}

impl GazePipeline {
    /// Start reading `source` and playing interpolated points into `events`.
    ///
    /// The ticker task is spawned on `runtime`.
    pub fn spawn(
        mut source: Box<dyn RawGazeSource>,
        interpolator: Interpolator,
        events: Sender<InputEvent>,
        runtime: &Handle,
    ) -> Result<Self> {
        let period = interpolator.params().tick_period();
        let interpolator = Arc::new(Mutex::new(interpolator));
        let token = CancellationToken::new();
        let stop = Arc::new(AtomicBool::new(false));

        let shared = Arc::clone(&interpolator);
        let stopped = Arc::clone(&stop);
        let reader = thread::Builder::new()
            .name("gaze-reader".into())
            .spawn(move || {
                while !stopped.load(Ordering::SeqCst) {
                    let Some(signal) = source.next_signal() else {
                        debug!("gaze source ended");
                        break;
                    };
                    match signal {
                        GazeSignal::Fixation(sample) => {
                            if shared.lock().on_fixation(sample) == Fixation::Dropped {
                                warn!(
                                    t = sample.timestamp_ms,
                                    at = %sample.position,
                                    "dropped degenerate gaze sample"
                                );
                            }
                        }
                        GazeSignal::Bounds(bounds) => {
                            debug!(width = bounds.width, height = bounds.height, "display changed");
                            shared.lock().set_bounds(bounds);
                        }
                    }
                }
            })?;

        let ticker = {
            let _guard = runtime.enter();
            spawn_ticker(interpolator, period, events, token.clone())
        };

        Ok(Self {
            token,
            stop,
            reader: Some(reader),
            ticker: Some(ticker),
        })
    }

    /// Stop the ticker and the reader.
    ///
    /// A reader still blocked on its device is detached.
    pub fn shutdown(&mut self) {
        self.token.cancel();
        self.stop.store(true, Ordering::SeqCst);
        self.ticker.take();
        if let Some(reader) = self.reader.take() {
            if reader.is_finished() {
                let _ = reader.join();
            } else {
                debug!("gaze reader still blocked, detaching");
            }
        }
    }
}

impl Drop for GazePipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pop one interpolated point per `period` and emit it.
///
/// Ends when `token` is cancelled or the event receiver is gone.
pub(crate) fn spawn_ticker(
    interpolator: Arc<Mutex<Interpolator>>,
    period: Duration,
    events: Sender<InputEvent>,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        trace!(period_ms = period.as_millis(), "gaze ticker started");
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("gaze ticker cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    let next = interpolator.lock().next_point();
                    if let Some(point) = next {
                        if events.send(InputEvent::Gaze(point)).is_err() {
                            debug!("event channel closed, gaze ticker exits");
                            return;
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaze::{GazeParams, GazeSample};
    use crate::geometry::{DisplayBounds, Point};

    fn shared() -> Arc<Mutex<Interpolator>> {
        Arc::new(Mutex::new(Interpolator::new(
            GazeParams::default(),
            DisplayBounds::new(1920.0, 1080.0),
            Point::new(0.0, 0.0),
        )))
    }

    fn gaze_points(rx: &flume::Receiver<InputEvent>) -> Vec<Point> {
        rx.drain()
            .filter_map(|event| match event {
                InputEvent::Gaze(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_plays_one_point_per_period() {
        let interp = shared();
        interp.lock().on_fixation(GazeSample::new(600.0, 100.0, 0.0));
        let (tx, rx) = flume::unbounded();
        let token = CancellationToken::new();
        let handle = spawn_ticker(
            Arc::clone(&interp),
            Duration::from_millis(20),
            tx,
            token.clone(),
        );

        // First tick fires immediately, then one every 20ms
        time::sleep(Duration::from_millis(190)).await;
        assert_eq!(gaze_points(&rx).len(), 10);

        time::sleep(Duration::from_millis(1000)).await;
        let rest = gaze_points(&rx);
        assert_eq!(rest.len(), 15);
        assert_eq!(rest.last(), Some(&Point::new(100.0, 0.0)));
        assert_eq!(interp.lock().pending_len(), 0);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_exits_when_receiver_dropped() {
        let interp = shared();
        interp.lock().on_fixation(GazeSample::new(600.0, 100.0, 0.0));
        let (tx, rx) = flume::unbounded();
        drop(rx);
        let handle = spawn_ticker(interp, Duration::from_millis(20), tx, CancellationToken::new());
        handle.await.unwrap();
    }
}
