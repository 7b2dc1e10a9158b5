//! Synthetic mouse and keyboard input using enigo
//!
//! The enigo handle lives on a dedicated worker thread; commands queue
//! operations and return immediately. Operations run strictly in the order
//! they were queued, so a double click queued as two clicks with a sleep in
//! between keeps its spacing.

use std::thread;
use std::time::Duration;

use enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use flume::Sender;
use tracing::{debug, warn};

use super::{Button, InputSynth, Key};
use crate::error::{Error, Result};
use crate::geometry::Point;

enum SynthOp {
    Move(i32, i32),
    Click(i32, i32, Button),
    Combo(Vec<Key>, Key),
    Text(String),
}

/// Keyboard and mouse backend over enigo
pub struct EnigoSynth {
    ops: Sender<SynthOp>,
    initial_position: Option<Point>,
}

impl EnigoSynth {
    /// Start the worker thread and connect to the windowing system.
    pub fn new() -> Result<Self> {
        let (ops_tx, ops_rx) = flume::unbounded::<SynthOp>();
        let (init_tx, init_rx) = flume::bounded::<std::result::Result<Option<(i32, i32)>, String>>(1);

        thread::Builder::new()
            .name("synth".into())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => enigo,
                    Err(e) => {
                        let _ = init_tx.send(Err(format!("Failed to initialize Enigo: {}", e)));
                        return;
                    }
                };
                let _ = init_tx.send(Ok(enigo.location().ok()));

                while let Ok(op) = ops_rx.recv() {
                    if let Err(e) = apply(&mut enigo, op) {
                        warn!("synthetic input failed: {}", e);
                    }
                }
                debug!("synth worker stopped");
            })?;

        let location = init_rx
            .recv()
            .map_err(|_| Error::Synth("synth worker exited during startup".into()))?
            .map_err(Error::Synth)?;

        Ok(Self {
            ops: ops_tx,
            initial_position: location.map(|(x, y)| Point::new(x as f64, y as f64)),
        })
    }

    fn queue(&self, op: SynthOp) -> Result<()> {
        self.ops
            .send(op)
            .map_err(|_| Error::Synth("synth worker is gone".into()))
    }
}

impl InputSynth for EnigoSynth {
    fn move_pointer(&self, to: Point) -> Result<()> {
        let (x, y) = to.to_pixels();
        self.queue(SynthOp::Move(x, y))
    }

    fn click(&self, at: Point, button: Button) -> Result<()> {
        let (x, y) = at.to_pixels();
        self.queue(SynthOp::Click(x, y, button))
    }

    fn key_combo(&self, modifiers: &[Key], key: Key) -> Result<()> {
        self.queue(SynthOp::Combo(modifiers.to_vec(), key))
    }

    fn type_text(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.queue(SynthOp::Text(text.to_string()))
    }

    fn pointer_position(&self) -> Option<Point> {
        self.initial_position
    }
}

fn apply(enigo: &mut Enigo, op: SynthOp) -> std::result::Result<(), enigo::InputError> {
    match op {
        SynthOp::Move(x, y) => enigo.move_mouse(x, y, Coordinate::Abs),
        SynthOp::Click(x, y, button) => {
            enigo.move_mouse(x, y, Coordinate::Abs)?;
            enigo.button(to_enigo_button(button), Direction::Click)
        }
        SynthOp::Combo(modifiers, key) => {
            for modifier in &modifiers {
                enigo.key(to_enigo_key(*modifier), Direction::Press)?;
            }

            // Small delay for modifier to register
            thread::sleep(Duration::from_millis(10));
            enigo.key(to_enigo_key(key), Direction::Click)?;
            thread::sleep(Duration::from_millis(50));

            for modifier in modifiers.iter().rev() {
                enigo.key(to_enigo_key(*modifier), Direction::Release)?;
            }
            Ok(())
        }
        SynthOp::Text(text) => enigo.text(&text),
    }
}

fn to_enigo_button(button: Button) -> enigo::Button {
    match button {
        Button::Left => enigo::Button::Left,
    }
}

fn to_enigo_key(key: Key) -> enigo::Key {
    match key {
        Key::Control => enigo::Key::Control,
        Key::Alt => enigo::Key::Alt,
        Key::Meta => enigo::Key::Meta,
        Key::F4 => enigo::Key::F4,
        Key::Char(c) => enigo::Key::Unicode(c),
    }
}
