//! Dry-run input backend: logs every action instead of performing it

use tracing::{info, trace};

use super::{Button, InputSynth, Key};
use crate::error::Result;
use crate::geometry::Point;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSynth;

impl InputSynth for LogSynth {
    fn move_pointer(&self, to: Point) -> Result<()> {
        trace!(%to, "move pointer");
        Ok(())
    }

    fn click(&self, at: Point, button: Button) -> Result<()> {
        info!(%at, ?button, "click");
        Ok(())
    }

    fn key_combo(&self, modifiers: &[Key], key: Key) -> Result<()> {
        info!(?modifiers, ?key, "key combo");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        info!(text, "type text");
        Ok(())
    }
}
