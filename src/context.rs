//! Execution context handed to every command on each dispatch cycle

use crate::command::CommandKind;
use crate::geometry::Point;
use crate::pattern::Pattern;

/// Ordered set of running command kinds, unique by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningSet {
    kinds: Vec<CommandKind>,
}

impl RunningSet {
    /// Insert `kind` at the end unless already present. Returns true if inserted.
    pub fn insert(&mut self, kind: CommandKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.kinds.push(kind);
        true
    }

    pub fn contains(&self, kind: CommandKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = CommandKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Immutable copy for iteration while the live set is rebuilt.
    pub fn snapshot(&self) -> Vec<CommandKind> {
        self.kinds.clone()
    }
}

/// Shared state consulted by commands.
///
/// Only the dispatcher writes to it; commands get a shared reference.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) recognized: Option<Pattern>,
    pub(crate) position: Point,
    pub(crate) running: RunningSet,
}

impl Context {
    pub fn new(position: Point) -> Self {
        Self {
            recognized: None,
            position,
            running: RunningSet::default(),
        }
    }

    /// Pattern recognized by the event being dispatched, `None` for gaze events.
    pub fn recognized(&self) -> Option<Pattern> {
        self.recognized
    }

    /// True when the event being dispatched carried `pattern`.
    pub fn is(&self, pattern: Pattern) -> bool {
        self.recognized == Some(pattern)
    }

    /// Last known pointer position
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn running(&self) -> &RunningSet {
        &self.running
    }

    /// Context as seen by a command for a given pattern; used to drive commands directly.
    pub fn with_pattern(position: Point, pattern: Option<Pattern>) -> Self {
        Self {
            recognized: pattern,
            ..Self::new(position)
        }
    }
}
