//! The bounded undo log.
//!
//! Every state-changing operation pushes one entry carrying the pose and
//! pen state from before the operation plus the geometry it drew. Undo pops
//! the newest entry, restores the pose, and the screen replays the rest.
//! When the log overflows, the evicted entry's pixels are folded into a
//! raster base image so replays stay correct.

use std::collections::VecDeque;

use crate::color::Color;
use crate::geometry::{WorldMap, WorldPoint};
use crate::shapes::StretchFactors;
use crate::surface::{FillRule, SavedRegion};
use crate::turtle::ResizeMode;

/// Pose and pen state captured before an operation runs.
#[derive(Clone, Debug)]
pub struct TurtleSnapshot {
    pub pos: WorldPoint,
    pub heading: f64,
    pub pen_down: bool,
    pub pen_color: Color,
    pub pen_size: f64,
    pub visible: bool,
    pub fill_color: Color,
    pub filling: bool,
    pub bounds: WorldMap,
    pub resize_mode: ResizeMode,
    pub stretch: StretchFactors,
}

/// One undoable operation and everything needed to replay it.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Operation name as recorded (`"forward"`, `"right"`, ...).
    pub op: &'static str,
    pub args: Vec<f64>,
    pub snap: TurtleSnapshot,
    /// Path stroked by this operation, in world coordinates.
    pub points: Vec<WorldPoint>,
    /// Accumulated fill path as of this entry, when a fill was open.
    pub fill_points: Option<Vec<WorldPoint>>,
    /// Region filled by this operation (`end_fill`).
    pub filled: Option<(Vec<WorldPoint>, FillRule)>,
    /// A dot drawn by this operation: center, diameter in world units, color.
    pub dot: Option<(WorldPoint, f64, Color)>,
    /// Text painted by this operation, kept so replays repaint it.
    pub text: Option<TextRecord>,
}

/// Everything needed to repaint a `write` during replay.
#[derive(Clone, Debug)]
pub struct TextRecord {
    pub text: String,
    pub pos: WorldPoint,
    pub color: Color,
    pub font: crate::surface::Font,
    pub align: crate::surface::TextAlign,
}

impl HistoryEntry {
    pub fn new(op: &'static str, args: Vec<f64>, snap: TurtleSnapshot) -> HistoryEntry {
        HistoryEntry {
            op,
            args,
            snap,
            points: Vec::new(),
            fill_points: None,
            filled: None,
            dot: None,
            text: None,
        }
    }

    /// Whether replaying this entry paints anything.
    pub fn has_geometry(&self) -> bool {
        self.points.len() > 1 || self.filled.is_some() || self.dot.is_some() || self.text.is_some()
    }
}

/// Bounded FIFO of [`HistoryEntry`], plus the raster base for evictions.
pub struct UndoLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    /// Pixels of entries that fell off the front of the log.
    pub base: Option<SavedRegion>,
}

impl UndoLog {
    pub fn new(capacity: usize) -> UndoLog {
        UndoLog {
            entries: VecDeque::new(),
            capacity,
            base: None,
        }
    }

    /// Push an entry, returning the evicted one if the log was full.
    /// A zero capacity records nothing.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn last_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.back_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resize the log. Shrinking drops the oldest entries without folding
    /// them into the base; callers snapshot first if they need the pixels.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.base = None;
    }
}
