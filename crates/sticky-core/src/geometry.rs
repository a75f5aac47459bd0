//! Pure geometry and constraint functions.
//!
//! Everything here is side-effect free: the drag and resize controllers and
//! the board's create action all derive note geometry through these helpers.

use crate::model::{EMPTY_NOTE_SUMMARY, Position, Rect, Size, Viewport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Clamping ────────────────────────────────────────────────────────────

/// Keep a note of `size` inside a `bounds_w × bounds_h` area.
///
/// When the note is larger than the area, the lower bound (0) wins.
pub fn clamp_position(pos: Position, size: Size, bounds_w: i32, bounds_h: i32) -> Position {
    Position {
        x: pos.x.min(bounds_w.saturating_sub(size.width)).max(0),
        y: pos.y.min(bounds_h.saturating_sub(size.height)).max(0),
    }
}

/// Clamp each axis of `size` independently to `[min, max]`.
pub fn clamp_size(size: Size, min: Size, max: Size) -> Size {
    Size {
        width: clamp_axis(size.width, min.width, max.width),
        height: clamp_axis(size.height, min.height, max.height),
    }
}

fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Summary line for a note: the trimmed text before the first newline, or
/// `"Empty note..."` when that line is blank.
pub fn first_line(text: &str) -> String {
    let line = text.split('\n').next().unwrap_or_default().trim();
    if line.is_empty() {
        EMPTY_NOTE_SUMMARY.to_string()
    } else {
        line.to_string()
    }
}

// ─── Toolbar avoidance ───────────────────────────────────────────────────

/// Push a note to the right edge of `toolbar` when it would slide under it.
///
/// Only `x` is ever adjusted, and only when the note's top edge lies within
/// the toolbar's vertical span. A note hanging down into the toolbar from
/// above keeps its position.
pub fn avoid_toolbar(pos: Position, size: Size, toolbar: Rect) -> Position {
    let bounds = Rect::from_parts(pos, size);
    if bounds.overlaps(&toolbar) && toolbar.spans_y(pos.y) {
        Position::new(toolbar.right(), pos.y)
    } else {
        pos
    }
}

/// Position of a dragged note: pointer minus grab offset, kept on the
/// non-negative quadrant and out from under the toolbar.
pub fn drag_position(pointer: Position, offset: Position, size: Size, toolbar: Rect) -> Position {
    let constrained = Position::new(
        pointer.x.saturating_sub(offset.x).max(0),
        pointer.y.saturating_sub(offset.y).max(0),
    );
    avoid_toolbar(constrained, size, toolbar)
}

/// Where a new note of `size` appears: centered in the viewport, then
/// displaced past the toolbar if needed.
pub fn spawn_position(viewport: Viewport, size: Size, toolbar: Rect) -> Position {
    let centered = Position::new(
        (viewport.width / 2 - size.width / 2).max(0),
        (viewport.height / 2 - size.height / 2).max(0),
    );
    avoid_toolbar(centered, size, toolbar)
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Which handle a resize gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeDirection {
    pub const ALL: [ResizeDirection; 8] = [
        ResizeDirection::N,
        ResizeDirection::S,
        ResizeDirection::E,
        ResizeDirection::W,
        ResizeDirection::Ne,
        ResizeDirection::Nw,
        ResizeDirection::Se,
        ResizeDirection::Sw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeDirection::N => "n",
            ResizeDirection::S => "s",
            ResizeDirection::E => "e",
            ResizeDirection::W => "w",
            ResizeDirection::Ne => "ne",
            ResizeDirection::Nw => "nw",
            ResizeDirection::Se => "se",
            ResizeDirection::Sw => "sw",
        }
    }

    /// Moves the top edge.
    pub fn north(&self) -> bool {
        matches!(
            self,
            ResizeDirection::N | ResizeDirection::Ne | ResizeDirection::Nw
        )
    }

    /// Moves the bottom edge.
    pub fn south(&self) -> bool {
        matches!(
            self,
            ResizeDirection::S | ResizeDirection::Se | ResizeDirection::Sw
        )
    }

    /// Moves the right edge.
    pub fn east(&self) -> bool {
        matches!(
            self,
            ResizeDirection::E | ResizeDirection::Ne | ResizeDirection::Se
        )
    }

    /// Moves the left edge.
    pub fn west(&self) -> bool {
        matches!(
            self,
            ResizeDirection::W | ResizeDirection::Nw | ResizeDirection::Sw
        )
    }
}

impl fmt::Display for ResizeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown resize direction: {s:?}"))
    }
}

/// New size and position for a note resized from `origin` by dragging the
/// `direction` handle to `pointer`.
///
/// The edges opposite the handle stay anchored. Each changed dimension is
/// clamped to `[min, max]` before the anchored position is derived from it,
/// so hitting a limit never makes the note drift. Dimensions the handle does
/// not touch are returned unchanged.
pub fn resize_geometry(
    direction: ResizeDirection,
    origin: Rect,
    pointer: Position,
    min: Size,
    max: Size,
) -> (Size, Position) {
    let mut size = Size::new(origin.width, origin.height);
    let mut pos = Position::new(origin.x, origin.y);

    if direction.east() {
        size.width = clamp_axis(pointer.x.saturating_sub(origin.x), min.width, max.width);
    }
    if direction.west() {
        size.width = clamp_axis(origin.right().saturating_sub(pointer.x), min.width, max.width);
        pos.x = origin.right().saturating_sub(size.width);
    }
    if direction.south() {
        size.height = clamp_axis(pointer.y.saturating_sub(origin.y), min.height, max.height);
    }
    if direction.north() {
        size.height = clamp_axis(origin.bottom().saturating_sub(pointer.y), min.height, max.height);
        pos.y = origin.bottom().saturating_sub(size.height);
    }

    (size, pos)
}
