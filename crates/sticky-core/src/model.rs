//! Core data model for the sticky-notes board.
//!
//! A board is a flat collection of `Note`s. Each note is an independently
//! addressable rectangle on the canvas; stacking is governed by `z_index`,
//! not by the order of the collection. The serialized shape (camelCase keys,
//! lowercase colors) is the persisted storage layout.

use crate::id::NoteId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Constants ───────────────────────────────────────────────────────────

/// Size given to freshly created notes.
pub const DEFAULT_NOTE_SIZE: Size = Size::new(300, 250);

/// Smallest size a resize may produce.
pub const MIN_NOTE_SIZE: Size = Size::new(150, 150);

/// Largest size a resize may produce.
pub const MAX_NOTE_SIZE: Size = Size::new(600, 600);

/// Summary shown for notes without a meaningful first line.
pub const EMPTY_NOTE_SUMMARY: &str = "Empty note...";

// ─── Geometry primitives ─────────────────────────────────────────────────

/// Top-left corner of a note, in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a note, in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle. Used for the toolbar region and note bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Position, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether `y` lies inside the half-open vertical span `[y, bottom)`.
    pub fn spans_y(&self, y: i32) -> bool {
        y >= self.y && y < self.bottom()
    }
}

/// The host window dimensions, read at the moment a note is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// The fixed note palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    Purple,
}

impl NoteColor {
    /// Palette order, as presented by the toolbar color picker.
    pub const ALL: [NoteColor; 5] = [
        NoteColor::Yellow,
        NoteColor::Pink,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteColor::Yellow => "yellow",
            NoteColor::Pink => "pink",
            NoteColor::Blue => "blue",
            NoteColor::Green => "green",
            NoteColor::Purple => "purple",
        }
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteColor::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown note color: {s:?}"))
    }
}

// ─── Note ────────────────────────────────────────────────────────────────

/// A single sticky note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub position: Position,
    pub size: Size,
    pub text: String,
    pub color: NoteColor,
    pub z_index: i32,
    /// Display-mode flag. `size` keeps the last expanded size.
    pub is_minimized: bool,
    /// Creation time in milliseconds since the Unix epoch. Immutable.
    pub created_at: i64,
    /// Last mutation time in milliseconds since the Unix epoch.
    pub updated_at: i64,
}

impl Note {
    /// Bounding rectangle on the canvas.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Merge the supplied fields of `patch`, then refresh `updated_at`.
    ///
    /// `updated_at` is strictly increasing: when the clock has not advanced
    /// past the previous stamp, the stamp is bumped by one millisecond.
    pub fn apply_patch(&mut self, patch: NotePatch, now: i64) {
        let NotePatch {
            position,
            size,
            text,
            color,
            z_index,
            is_minimized,
        } = patch;

        if let Some(position) = position {
            self.position = position;
        }
        if let Some(size) = size {
            self.size = size;
        }
        if let Some(text) = text {
            self.text = text;
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(z_index) = z_index {
            self.z_index = z_index;
        }
        if let Some(is_minimized) = is_minimized {
            self.is_minimized = is_minimized;
        }

        self.updated_at = now.max(self.updated_at.saturating_add(1));
    }
}

/// A partial update: every supplied field replaces the note's value, every
/// `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotePatch {
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub text: Option<String>,
    pub color: Option<NoteColor>,
    pub z_index: Option<i32>,
    pub is_minimized: Option<bool>,
}

impl NotePatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn geometry(size: Size, position: Position) -> Self {
        Self {
            size: Some(size),
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn color(color: NoteColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    pub fn minimized(is_minimized: bool) -> Self {
        Self {
            is_minimized: Some(is_minimized),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
