//! Note construction.

use crate::clock::{Clock, SystemClock};
use crate::id::NoteId;
use crate::model::{DEFAULT_NOTE_SIZE, Note, NoteColor, Position};

/// Create a note at `position` with the default size, stamped with the
/// current wall-clock time.
pub fn create_note(position: Position, color: NoteColor, z_index: i32) -> Note {
    create_note_at(position, color, z_index, SystemClock.now_ms())
}

/// Create a note stamped with an explicit `now` (milliseconds).
pub fn create_note_at(position: Position, color: NoteColor, z_index: i32, now: i64) -> Note {
    Note {
        id: NoteId::generate(now),
        position,
        size: DEFAULT_NOTE_SIZE,
        text: String::new(),
        color,
        z_index,
        is_minimized: false,
        created_at: now,
        updated_at: now,
    }
}
