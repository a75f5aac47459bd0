//! Per-note interaction controllers.
//!
//! Each controller is an explicit state machine: a gesture starts from a
//! `PointerEvent` on the note, then every `InputEvent` from the global
//! stream is handled against the note snapshot the caller passes in. The
//! controller never keeps a copy of the note between events, so it always
//! computes from the authoritative state.
//!
//! Controllers return `NoteMutation`s instead of writing state themselves;
//! the `Board` applies them.

use crate::board::NoteMutation;
use crate::input::InputEvent;
use sticky_core::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Drag,
    Resize,
}

pub trait Controller {
    fn kind(&self) -> ControllerKind;

    /// Whether a gesture is in progress (and the stream subscription live).
    fn is_active(&self) -> bool;

    /// Handle a global pointer event against the current `note`.
    fn handle(&mut self, event: &InputEvent, note: &Note) -> Vec<NoteMutation>;

    /// Abandon any gesture and release the stream subscription.
    fn teardown(&mut self);
}
