//! Drag controller: moves a note by its header.
//!
//! The grab offset (pointer minus the note's top-left) is captured when the
//! drag starts, so the note keeps its position relative to the cursor. Each
//! move places the note at `pointer - offset`, clamped to the non-negative
//! quadrant and pushed out from under the toolbar.

use crate::board::NoteMutation;
use crate::controller::{Controller, ControllerKind};
use crate::input::{InputEvent, PointerEvent};
use crate::pointer::{PointerHub, Subscription};
use sticky_core::config::TOOLBAR_RECT;
use sticky_core::geometry::drag_position;
use sticky_core::{Note, NotePatch, Position, Rect};

pub struct DragController {
    dragging: bool,
    offset: Position,
    toolbar: Rect,
    subscription: Option<Subscription>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(TOOLBAR_RECT)
    }
}

impl DragController {
    pub fn new(toolbar: Rect) -> Self {
        Self {
            dragging: false,
            offset: Position::default(),
            toolbar,
            subscription: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    /// Begin dragging `note` from the press `event`.
    ///
    /// Claims the event, asks for the note to be raised, and subscribes to
    /// the global pointer stream. A drag already in progress is replaced.
    pub fn start_drag(
        &mut self,
        event: &mut PointerEvent,
        note: &Note,
        hub: &PointerHub,
    ) -> Vec<NoteMutation> {
        event.claim();

        self.dragging = true;
        self.offset = Position::new(
            event.x.saturating_sub(note.position.x),
            event.y.saturating_sub(note.position.y),
        );
        // Replacing the guard drops any previous subscription first.
        self.subscription = None;
        self.subscription = Some(hub.subscribe());
        log::debug!("drag start {} offset {:?}", note.id, self.offset);

        vec![NoteMutation::BringToFront { id: note.id }]
    }

    fn stop(&mut self) {
        self.dragging = false;
        self.subscription = None;
    }
}

impl Controller for DragController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Drag
    }

    fn is_active(&self) -> bool {
        self.dragging
    }

    fn handle(&mut self, event: &InputEvent, note: &Note) -> Vec<NoteMutation> {
        if !self.dragging {
            return vec![];
        }
        match *event {
            InputEvent::PointerMove { x, y } => {
                let position = drag_position(
                    Position::new(x, y),
                    self.offset,
                    note.size,
                    self.toolbar,
                );
                vec![NoteMutation::Update {
                    id: note.id,
                    patch: NotePatch::position(position),
                }]
            }
            InputEvent::PointerUp { .. } => {
                log::debug!("drag end {}", note.id);
                self.stop();
                vec![]
            }
        }
    }

    fn teardown(&mut self) {
        self.stop();
    }
}
