//! Resize controller: eight directional handles.
//!
//! Geometry is recomputed on every move from the note as it is *now* and
//! the absolute pointer position; nothing is accumulated between events.
//! See `sticky_core::geometry::resize_geometry` for the per-handle formulas.

use crate::board::NoteMutation;
use crate::controller::{Controller, ControllerKind};
use crate::input::{InputEvent, PointerEvent};
use crate::pointer::{PointerHub, Subscription};
use sticky_core::geometry::resize_geometry;
use sticky_core::{MAX_NOTE_SIZE, MIN_NOTE_SIZE, Note, NotePatch, Position, ResizeDirection, Size};

pub struct ResizeController {
    direction: Option<ResizeDirection>,
    min: Size,
    max: Size,
    subscription: Option<Subscription>,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(MIN_NOTE_SIZE, MAX_NOTE_SIZE)
    }
}

impl ResizeController {
    pub fn new(min: Size, max: Size) -> Self {
        Self {
            direction: None,
            min,
            max,
            subscription: None,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.direction.is_some()
    }

    pub fn direction(&self) -> Option<ResizeDirection> {
        self.direction
    }

    /// Begin resizing `note` from the handle for `direction`.
    pub fn start_resize(
        &mut self,
        event: &mut PointerEvent,
        direction: ResizeDirection,
        note: &Note,
        hub: &PointerHub,
    ) -> Vec<NoteMutation> {
        event.claim();

        self.direction = Some(direction);
        self.subscription = None;
        self.subscription = Some(hub.subscribe());
        log::debug!("resize start {} ({direction})", note.id);

        vec![NoteMutation::BringToFront { id: note.id }]
    }

    fn stop(&mut self) {
        self.direction = None;
        self.subscription = None;
    }
}

impl Controller for ResizeController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Resize
    }

    fn is_active(&self) -> bool {
        self.is_resizing()
    }

    fn handle(&mut self, event: &InputEvent, note: &Note) -> Vec<NoteMutation> {
        let Some(direction) = self.direction else {
            return vec![];
        };
        match *event {
            InputEvent::PointerMove { x, y } => {
                let (size, position) = resize_geometry(
                    direction,
                    note.bounds(),
                    Position::new(x, y),
                    self.min,
                    self.max,
                );
                vec![NoteMutation::Update {
                    id: note.id,
                    patch: NotePatch::geometry(size, position),
                }]
            }
            InputEvent::PointerUp { .. } => {
                log::debug!("resize end {}", note.id);
                self.stop();
                vec![]
            }
        }
    }

    fn teardown(&mut self) {
        self.stop();
    }
}
