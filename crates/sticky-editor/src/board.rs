//! Board orchestrator.
//!
//! The board is the single owner of the note collection. It reads and
//! writes notes through a `PersistentStore`, keeps the stacking counter,
//! and routes pointer events to the per-note drag/resize controllers:
//!
//! - A gesture starts with `drag_start` / `resize_start` on one note.
//! - Global `pointer_move` / `pointer_up` events go only to controllers with
//!   a live stream subscription. Each controller receives the note as it is
//!   stored at that moment, and its mutations are applied before the next
//!   controller (or event) runs.
//! - Every applied mutation refreshes `updated_at` and schedules a debounced
//!   write; `poll()` performs the write once the window has passed.

use crate::controller::Controller;
use crate::drag::DragController;
use crate::input::{InputEvent, PointerEvent};
use crate::pointer::PointerHub;
use crate::resize::ResizeController;
use std::collections::HashMap;
use std::rc::Rc;
use sticky_core::geometry::spawn_position;
use sticky_core::store::{LoadOutcome, PersistentStore, StorageBackend, StoreError};
use sticky_core::{
    BoardConfig, Clock, Note, NoteColor, NoteId, NotePatch, ResizeDirection, SystemClock,
    Viewport, create_note_at,
};

/// A change to the note collection, produced by controllers or user intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteMutation {
    Update { id: NoteId, patch: NotePatch },
    BringToFront { id: NoteId },
    Delete { id: NoteId },
}

/// The drag and resize controllers of one note.
struct NoteControllers {
    drag: DragController,
    resize: ResizeController,
}

impl NoteControllers {
    fn new(config: &BoardConfig) -> Self {
        Self {
            drag: DragController::new(config.toolbar),
            resize: ResizeController::new(config.min_size, config.max_size),
        }
    }

    fn is_active(&self) -> bool {
        self.drag.is_active() || self.resize.is_active()
    }

    fn handle(&mut self, event: &InputEvent, note: &Note) -> Vec<NoteMutation> {
        let mut mutations = self.drag.handle(event, note);
        mutations.extend(self.resize.handle(event, note));
        mutations
    }

    fn teardown(&mut self) {
        self.drag.teardown();
        self.resize.teardown();
    }
}

pub struct Board<B> {
    store: PersistentStore<Vec<Note>, B>,
    config: BoardConfig,
    clock: Rc<dyn Clock>,
    /// Highest z-index handed out so far.
    max_z: i32,
    selected_color: NoteColor,
    hub: PointerHub,
    controllers: HashMap<NoteId, NoteControllers>,
}

impl<B: StorageBackend> Board<B> {
    /// A board with the default config and the system clock.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, BoardConfig::default(), SystemClock)
    }

    pub fn with_config(backend: B, config: BoardConfig, clock: impl Clock + 'static) -> Self {
        let clock: Rc<dyn Clock> = Rc::new(clock);
        let store = PersistentStore::new(
            config.storage_key.clone(),
            Vec::new(),
            backend,
            clock.clone(),
            config.debounce_ms,
        );
        Self {
            store,
            config,
            clock,
            max_z: 1,
            selected_color: NoteColor::default(),
            hub: PointerHub::new(),
            controllers: HashMap::new(),
        }
    }

    /// Load persisted notes and seed the stacking counter from them.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = self.store.load();
        self.max_z = self
            .notes()
            .iter()
            .map(|n| n.z_index)
            .max()
            .unwrap_or(1)
            .max(1);
        log::info!(
            "board loaded {} note(s), max z-index {}",
            self.notes().len(),
            self.max_z
        );
        outcome
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn notes(&self) -> &[Note] {
        self.store.value()
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes().iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }

    pub fn max_z_index(&self) -> i32 {
        self.max_z
    }

    pub fn selected_color(&self) -> NoteColor {
        self.selected_color
    }

    pub fn set_selected_color(&mut self, color: NoteColor) {
        self.selected_color = color;
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn hub(&self) -> &PointerHub {
        &self.hub
    }

    pub fn store(&self) -> &PersistentStore<Vec<Note>, B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentStore<Vec<Note>, B> {
        &mut self.store
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// Create a note in the middle of `viewport` with the selected color,
    /// stacked above every existing note.
    pub fn create_note(&mut self, viewport: Viewport) -> NoteId {
        self.max_z = self.max_z.saturating_add(1);
        let position = spawn_position(viewport, self.config.default_size, self.config.toolbar);
        let mut note = create_note_at(
            position,
            self.selected_color,
            self.max_z,
            self.clock.now_ms(),
        );
        note.size = self.config.default_size;
        let id = note.id;
        log::debug!("create {id} at {position:?} z {}", self.max_z);
        self.store.modify(|notes| notes.push(note));
        id
    }

    /// Merge `patch` into the note. Unknown ids are ignored.
    ///
    /// An explicit `z_index` lifts the stacking counter with it, so a later
    /// `bring_to_front` still lands on top.
    pub fn update_note(&mut self, id: NoteId, patch: NotePatch) {
        if self.note(id).is_none() {
            log::trace!("update ignored: no note {id}");
            return;
        }
        if let Some(z) = patch.z_index {
            self.max_z = self.max_z.max(z);
        }
        let now = self.clock.now_ms();
        self.store.modify(|notes| {
            if let Some(note) = notes.iter_mut().find(|n| n.id == id) {
                note.apply_patch(patch, now);
            }
        });
    }

    /// Remove the note. Unknown ids are ignored.
    pub fn delete_note(&mut self, id: NoteId) {
        if self.note(id).is_none() {
            return;
        }
        if let Some(mut controllers) = self.controllers.remove(&id) {
            controllers.teardown();
        }
        log::debug!("delete {id}");
        self.store.modify(|notes| notes.retain(|n| n.id != id));
    }

    /// Stack the note above every other note. Unknown ids are ignored.
    pub fn bring_to_front(&mut self, id: NoteId) {
        if self.note(id).is_none() {
            return;
        }
        self.max_z = self.max_z.saturating_add(1);
        let z = self.max_z;
        self.update_note(id, NotePatch::z_index(z));
    }

    /// Flip the minimized flag, keeping the expanded size.
    pub fn toggle_minimized(&mut self, id: NoteId) {
        if let Some(minimized) = self.note(id).map(|n| n.is_minimized) {
            self.update_note(id, NotePatch::minimized(!minimized));
        }
    }

    pub fn apply_mutation(&mut self, mutation: NoteMutation) {
        match mutation {
            NoteMutation::Update { id, patch } => self.update_note(id, patch),
            NoteMutation::BringToFront { id } => self.bring_to_front(id),
            NoteMutation::Delete { id } => self.delete_note(id),
        }
    }

    fn apply_mutations(&mut self, mutations: Vec<NoteMutation>) -> bool {
        let changed = !mutations.is_empty();
        for mutation in mutations {
            self.apply_mutation(mutation);
        }
        changed
    }

    // ─── Pointer routing ─────────────────────────────────────────────────

    /// Start dragging the note from a press on its header, ending any resize
    /// of the same note. Returns `false` (leaving the event untouched) for
    /// unknown ids.
    pub fn drag_start(&mut self, id: NoteId, event: &mut PointerEvent) -> bool {
        let Some(note) = self.note(id).cloned() else {
            return false;
        };
        let controllers = self
            .controllers
            .entry(id)
            .or_insert_with(|| NoteControllers::new(&self.config));
        controllers.resize.teardown();
        let mutations = controllers.drag.start_drag(event, &note, &self.hub);
        self.apply_mutations(mutations);
        true
    }

    /// Start resizing the note from one of its handles, ending any drag of
    /// the same note.
    ///
    /// Minimized notes have no resize handles; a press on one is refused
    /// like a press on an unknown note.
    pub fn resize_start(
        &mut self,
        id: NoteId,
        event: &mut PointerEvent,
        direction: ResizeDirection,
    ) -> bool {
        let Some(note) = self.note(id).cloned() else {
            return false;
        };
        if note.is_minimized {
            log::debug!("resize refused: {id} is minimized");
            return false;
        }
        let controllers = self
            .controllers
            .entry(id)
            .or_insert_with(|| NoteControllers::new(&self.config));
        controllers.drag.teardown();
        let mutations = controllers
            .resize
            .start_resize(event, direction, &note, &self.hub);
        self.apply_mutations(mutations);
        true
    }

    /// Global pointer move. Returns `true` if any note changed.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        self.dispatch(InputEvent::PointerMove { x, y })
    }

    /// Global pointer release. Ends every gesture in progress.
    pub fn pointer_up(&mut self, x: i32, y: i32) -> bool {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    /// Whether any drag or resize is in progress.
    pub fn is_interacting(&self) -> bool {
        self.controllers.values().any(NoteControllers::is_active)
    }

    fn dispatch(&mut self, event: InputEvent) -> bool {
        let active: Vec<NoteId> = self
            .controllers
            .iter()
            .filter(|(_, c)| c.is_active())
            .map(|(id, _)| *id)
            .collect();

        let mut changed = false;
        for id in active {
            let Some(note) = self.note(id).cloned() else {
                // The note went away mid-gesture.
                if let Some(mut controllers) = self.controllers.remove(&id) {
                    controllers.teardown();
                }
                continue;
            };
            let mutations = match self.controllers.get_mut(&id) {
                Some(controllers) => controllers.handle(&event, &note),
                None => continue,
            };
            changed |= self.apply_mutations(mutations);
        }
        changed
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Run the debounced write if it is due.
    pub fn poll(&mut self) -> Option<Result<(), StoreError>> {
        self.store.poll()
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.store.next_deadline()
    }

    /// Release every pointer subscription and cancel the pending write.
    pub fn teardown(&mut self) {
        for controllers in self.controllers.values_mut() {
            controllers.teardown();
        }
        self.controllers.clear();
        self.store.teardown();
    }
}
