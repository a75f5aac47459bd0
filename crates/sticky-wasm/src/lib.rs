//! WASM bridge for the sticky-notes board.
//!
//! Compiled via `wasm-pack build --target web`. The host page renders notes
//! from `notes_json()` and forwards header/handle presses plus the global
//! `pointermove`/`pointerup` stream; persistence to `localStorage` runs on a
//! `setTimeout` driven by the store's debounce deadline.

#[cfg(target_arch = "wasm32")]
mod logger;
mod storage;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use sticky_core::{BoardConfig, Clock, NoteColor, NoteId, NotePatch, ResizeDirection, Viewport};
use gloo_timers::callback::Timeout;
use sticky_editor::{Board, PointerEvent};
use storage::LocalStorage;
use wasm_bindgen::prelude::*;

/// Wall-clock time from `Date.now()`.
struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

struct Inner {
    board: Board<LocalStorage>,
    /// The armed flush timer, if any. Dropping it cancels the timeout.
    timer: Option<Timeout>,
    this: Weak<RefCell<Inner>>,
}

impl Inner {
    /// Arm the flush timer for the store's next deadline.
    ///
    /// An already-armed timer is left alone: when it fires early (the write
    /// was pushed back by later edits) `flush` re-arms for the new deadline.
    fn arm(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let Some(deadline) = self.board.next_deadline() else {
            return;
        };
        let delay = (deadline - JsClock.now_ms()).clamp(0, i64::from(i32::MAX)) as u32;
        let this = self.this.clone();
        self.timer = Some(Timeout::new(delay, move || {
            if let Some(inner) = this.upgrade() {
                inner.borrow_mut().flush();
            }
        }));
    }

    fn disarm(&mut self) {
        self.timer = None;
    }

    fn flush(&mut self) {
        let fired = self.timer.take();
        // Failures are already logged by the store; the board stays usable.
        let _ = self.board.poll();
        self.arm();
        // The running timeout is released last.
        drop(fired);
    }
}

/// The JS-facing board.
///
/// Note ids cross the boundary as strings; positions and sizes are integer
/// CSS pixels. Ids the board never handed out are ignored.
#[wasm_bindgen]
pub struct StickyBoard {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl StickyBoard {
    /// A board with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::build(BoardConfig::default())
    }

    /// A board configured from JSON (camelCase `BoardConfig` fields). Invalid
    /// JSON falls back to the defaults.
    pub fn with_config(json: &str) -> Self {
        let config = BoardConfig::from_json(json).unwrap_or_else(|err| {
            log::warn!("invalid board config, using defaults: {err}");
            BoardConfig::default()
        });
        Self::build(config)
    }

    fn build(config: BoardConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        logger::init();

        let board = Board::with_config(LocalStorage::open(), config, JsClock);
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                board,
                timer: None,
                this: this.clone(),
            })
        });
        Self { inner }
    }

    /// Run `f` against the board, then re-arm the flush timer.
    fn with_board<R>(&self, f: impl FnOnce(&mut Board<LocalStorage>) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        let result = f(&mut inner.board);
        inner.arm();
        result
    }

    /// Read persisted notes. Returns `true` once the board is loaded.
    pub fn load(&mut self) -> bool {
        self.with_board(|board| {
            board.load();
            board.is_loaded()
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().board.is_loaded()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().board.is_empty()
    }

    /// All notes as a JSON array, in storage order.
    pub fn notes_json(&self) -> String {
        serde_json::to_string(self.inner.borrow().board.notes())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// One note as JSON, or empty string if unknown.
    pub fn note_json(&self, id: &str) -> String {
        let inner = self.inner.borrow();
        note_id(id)
            .and_then(|id| inner.board.note(id))
            .and_then(|note| serde_json::to_string(note).ok())
            .unwrap_or_default()
    }

    /// First non-empty line of a note's text, for minimized headers.
    pub fn summary(&self, id: &str) -> String {
        let inner = self.inner.borrow();
        note_id(id)
            .and_then(|id| inner.board.note(id))
            .map(|note| sticky_core::first_line(&note.text))
            .unwrap_or_default()
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    pub fn selected_color(&self) -> String {
        self.inner.borrow().board.selected_color().to_string()
    }

    /// Set the color for new notes. Returns `false` for unknown names.
    pub fn set_selected_color(&mut self, name: &str) -> bool {
        match name.parse::<NoteColor>() {
            Ok(color) => {
                self.inner.borrow_mut().board.set_selected_color(color);
                true
            }
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// Create a note centred in the viewport. Returns the new id.
    pub fn create_note(&mut self, viewport_width: i32, viewport_height: i32) -> String {
        let viewport = Viewport {
            width: viewport_width,
            height: viewport_height,
        };
        self.with_board(|board| board.create_note(viewport).to_string())
    }

    // ─── Note actions ────────────────────────────────────────────────────

    pub fn update_text(&mut self, id: &str, text: &str) {
        let Some(id) = note_id(id) else {
            return;
        };
        self.with_board(|board| board.update_note(id, NotePatch::text(text)));
    }

    /// Change a note's color. Returns `false` for unknown notes or colors.
    pub fn set_color(&mut self, id: &str, name: &str) -> bool {
        let Ok(color) = name.parse::<NoteColor>() else {
            log::warn!("unknown note color: {name:?}");
            return false;
        };
        let Some(id) = note_id(id) else {
            return false;
        };
        self.with_board(|board| board.update_note(id, NotePatch::color(color)));
        true
    }

    /// Apply a JSON `NotePatch` (camelCase fields, all optional).
    pub fn update_note(&mut self, id: &str, patch_json: &str) -> bool {
        let (Some(id), Some(patch)) = (note_id(id), parse_patch(patch_json)) else {
            return false;
        };
        self.with_board(|board| board.update_note(id, patch));
        true
    }

    pub fn toggle_minimized(&mut self, id: &str) {
        if let Some(id) = note_id(id) {
            self.with_board(|board| board.toggle_minimized(id));
        }
    }

    pub fn bring_to_front(&mut self, id: &str) {
        if let Some(id) = note_id(id) {
            self.with_board(|board| board.bring_to_front(id));
        }
    }

    pub fn delete_note(&mut self, id: &str) {
        if let Some(id) = note_id(id) {
            self.with_board(|board| board.delete_note(id));
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Press on a note header. Returns `true` if the press was claimed; the
    /// host should then call `preventDefault()` and `stopPropagation()`.
    pub fn drag_start(&mut self, id: &str, x: i32, y: i32) -> bool {
        let Some(id) = note_id(id) else {
            return false;
        };
        let mut event = PointerEvent::new(x, y);
        self.with_board(|board| board.drag_start(id, &mut event))
            && event.default_prevented()
    }

    /// Press on a resize handle (`n`, `s`, `e`, `w`, `ne`, `nw`, `se`, `sw`).
    pub fn resize_start(&mut self, id: &str, x: i32, y: i32, direction: &str) -> bool {
        let Ok(direction) = direction.parse::<ResizeDirection>() else {
            log::warn!("unknown resize direction: {direction:?}");
            return false;
        };
        let Some(id) = note_id(id) else {
            return false;
        };
        let mut event = PointerEvent::new(x, y);
        self.with_board(|board| board.resize_start(id, &mut event, direction))
            && event.default_prevented()
    }

    /// Global pointer move. Returns `true` if any note changed.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        self.with_board(|board| board.pointer_move(x, y))
    }

    /// Global pointer release.
    pub fn pointer_up(&mut self, x: i32, y: i32) -> bool {
        self.with_board(|board| board.pointer_up(x, y))
    }

    pub fn is_interacting(&self) -> bool {
        self.inner.borrow().board.is_interacting()
    }

    /// Release every listener and cancel the pending write. Nothing is
    /// written afterwards.
    pub fn teardown(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.disarm();
        inner.board.teardown();
    }
}

impl Default for StickyBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StickyBoard {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.disarm();
            inner.board.teardown();
        }
    }
}

// ─── Standalone helpers (no board needed) ────────────────────────────────

/// Summary line for arbitrary text.
#[wasm_bindgen]
pub fn first_line(text: &str) -> String {
    sticky_core::first_line(text)
}

/// Palette names in toolbar order, as a JSON array.
#[wasm_bindgen]
pub fn note_colors() -> String {
    serde_json::to_string(&NoteColor::ALL).unwrap_or_else(|_| "[]".to_string())
}

/// Resolve a note id coming from JS. Strings the board never handed out are
/// not interned.
fn note_id(id: &str) -> Option<NoteId> {
    let found = NoteId::lookup(id);
    if found.is_none() {
        log::debug!("unknown note id {id:?}");
    }
    found
}

fn parse_patch(json: &str) -> Option<NotePatch> {
    match serde_json::from_str(json) {
        Ok(patch) => Some(patch),
        Err(err) => {
            log::warn!("invalid note patch: {err}");
            None
        }
    }
}
