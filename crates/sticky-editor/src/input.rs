//! Input abstraction layer.
//!
//! `PointerEvent` is the press that starts a gesture on a note (header or
//! resize handle). `InputEvent` is the document-wide pointer stream a
//! controller listens to while a gesture is in progress.

/// A pointer press delivered to a note element.
///
/// Controllers claim the press by suppressing the default action and
/// stopping propagation; the host reads the flags back and forwards them to
/// the platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Suppress the default action and stop propagation.
    pub fn claim(&mut self) {
        self.prevent_default();
        self.stop_propagation();
    }
}

/// An event from the global (document-level) pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
}

impl InputEvent {
    pub fn position(&self) -> (i32, i32) {
        match self {
            Self::PointerMove { x, y } | Self::PointerUp { x, y } => (*x, *y),
        }
    }
}
