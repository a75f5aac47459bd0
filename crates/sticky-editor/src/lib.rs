pub mod board;
pub mod controller;
pub mod drag;
pub mod input;
pub mod pointer;
pub mod resize;

pub use board::{Board, NoteMutation};
pub use controller::{Controller, ControllerKind};
pub use drag::DragController;
pub use input::{InputEvent, PointerEvent};
pub use pointer::{PointerHub, Subscription};
pub use resize::ResizeController;
