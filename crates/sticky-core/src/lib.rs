pub mod clock;
pub mod config;
pub mod factory;
pub mod geometry;
pub mod id;
pub mod model;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BoardConfig;
pub use factory::{create_note, create_note_at};
pub use geometry::{ResizeDirection, clamp_position, clamp_size, first_line};
pub use id::NoteId;
pub use model::*;
pub use store::{
    LoadOutcome, MemoryStorage, PersistentStore, StorageBackend, StorageError, StoreError,
};
