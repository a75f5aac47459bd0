//! `localStorage` backend.
//!
//! Browsers without storage (private modes, sandboxed iframes) still get a
//! working board; reads and writes simply fail with `Unavailable`.

use sticky_core::{StorageBackend, StorageError};
use wasm_bindgen::{JsCast, JsValue};

pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, notes will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))
    }
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(classify)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(classify)
    }
}

fn classify(err: JsValue) -> StorageError {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(e) if e.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
        Some(e) => StorageError::Unavailable(format!("{}: {}", e.name(), e.message())),
        None => StorageError::Unavailable(format!("{err:?}")),
    }
}
