//! Debounced persistent store.
//!
//! `PersistentStore` holds one serializable value in memory and mirrors it
//! to a `StorageBackend` under a single key:
//!
//! - **Load**: `load()` reads the key once. A missing key keeps the initial
//!   value; unreadable content is logged and also keeps the initial value.
//!   Until `load()` has run the store never touches the backend, so the
//!   initial value can never overwrite persisted data that was not read yet.
//!
//! - **Write**: every change after load (re)schedules a `DeferredTask` one
//!   debounce window in the future. A newer change replaces the pending task,
//!   so bursts of updates coalesce into a single write of the latest value.
//!   The host calls `poll()` (typically from a timer armed at
//!   `next_deadline()`) to run the task once it is due.
//!
//! - **Failure**: write errors are logged and dropped. The in-memory value
//!   stays authoritative and the next change tries again.

use crate::clock::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────

/// Failure reported by a storage medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to deserialize stored value: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::Storage(StorageError::QuotaExceeded))
    }
}

// ─── Backends ────────────────────────────────────────────────────────────

/// A string key-value medium (browser `localStorage`, a file, memory).
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory backend with an optional byte quota and a write log.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
    writes: Vec<(String, String)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` (not counted as a write).
    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    /// Reject writes whose value is longer than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every read and write fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> &[(String, String)] {
        &self.writes
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(StorageError::QuotaExceeded);
        }
        self.items.insert(key.to_string(), value.to_string());
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// A scheduled write. Identified by a per-store sequence number so hosts can
/// tell a rescheduled task from the one they armed a timer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTask {
    pub id: u64,
    /// Due time in milliseconds (same time base as the store's clock).
    pub due_at: i64,
}

/// What `load()` found in the backend.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing stored under the key; the initial value stays.
    Empty,
    /// The stored value replaced the initial value.
    Restored,
    /// The stored value was unreadable; the initial value stays.
    Recovered(StoreError),
    /// `load()` had already run.
    AlreadyLoaded,
}

pub struct PersistentStore<T, B> {
    key: String,
    value: T,
    loaded: bool,
    torn_down: bool,
    backend: B,
    clock: Rc<dyn Clock>,
    debounce_ms: i64,
    pending: Option<DeferredTask>,
    next_task_id: u64,
}

impl<T, B> PersistentStore<T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend,
{
    pub fn new(
        key: impl Into<String>,
        initial: T,
        backend: B,
        clock: Rc<dyn Clock>,
        debounce_ms: i64,
    ) -> Self {
        Self {
            key: key.into(),
            value: initial,
            loaded: false,
            torn_down: false,
            backend,
            clock,
            debounce_ms,
            pending: None,
            next_task_id: 0,
        }
    }

    /// Read the persisted value, once.
    ///
    /// The store counts as loaded afterwards whatever the outcome, and a write
    /// of the resulting value is scheduled (which also replaces unreadable
    /// content with the initial value).
    pub fn load(&mut self) -> LoadOutcome {
        if self.loaded {
            return LoadOutcome::AlreadyLoaded;
        }

        let outcome = match self.backend.get_item(&self.key) {
            Ok(None) => LoadOutcome::Empty,
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.value = value;
                    LoadOutcome::Restored
                }
                Err(e) => {
                    let err = StoreError::Deserialize(e);
                    log::error!("error loading {:?} from storage: {err}", self.key);
                    LoadOutcome::Recovered(err)
                }
            },
            Err(e) => {
                let err = StoreError::Storage(e);
                log::error!("error loading {:?} from storage: {err}", self.key);
                LoadOutcome::Recovered(err)
            }
        };

        self.loaded = true;
        log::debug!("store {:?} loaded: {outcome:?}", self.key);
        self.schedule_write();
        outcome
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        self.schedule_write();
    }

    /// Derive the new value from the current one.
    pub fn update_value(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value);
        self.set_value(next);
    }

    /// Mutate the value in place. Counts as a change like `set_value`.
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.schedule_write();
    }

    pub fn pending_task(&self) -> Option<DeferredTask> {
        self.pending
    }

    /// Due time of the pending write, if any.
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.map(|task| task.due_at)
    }

    /// Run the pending write if it is due.
    ///
    /// Returns `None` when nothing ran, otherwise the write result (already
    /// logged on failure).
    pub fn poll(&mut self) -> Option<Result<(), StoreError>> {
        let task = self.pending?;
        if self.clock.now_ms() < task.due_at {
            return None;
        }
        self.pending = None;
        log::trace!("store {:?}: running write #{}", self.key, task.id);
        Some(self.write().inspect_err(|err| self.report(err)))
    }

    /// Cancel any pending write and stop scheduling new ones.
    pub fn teardown(&mut self) {
        if let Some(task) = self.pending.take() {
            log::debug!("store {:?}: cancelled write #{}", self.key, task.id);
        }
        self.torn_down = true;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn schedule_write(&mut self) {
        if !self.loaded || self.torn_down {
            return;
        }
        self.next_task_id += 1;
        let task = DeferredTask {
            id: self.next_task_id,
            due_at: self.clock.now_ms() + self.debounce_ms,
        };
        if let Some(prev) = self.pending.replace(task) {
            log::trace!(
                "store {:?}: write #{} superseded by #{}",
                self.key,
                prev.id,
                task.id
            );
        }
    }

    fn write(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.value).map_err(StoreError::Serialize)?;
        self.backend.set_item(&self.key, &json)?;
        Ok(())
    }

    fn report(&self, err: &StoreError) {
        log::error!("error saving {:?} to storage: {err}", self.key);
        if err.is_quota_exceeded() {
            log::warn!("storage quota exceeded. Consider clearing old notes.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;

    const KEY: &str = "sticky-notes";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn store_with(
        backend: MemoryStorage,
        clock: &ManualClock,
    ) -> PersistentStore<Vec<String>, MemoryStorage> {
        init_logging();
        PersistentStore::new(KEY, Vec::new(), backend, Rc::new(clock.clone()), 300)
    }

    #[test]
    fn empty_backend_keeps_initial_value() {
        let clock = ManualClock::new(0);
        let mut store = store_with(MemoryStorage::new(), &clock);
        assert!(!store.is_loaded());
        assert!(matches!(store.load(), LoadOutcome::Empty));
        assert!(store.is_loaded());
        assert!(store.value().is_empty());
    }

    #[test]
    fn restores_persisted_value() {
        let clock = ManualClock::new(0);
        let backend = MemoryStorage::new().with_item(KEY, r#"["a","b"]"#);
        let mut store = store_with(backend, &clock);
        assert!(matches!(store.load(), LoadOutcome::Restored));
        assert_eq!(store.value(), &vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(store.load(), LoadOutcome::AlreadyLoaded));
    }

    #[test]
    fn malformed_content_falls_back_and_is_replaced() {
        let clock = ManualClock::new(0);
        let backend = MemoryStorage::new().with_item(KEY, "{not json");
        let mut store = store_with(backend, &clock);
        assert!(matches!(
            store.load(),
            LoadOutcome::Recovered(StoreError::Deserialize(_))
        ));
        assert!(store.is_loaded());
        assert!(store.value().is_empty());

        clock.advance(300);
        assert!(matches!(store.poll(), Some(Ok(()))));
        assert_eq!(store.backend().item(KEY), Some("[]"));
    }

    #[test]
    fn unavailable_backend_still_loads() {
        let clock = ManualClock::new(0);
        let mut backend = MemoryStorage::new();
        backend.set_unavailable(true);
        let mut store = store_with(backend, &clock);
        assert!(matches!(
            store.load(),
            LoadOutcome::Recovered(StoreError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(store.is_loaded());

        store.set_value(vec!["kept".into()]);
        clock.advance(300);
        assert!(matches!(store.poll(), Some(Err(StoreError::Storage(_)))));
        assert_eq!(store.value(), &vec!["kept".to_string()]);
    }

    #[test]
    fn no_write_before_load() {
        let clock = ManualClock::new(0);
        let backend = MemoryStorage::new().with_item(KEY, r#"["persisted"]"#);
        let mut store = store_with(backend, &clock);

        store.set_value(vec!["early".into()]);
        assert_eq!(store.value(), &vec!["early".to_string()]);
        assert_eq!(store.pending_task(), None);

        clock.advance(10_000);
        assert!(store.poll().is_none());
        assert!(store.backend().writes().is_empty());
        assert_eq!(store.backend().item(KEY), Some(r#"["persisted"]"#));
    }

    #[test]
    fn burst_of_updates_coalesces_into_one_write() {
        let clock = ManualClock::new(1_000);
        let mut store = store_with(MemoryStorage::new(), &clock);
        store.load();

        store.set_value(vec!["one".into()]);
        clock.advance(100);
        store.update_value(|prev| {
            let mut next = prev.clone();
            next.push("two".into());
            next
        });
        clock.advance(100);
        store.modify(|v| v.push("three".into()));

        clock.advance(299);
        assert!(store.poll().is_none(), "window restarts on every change");

        clock.advance(1);
        assert!(matches!(store.poll(), Some(Ok(()))));
        assert!(store.poll().is_none());

        let writes = store.backend().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, r#"["one","two","three"]"#);
    }

    #[test]
    fn rescheduling_replaces_task() {
        let clock = ManualClock::new(0);
        let mut store = store_with(MemoryStorage::new(), &clock);
        store.load();
        let first = store.pending_task().unwrap();
        clock.advance(50);
        store.set_value(vec![]);
        let second = store.pending_task().unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.due_at, 350);
        assert_eq!(store.next_deadline(), Some(350));
    }

    #[test]
    fn quota_failure_is_reported_and_not_retried() {
        let clock = ManualClock::new(0);
        let mut store = store_with(MemoryStorage::new().with_quota(8), &clock);
        store.load();
        store.set_value(vec!["much too long for the quota".into()]);
        clock.advance(300);

        let result = store.poll().unwrap();
        assert!(result.unwrap_err().is_quota_exceeded());
        assert_eq!(store.pending_task(), None);
        assert!(store.backend().writes().is_empty());

        // The next change tries again.
        store.set_value(vec![]);
        clock.advance(300);
        assert!(matches!(store.poll(), Some(Ok(()))));
        assert_eq!(store.backend().item(KEY), Some("[]"));
    }

    #[test]
    fn teardown_cancels_pending_write() {
        let clock = ManualClock::new(0);
        let mut store = store_with(MemoryStorage::new(), &clock);
        store.load();
        store.set_value(vec!["unsaved".into()]);
        store.teardown();
        assert_eq!(store.next_deadline(), None);

        store.set_value(vec!["after".into()]);
        clock.advance(1_000);
        assert!(store.poll().is_none());
        assert!(store.backend().writes().is_empty());
    }
}
