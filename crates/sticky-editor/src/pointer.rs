//! Scoped subscriptions to the global pointer stream.
//!
//! A controller holds a `Subscription` exactly while its gesture is in
//! progress. Dropping the guard unsubscribes, so no controller state change
//! can leave a listener behind. `PointerHub::active_count` exposes the
//! number of live listeners.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    active: BTreeSet<u64>,
}

/// Registry of live pointer-stream listeners. Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    state: Rc<RefCell<HubState>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.active.insert(id);
        log::trace!("pointer stream: +listener {id} ({} live)", state.active.len());
        Subscription {
            id,
            hub: Rc::downgrade(&self.state),
        }
    }

    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.state.borrow().active.contains(&subscription.id)
    }
}

/// RAII guard for one pointer-stream listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    hub: Weak<RefCell<HubState>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            let mut state = state.borrow_mut();
            state.active.remove(&self.id);
            log::trace!(
                "pointer stream: -listener {} ({} live)",
                self.id,
                state.active.len()
            );
        }
    }
}
