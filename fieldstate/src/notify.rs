//! Notification hub.
//!
//! A per-context registry of subscriber callbacks. Each registration gets its
//! own [`SubscriptionId`], so the same closure subscribed twice is two
//! independent subscriptions.
//!
//! # Invariants
//!
//! 1. Subscribers are called in registration order.
//! 2. `dispatch` works on a copy of the registry taken when it starts:
//!    subscribers added during a dispatch are not called by it, and
//!    subscribers removed during a dispatch are still called by it.
//! 3. Callbacks may re-enter the owning context (including `update`); no
//!    registry borrow is held while a callback runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::patch::Delta;

/// Callback invoked with the delta of each successful, non-empty update.
pub type Callback = Rc<dyn Fn(&Delta)>;

/// Identifies one registration in a [`NotificationHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Callback)>>,
}

impl Registry {
    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Subscriber registry owned by a single context.
#[derive(Default)]
pub struct NotificationHub {
    registry: Rc<Registry>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Keep the returned handle to remove it later;
    /// dropping the handle leaves the callback registered.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Delta) + 'static,
    {
        let id = SubscriptionId(self.registry.next_id.get());
        self.registry.next_id.set(id.0 + 1);
        self.registry
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));
        trace!(id = id.0, "subscriber added");
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of active registrations.
    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every subscriber once with `delta`. Empty deltas are not sent.
    pub fn dispatch(&self, delta: &Delta) {
        if delta.is_empty() {
            return;
        }
        let callbacks: Vec<Callback> = self
            .registry
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        trace!(
            subscribers = callbacks.len(),
            changed = delta.len(),
            "dispatching delta"
        );
        for callback in callbacks {
            callback(delta);
        }
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`; removes exactly its own registration.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove this registration. Returns `false` when it was already removed
    /// or the hub no longer exists.
    pub fn unsubscribe(&self) -> bool {
        let removed = self
            .registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id));
        if removed {
            trace!(id = self.id.0, "subscriber removed");
        }
        removed
    }

    /// Whether this registration is still in the hub.
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .entries
                .borrow()
                .iter()
                .any(|(id, _)| *id == self.id)
        })
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
