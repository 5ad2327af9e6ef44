//! Process-wide key/value store behind `use_shared_state`.

use crate::collections::map::HashMap;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct StoreInner {
    values: RefCell<HashMap<String, Rc<dyn Any>>>,
    listeners: RefCell<HashMap<String, Vec<(u64, Listener)>>>,
    next_listener: Cell<u64>,
}

/// Shared state keyed by string. Listeners for a key run after every write
/// that changes its value.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Rc<StoreInner>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let values = self.inner.values.borrow();
        let value = values.get(key)?;
        match value.downcast_ref::<T>() {
            Some(value) => Some(value.clone()),
            None => {
                log::warn!(
                    "shared state {key:?} holds a different type than {}",
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.values.borrow().contains_key(key)
    }

    /// Stores `value` under `key` and notifies the key's listeners. Returns
    /// `false` without notifying when the stored value is already equal.
    pub fn set<T: PartialEq + 'static>(&self, key: &str, value: T) -> bool {
        {
            let mut values = self.inner.values.borrow_mut();
            if let Some(existing) = values.get(key).and_then(|v| v.downcast_ref::<T>()) {
                if *existing == value {
                    return false;
                }
            }
            values.insert(key.to_string(), Rc::new(value));
        }
        log::debug!("shared state {key:?} changed");
        self.notify(key);
        true
    }

    /// Like [`set`](Self::set), computing the next value from the current one.
    pub fn update<T: Clone + PartialEq + 'static>(&self, key: &str, f: impl FnOnce(Option<T>) -> T) -> bool {
        let next = f(self.get::<T>(key));
        self.set(key, next)
    }

    fn notify(&self, key: &str) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .get(key)
            .map(|entries| entries.iter().map(|(_, listener)| Rc::clone(listener)).collect())
            .unwrap_or_default();
        log::debug!("notifying {} listener(s) of {key:?}", listeners.len());
        for listener in listeners {
            listener();
        }
    }

    /// Registers `listener` for changes of `key` until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, key: &str, listener: impl Fn() + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push((id, Rc::new(listener)));
        log::debug!("subscribed listener {id} to {key:?}");
        Subscription {
            store: Rc::downgrade(&self.inner),
            key: key.to_string(),
            id,
        }
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(key)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("keys", &self.inner.values.borrow().len())
            .finish()
    }
}

/// Live registration of a store listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let mut listeners = store.listeners.borrow_mut();
        if let Some(entries) = listeners.get_mut(&self.key) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                listeners.remove(&self.key);
            }
        }
        log::debug!("unsubscribed listener {} from {:?}", self.id, self.key);
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
