//! Publisher/subscriber events.
//!
//! Replaces the observable/listener binding from the reactive UI world with an
//! explicit subscription interface: a publisher holds a set of subscriber
//! callbacks, notifies them on every publish, and supports unsubscribing via
//! a guard that is also honoured on drop.

use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Box<dyn Fn(&T) + Send + 'static>;

struct Registry<T> {
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// A simple multi-subscriber event slot.
///
/// Callbacks run on the publishing thread, in subscription order, while the
/// subscriber list lock is held; callbacks must not subscribe or unsubscribe
/// on the same publisher re-entrantly.
pub struct Publisher<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Publisher<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a callback; the returned guard unsubscribes when dropped
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.push((id, Box::new(callback)));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
                    registry.subscribers.retain(|(sub_id, _)| *sub_id != id);
                }
            })),
        }
    }

    /// Notify every live subscriber
    pub fn publish(&self, value: &T) {
        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        for (_, callback) in &registry.subscribers {
            callback(value);
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .len()
    }
}

/// Guard for a registered subscriber; dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Explicitly remove the subscriber
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
