//! Observer registries.
//!
//! An [`ObserverSet`] maps subscription ids to callbacks. Dispatch iterates
//! over a snapshot taken under the lock and invokes callbacks after the lock
//! is released, so a callback may unsubscribe itself or others (or
//! subscribe new observers) while a dispatch is in progress.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    observers: HashMap<u64, Callback<T>>,
}

/// A set of callbacks notified with values of type `T`.
pub struct ObserverSet<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ObserverSet<T> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                observers: HashMap::new(),
            })),
        }
    }

    /// Register a callback.
    ///
    /// The callback stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the subscription does not remove it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.observers.insert(id, Arc::new(callback));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            id,
            remove: Box::new(move || {
                registry
                    .upgrade()
                    .is_some_and(|registry| registry.lock().observers.remove(&id).is_some())
            }),
        }
    }

    /// Invoke every registered callback with `value`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<Callback<T>> = self.registry.lock().observers.values().cloned().collect();
        for callback in &snapshot {
            callback(value);
        }
        snapshot.len()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().observers.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ObserverSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObserverSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.registry.lock().observers.len())
            .finish()
    }
}

/// Handle returned by a subscribe call.
pub struct Subscription {
    id: u64,
    remove: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Subscription {
    /// Id of the subscription within its set.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remove exactly this callback.
    ///
    /// Returns `true` if it was still registered. Calling it again is a no-op.
    pub fn unsubscribe(&self) -> bool {
        (self.remove)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}
