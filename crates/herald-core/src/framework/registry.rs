//! Ordered, copy-on-write registries.
//!
//! [`Registry`] backs both the listener registry and the command registry.
//! Entries keep their insertion order, duplicates are allowed, and membership
//! is decided by pointer identity rather than by value.
//!
//! # Snapshots
//!
//! The entry list lives behind an `Arc`. Readers take a cheap [`shared`]
//! handle and iterate without holding the lock; writers clone the list only
//! when a reader still holds the previous version. Registering or
//! unregistering while a dispatch is iterating is therefore safe and never
//! affects the iteration already in progress.
//!
//! [`shared`]: Registry::shared

use std::sync::Arc;

use parking_lot::RwLock;

/// Identity key of a registry entry: the address of the shared allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(usize);

impl EntryKey {
    /// Returns the key of the value behind `arc`.
    pub fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
        Self(Arc::as_ptr(arc) as *const () as usize)
    }
}

/// Values that can be compared by identity inside a [`Registry`].
pub trait Identity {
    /// Returns the identity key of this value.
    fn identity(&self) -> EntryKey;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn identity(&self) -> EntryKey {
        EntryKey::of(self)
    }
}

/// An ordered collection of registered entries.
pub struct Registry<T> {
    entries: RwLock<Arc<Vec<T>>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }
}

impl<T: Identity + Clone> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Always succeeds, even if the entry is already present.
    pub fn register(&self, item: T) {
        Arc::make_mut(&mut *self.entries.write()).push(item);
    }

    /// Removes the first entry with the same identity as `item`.
    ///
    /// Only one occurrence is removed when an entry was registered several
    /// times. Returns `false` if nothing matched.
    pub fn unregister(&self, item: &impl Identity) -> bool {
        let key = item.identity();
        let mut entries = self.entries.write();
        match entries.iter().position(|entry| entry.identity() == key) {
            Some(index) => {
                Arc::make_mut(&mut *entries).remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if an entry with the same identity as `item` is registered.
    pub fn contains(&self, item: &impl Identity) -> bool {
        let key = item.identity();
        self.entries.read().iter().any(|entry| entry.identity() == key)
    }

    /// Returns an independent copy of the current membership list.
    ///
    /// Later registrations do not affect the returned list. The entries
    /// themselves are shared, not deep-copied.
    pub fn snapshot(&self) -> Vec<T> {
        Vec::clone(&self.entries.read())
    }

    /// Returns the current list without copying it.
    pub fn shared(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.entries.read())
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        *self.entries.write() = Arc::new(Vec::new());
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.entries.read().len())
            .finish()
    }
}
