//! Handler for insert-or-update.
//!
//! Either half may be missing; `emplace` rejects a handler with neither,
//! and rejects an update-only handler when the key is absent.

use core::fmt;

type InsertFn<'a, K, V, M> = Box<dyn FnOnce(&K, &M) -> V + 'a>;
type UpdateFn<'a, K, V, M> = Box<dyn FnOnce(&V, &K, &M) -> V + 'a>;

/// Insert and/or update callbacks for `emplace` on a container of type `M`.
///
/// `insert` receives the normalized key and the container; `update` also
/// receives the current value. The returned value is stored exactly as
/// `set` would store it.
pub struct Emplace<'a, K, V, M: ?Sized> {
    pub(crate) insert: Option<InsertFn<'a, K, V, M>>,
    pub(crate) update: Option<UpdateFn<'a, K, V, M>>,
}

impl<'a, K, V, M: ?Sized> Emplace<'a, K, V, M> {
    /// A handler with no callbacks. Passing it to `emplace` fails.
    pub fn new() -> Self {
        Self {
            insert: None,
            update: None,
        }
    }

    pub fn insert<F>(f: F) -> Self
    where
        F: FnOnce(&K, &M) -> V + 'a,
    {
        Self::new().or_insert(f)
    }

    pub fn update<F>(f: F) -> Self
    where
        F: FnOnce(&V, &K, &M) -> V + 'a,
    {
        Self::new().and_update(f)
    }

    pub fn or_insert<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&K, &M) -> V + 'a,
    {
        self.insert = Some(Box::new(f));
        self
    }

    pub fn and_update<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&V, &K, &M) -> V + 'a,
    {
        self.update = Some(Box::new(f));
        self
    }

    pub fn has_insert(&self) -> bool {
        self.insert.is_some()
    }

    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }
}

impl<K, V, M: ?Sized> Default for Emplace<'_, K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, M: ?Sized> fmt::Debug for Emplace<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emplace")
            .field("insert", &self.has_insert())
            .field("update", &self.has_update())
            .finish()
    }
}
