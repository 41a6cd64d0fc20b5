//! WeakKeyMap: a map keyed by `Rc` allocations that does not keep its keys
//! alive.
//!
//! Keys are compared by identity. An entry whose key has been dropped can no
//! longer be named by any caller, so it is invisible; its value is released
//! by the next sweep, either explicit (`purge`) or triggered by growth in
//! `set`/`emplace`. There is no length or iteration, since both would expose
//! sweep timing.

use crate::emplace::Emplace;
use crate::error::{Error, Result};
use crate::hooks::NormalizationHooks;
use crate::linked_table::LinkedTable;
use crate::weak_key::{SweepSchedule, WeakKey};
use core::fmt;
use std::rc::Rc;
use tracing::debug;

pub struct WeakKeyMap<K: ?Sized, V> {
    table: LinkedTable<WeakKey<K>, V>,
    hooks: NormalizationHooks<Rc<K>, V>,
    sweep: SweepSchedule,
}

impl<K: ?Sized, V> WeakKeyMap<K, V> {
    pub fn new() -> Self {
        Self::with_hooks(NormalizationHooks::new())
    }

    pub fn with_hooks(hooks: NormalizationHooks<Rc<K>, V>) -> Self {
        Self {
            table: LinkedTable::new(),
            hooks,
            sweep: SweepSchedule::new(),
        }
    }

    /// Build from pairs, applying hooks exactly as `set` does.
    pub fn from_entries<I>(entries: I, hooks: NormalizationHooks<Rc<K>, V>) -> Result<Self>
    where
        I: IntoIterator<Item = (Rc<K>, V)>,
    {
        let mut map = Self::with_hooks(hooks);
        for (k, v) in entries {
            map.set(k, v)?;
        }
        Ok(map)
    }

    pub fn from_iter_with<I, F>(items: I, mut f: F) -> Self
    where
        I: IntoIterator,
        F: FnMut(I::Item, usize) -> (Rc<K>, V),
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect()
    }

    pub fn of<const N: usize>(entries: [(Rc<K>, V); N]) -> Self {
        entries.into_iter().collect()
    }

    pub fn get(&self, key: &Rc<K>) -> Result<Option<&V>> {
        let key = self.hooks.key(key)?;
        Ok(self.table.get(&WeakKey::new(&*key)))
    }

    pub fn get_mut(&mut self, key: &Rc<K>) -> Result<Option<&mut V>> {
        let key = self.hooks.key(key)?;
        Ok(self.table.get_mut(&WeakKey::new(&*key)))
    }

    pub fn has(&self, key: &Rc<K>) -> Result<bool> {
        let key = self.hooks.key(key)?;
        Ok(self.table.contains_key(&WeakKey::new(&*key)))
    }

    /// Insert or overwrite without taking a strong reference to `key`.
    pub fn set(&mut self, key: Rc<K>, value: V) -> Result<&mut Self> {
        let key = self.hooks.owned_key(key)?;
        let value = self.hooks.owned_value(value)?;
        self.sweep_if_due();
        self.table.insert(WeakKey::new(&key), value);
        Ok(self)
    }

    pub fn delete(&mut self, key: &Rc<K>) -> Result<bool> {
        let key = self.hooks.key(key)?;
        Ok(self.table.remove_key(&WeakKey::new(&*key)).is_some())
    }

    /// Delete every given key and report whether all of them were present.
    /// An empty key list drops every entry.
    pub fn delete_all<'k, I>(&mut self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'k Rc<K>>,
        K: 'k,
    {
        let mut keys = keys.into_iter().peekable();
        if keys.peek().is_none() {
            self.table.clear();
            self.sweep.reschedule(0);
            return Ok(true);
        }
        let mut all = true;
        for key in keys {
            all &= self.delete(key)?;
        }
        Ok(all)
    }

    /// Insert-or-update with the same contract as `OrderedMap::emplace`.
    pub fn emplace(&mut self, key: Rc<K>, handler: Emplace<'_, Rc<K>, V, Self>) -> Result<&mut V> {
        let Emplace { insert, update } = handler;
        if insert.is_none() && update.is_none() {
            debug!("emplace called without handlers");
            return Err(Error::MissingHandler);
        }
        let key = self.hooks.owned_key(key)?;
        let slot = WeakKey::new(&key);
        let current = self.table.get(&slot);
        let value = match (current, update) {
            (Some(current), Some(update)) => update(current, &key, &*self),
            _ => match insert {
                Some(insert) => insert(&key, &*self),
                None => {
                    debug!("emplace found no entry and has no insert handler");
                    return Err(Error::MissingInsert);
                }
            },
        };
        let value = self.hooks.owned_value(value)?;
        self.sweep_if_due();
        let (handle, _) = self.table.insert(slot, value);
        Ok(self
            .table
            .value_mut(handle)
            .expect("entry must exist immediately after insert"))
    }

    /// Drop every entry whose key is gone and return how many were dropped.
    pub fn purge(&mut self) -> usize {
        let before = self.table.len();
        self.table.retain(|k, _| k.is_live());
        let live = self.table.len();
        self.sweep.reschedule(live);
        let reclaimed = before - live;
        debug!(reclaimed, live, "swept weak key map");
        reclaimed
    }

    fn sweep_if_due(&mut self) {
        if self.sweep.due(self.table.len()) {
            self.purge();
        }
    }

    #[cfg(test)]
    pub(crate) fn stored(&self) -> usize {
        self.table.len()
    }
}

/// Collects without hooks.
impl<K: ?Sized, V> FromIterator<(Rc<K>, V)> for WeakKeyMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (Rc<K>, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.sweep_if_due();
            map.table.insert(WeakKey::new(&k), v);
        }
        map
    }
}

impl<K: ?Sized, V> Default for WeakKeyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized, V> fmt::Debug for WeakKeyMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakKeyMap")
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_hold_strong_references() {
        let key = Rc::new("k".to_string());
        let mut m = WeakKeyMap::new();
        m.set(key.clone(), 1).unwrap();
        assert_eq!(Rc::strong_count(&key), 1);
        assert_eq!(m.get(&key).unwrap(), Some(&1));
    }

    #[test]
    fn purge_releases_values_of_dropped_keys() {
        let value = Rc::new(());
        let keep = Rc::new(1);
        let mut m = WeakKeyMap::new();
        m.set(keep.clone(), value.clone()).unwrap();
        m.set(Rc::new(2), value.clone()).unwrap();
        assert_eq!(Rc::strong_count(&value), 3);
        assert_eq!(m.purge(), 1);
        assert_eq!(Rc::strong_count(&value), 2);
        assert_eq!(m.stored(), 1);
        assert!(m.has(&keep).unwrap());
    }

    /// Invariant: storage stays bounded when keys are dropped right after `set`.
    #[test]
    fn set_sweeps_on_growth() {
        let mut m = WeakKeyMap::new();
        for i in 0..1000 {
            m.set(Rc::new(i), i).unwrap();
            assert!(m.stored() <= 16);
        }
    }

    #[test]
    fn key_hook_redirects_to_canonical_allocation() {
        let canonical = Rc::new(0u8);
        let target = canonical.clone();
        let hooks = NormalizationHooks::new().coerce_key(move |_: &Rc<u8>| target.clone());
        let mut m = WeakKeyMap::with_hooks(hooks);
        m.set(Rc::new(7), "a").unwrap();
        assert_eq!(m.get(&canonical).unwrap(), Some(&"a"));
        assert_eq!(m.get(&Rc::new(9)).unwrap(), Some(&"a"));
    }

    #[test]
    fn emplace_counts_per_key() {
        let a = Rc::new(1);
        let mut m: WeakKeyMap<i32, u32> = WeakKeyMap::new();
        for _ in 0..3 {
            m.emplace(
                a.clone(),
                Emplace::insert(|_, _| 1).and_update(|v: &u32, _, _| v + 1),
            )
            .unwrap();
        }
        assert_eq!(m.get(&a).unwrap(), Some(&3));
        let err = m.emplace(Rc::new(2), Emplace::update(|v: &u32, _, _| *v)).unwrap_err();
        assert!(matches!(err, Error::MissingInsert));
    }
}
