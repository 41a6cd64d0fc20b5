//! OrderedMap: insertion-ordered map with normalization hooks, emplace and
//! functional transforms.

use crate::emplace::Emplace;
use crate::error::{Error, Result};
use crate::hooks::NormalizationHooks;
use crate::linked_table::{self, Handle, LinkedTable};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::RandomState;
use tracing::{debug, trace};

/// Insertion-ordered key/value map.
///
/// Re-setting an existing key keeps its position; deleting and re-inserting
/// moves it to the end. Keys and values pass through the optional
/// [`NormalizationHooks`] on `get`/`has`/`set`/`delete`/`emplace`.
///
/// Transforms (`map`, `filter`, `partition`, ...) build new maps that share
/// the hasher but not the hooks: their entries are already canonical.
pub struct OrderedMap<K, V, S = RandomState> {
    table: LinkedTable<K, V, S>,
    hooks: NormalizationHooks<K, V>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_hooks(hooks: NormalizationHooks<K, V>) -> Self {
        Self::with_hasher_and_hooks(RandomState::new(), hooks)
    }

    /// Build from pairs, applying `hooks` to each pair exactly as `set` does.
    pub fn from_entries<I>(entries: I, hooks: NormalizationHooks<K, V>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hooks(hooks);
        for (k, v) in entries {
            map.set(k, v)?;
        }
        Ok(map)
    }

    /// Build from arbitrary items, turning each into a pair with `f(item, index)`.
    pub fn from_iter_with<I, F>(items: I, mut f: F) -> Self
    where
        I: IntoIterator,
        F: FnMut(I::Item, usize) -> (K, V),
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect()
    }

    pub fn of<const N: usize>(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }

    /// Each item under `key_fn(item)`; a later item replaces an earlier one
    /// with the same key.
    pub fn key_by<I, F>(items: I, mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> K,
    {
        let mut map = Self::new();
        for item in items {
            map.table.insert(key_fn(&item), item);
        }
        map
    }
}

impl<K, T> OrderedMap<K, Vec<T>>
where
    K: Eq + Hash,
{
    /// Items grouped under `key_fn(item)`, keys in first-seen order and
    /// items in arrival order within each group.
    pub fn group_by<I, F>(items: I, mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> K,
    {
        let mut groups = Self::new();
        for item in items {
            let key = key_fn(&item);
            match groups.table.get_mut(&key) {
                Some(group) => group.push(item),
                None => {
                    groups.table.insert(key, vec![item]);
                }
            }
        }
        groups
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_hooks(hasher, NormalizationHooks::new())
    }

    pub fn with_hasher_and_hooks(hasher: S, hooks: NormalizationHooks<K, V>) -> Self {
        Self {
            table: LinkedTable::with_hasher(hasher),
            hooks,
        }
    }

    pub fn hooks(&self) -> &NormalizationHooks<K, V> {
        &self.hooks
    }

    /// An empty, hookless map sharing this map's hasher.
    fn sibling<K2, V2>(&self) -> OrderedMap<K2, V2, S>
    where
        K2: Eq + Hash,
    {
        OrderedMap::with_hasher(self.table.hasher().clone())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Handle of the entry `key` names. Without a key hook the borrowed form
    /// is probed directly; with one, an owned copy is canonicalized first.
    fn locate<Q>(&self, key: &Q) -> Result<Option<Handle>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        if !self.hooks.has_key_hook() {
            return Ok(self.table.find(key));
        }
        let key = self.hooks.owned_key(key.to_owned())?;
        Ok(self.table.find::<K>(&key))
    }

    pub fn get<Q>(&self, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        Ok(self.locate(key)?.and_then(|h| self.table.value(h)))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<Option<&mut V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        let handle = self.locate(key)?;
        Ok(handle.and_then(|h| self.table.value_mut(h)))
    }

    pub fn has<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        Ok(self.locate(key)?.is_some())
    }

    /// Insert or overwrite. Both hooks run before storage is touched, so a
    /// failing hook leaves the map unchanged.
    pub fn set(&mut self, key: K, value: V) -> Result<&mut Self> {
        let key = self.hooks.owned_key(key)?;
        let value = self.hooks.owned_value(value)?;
        self.table.insert(key, value);
        Ok(self)
    }

    pub fn delete<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        let handle = self.locate(key)?;
        Ok(handle.and_then(|h| self.table.remove(h)).is_some())
    }

    /// Delete every given key and report whether all of them were present.
    /// An empty key list clears the map.
    pub fn delete_all<'k, Q, I>(&mut self, keys: I) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K> + 'k,
        I: IntoIterator<Item = &'k Q>,
    {
        let mut keys = keys.into_iter().peekable();
        if keys.peek().is_none() {
            self.clear();
            return Ok(true);
        }
        let mut all = true;
        for key in keys {
            all &= self.delete(key)?;
        }
        Ok(all)
    }

    /// Insert-or-update. Calls `update(current, key, self)` when the key is
    /// present and an update handler exists, `insert(key, self)` otherwise,
    /// then stores the result as `set` would and returns it.
    pub fn emplace(&mut self, key: K, handler: Emplace<'_, K, V, Self>) -> Result<&mut V> {
        let Emplace { insert, update } = handler;
        if insert.is_none() && update.is_none() {
            debug!("emplace called without handlers");
            return Err(Error::MissingHandler);
        }
        let key = self.hooks.owned_key(key)?;
        let current = self.table.get(&key);
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
        let (handle, _) = self.table.insert(key, value);
        Ok(self
            .table
            .value_mut(handle)
            .expect("entry must exist immediately after insert"))
    }

    /// `set` every pair of every source in order; later pairs win.
    pub fn merge<I, J>(&mut self, sources: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = (K, V)>,
    {
        for source in sources {
            for (k, v) in source {
                self.set(k, v)?;
            }
        }
        Ok(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.table.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.table.iter().map(|(_, v)| v)
    }

    /// New map with every value replaced by `f(value, key, self)`.
    pub fn map<U, F>(&self, mut f: F) -> OrderedMap<K, U, S>
    where
        K: Clone,
        F: FnMut(&V, &K, &Self) -> U,
    {
        let mut out = self.sibling();
        for (k, v) in self.table.iter() {
            out.table.insert(k.clone(), f(v, k, self));
        }
        out
    }

    /// New map with every key replaced by `f(value, key, self)`. When two
    /// entries map to the same key the later one wins.
    pub fn map_keys<J, F>(&self, mut f: F) -> OrderedMap<J, V, S>
    where
        J: Eq + Hash,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> J,
    {
        let mut out = self.sibling();
        for (k, v) in self.table.iter() {
            out.table.insert(f(v, k, self), v.clone());
        }
        out
    }

    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> bool,
    {
        let mut out = self.sibling();
        for (k, v) in self.table.iter() {
            if pred(v, k, self) {
                out.table.insert(k.clone(), v.clone());
            }
        }
        out
    }

    pub fn filter_out<F>(&self, mut pred: F) -> Self
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> bool,
    {
        self.filter(|v, k, m| !pred(v, k, m))
    }

    /// `(passed, failed)`: every entry lands in exactly one of the two.
    pub fn partition<F>(&self, mut pred: F) -> (Self, Self)
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> bool,
    {
        let mut passed = self.sibling();
        let mut failed = self.sibling();
        for (k, v) in self.table.iter() {
            let side = if pred(v, k, self) { &mut passed } else { &mut failed };
            side.table.insert(k.clone(), v.clone());
        }
        (passed, failed)
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&V>
    where
        F: FnMut(&V, &K, &Self) -> bool,
    {
        self.table.iter().find(|&(k, v)| pred(v, k, self)).map(|(_, v)| v)
    }

    pub fn find_key<F>(&self, mut pred: F) -> Option<&K>
    where
        F: FnMut(&V, &K, &Self) -> bool,
    {
        self.table.iter().find(|&(k, v)| pred(v, k, self)).map(|(k, _)| k)
    }

    pub fn includes(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// First key whose value equals `value`.
    pub fn key_of(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.table.iter().find(|&(_, v)| v == value).map(|(k, _)| k)
    }

    pub fn every<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&V, &K, &Self) -> bool,
    {
        self.table.iter().all(|(k, v)| pred(v, k, self))
    }

    pub fn some<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&V, &K, &Self) -> bool,
    {
        self.table.iter().any(|(k, v)| pred(v, k, self))
    }

    /// Left fold seeded by the first value, which is not passed to `f`.
    pub fn reduce<F>(&self, mut f: F) -> Result<V>
    where
        V: Clone,
        F: FnMut(V, &V, &K, &Self) -> V,
    {
        let mut it = self.table.iter();
        let (_, seed) = it.next().ok_or(Error::EmptyReduce)?;
        Ok(it.fold(seed.clone(), |acc, (k, v)| f(acc, v, k, self)))
    }

    /// Left fold from `initial`; an empty map returns `initial` unchanged.
    pub fn fold<T, F>(&self, initial: T, mut f: F) -> T
    where
        F: FnMut(T, &V, &K, &Self) -> T,
    {
        self.table.iter().fold(initial, |acc, (k, v)| f(acc, v, k, self))
    }

    /// Sort ascending by value.
    pub fn sort(&mut self) -> &mut Self
    where
        V: Ord,
    {
        self.sort_by(|a, b, _, _| a.cmp(b))
    }

    /// Reorder with `cmp(value_a, value_b, key_a, key_b)`; the sort is stable.
    /// Handles are sorted while the table is intact and only then relinked,
    /// so a panicking comparator leaves every entry in its old position.
    pub fn sort_by<F>(&mut self, mut cmp: F) -> &mut Self
    where
        F: FnMut(&V, &V, &K, &K) -> Ordering,
    {
        let mut order: Vec<(Handle, &K, &V)> = self.table.iter_handles().collect();
        order.sort_by(|&(_, ka, va), &(_, kb, vb)| cmp(va, vb, ka, kb));
        let order: Vec<Handle> = order.into_iter().map(|(h, _, _)| h).collect();
        trace!(len = order.len(), "relinking ordered map after sort");
        self.table.relink(&order);
        self
    }

    /// New map keeping, for each distinct `resolver(value)`, the first entry
    /// in iteration order.
    pub fn unique_by<R, F>(&self, mut resolver: F) -> Self
    where
        K: Clone,
        V: Clone,
        R: Eq + Hash,
        F: FnMut(&V) -> R,
    {
        let mut seen: LinkedTable<R, (), S> = LinkedTable::with_hasher(self.table.hasher().clone());
        let mut out = self.sibling();
        for (k, v) in self.table.iter() {
            if let (_, None) = seen.insert(resolver(v), ()) {
                out.table.insert(k.clone(), v.clone());
            }
        }
        out
    }

    /// New map keeping the first entry for each distinct value; the retained
    /// key is the one `key_of(value)` reports.
    pub fn unique(&self) -> Self
    where
        K: Clone,
        V: Clone + Eq + Hash,
    {
        self.unique_by(V::clone)
    }

    /// Entry at `index`; negative indices count from the end.
    pub fn at(&self, index: isize) -> Option<(&K, &V)> {
        let len = self.len() as isize;
        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return None;
        }
        self.table.get_index(index as usize)
    }

    pub fn first(&self) -> Option<&V> {
        self.table.first().map(|(_, v)| v)
    }

    pub fn first_key(&self) -> Option<&K> {
        self.table.first().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&V> {
        self.table.last().map(|(_, v)| v)
    }

    pub fn last_key(&self) -> Option<&K> {
        self.table.last().map(|(k, _)| k)
    }

    pub fn sample_one(&self) -> Option<&V> {
        self.sample_one_with(&mut rand::thread_rng())
    }

    pub fn sample_one_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&V> {
        if self.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.len());
        self.table.get_index(i).map(|(_, v)| v)
    }

    /// `n` values drawn independently with replacement. Empty when the map is.
    pub fn sample_many(&self, n: usize) -> Vec<&V> {
        self.sample_many_with(n, &mut rand::thread_rng())
    }

    pub fn sample_many_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&V> {
        let pool: Vec<&V> = self.values().collect();
        (0..n).filter_map(|_| pool.choose(&mut *rng).copied()).collect()
    }

    pub fn sample_key(&self) -> Option<&K> {
        self.sample_key_with(&mut rand::thread_rng())
    }

    pub fn sample_key_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&K> {
        if self.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.len());
        self.table.get_index(i).map(|(k, _)| k)
    }

    pub fn sample_keys(&self, n: usize) -> Vec<&K> {
        self.sample_keys_with(n, &mut rand::thread_rng())
    }

    pub fn sample_keys_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&K> {
        let pool: Vec<&K> = self.keys().collect();
        (0..n).filter_map(|_| pool.choose(&mut *rng).copied()).collect()
    }

    pub fn to_array(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.values().cloned().collect()
    }

    pub fn to_key_array(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }
}

/// Borrowing iterator over `(key, value)` in insertion order.
pub struct Iter<'a, K, V> {
    inner: linked_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for OrderedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = linked_table::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

/// Collects without hooks; a later duplicate key overwrites in place.
impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Raw insertion; hooks are not applied.
impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.table.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        Self::of(entries)
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for OrderedMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.table.iter()).finish()
    }
}

/// Same entries, regardless of order.
impl<K, V, S> PartialEq for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher + Clone + Default,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .table
                .iter()
                .all(|(k, v)| other.table.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher + Clone + Default,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> OrderedMap<&'static str, i32> {
        OrderedMap::of([("a", 1), ("b", 2), ("c", 3)])
    }

    #[test]
    fn set_and_get() {
        let mut m = OrderedMap::new();
        m.set("x", 1).unwrap().set("y", 2).unwrap();
        assert_eq!(m.get(&"x").unwrap(), Some(&1));
        assert_eq!(m.get(&"z").unwrap(), None);
        assert!(m.has(&"y").unwrap());
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn emplace_insert_then_update() {
        let mut m: OrderedMap<&str, i32> = OrderedMap::new();
        for expected in 1..=3 {
            let stored = m
                .emplace("hits", Emplace::insert(|_, _| 1).and_update(|v: &i32, _, _| v + 1))
                .unwrap();
            assert_eq!(*stored, expected);
        }
        assert_eq!(m.get(&"hits").unwrap(), Some(&3));
    }

    #[test]
    fn emplace_passes_normalized_key_and_self() {
        let hooks = NormalizationHooks::new().coerce_key(|k: &String| k.to_lowercase());
        let mut m: OrderedMap<String, usize> = OrderedMap::with_hooks(hooks);
        m.set("A".to_string(), 0).unwrap();
        let v = m
            .emplace(
                "B".to_string(),
                Emplace::insert(|k: &String, map: &OrderedMap<String, usize>| {
                    assert_eq!(k, "b");
                    map.len()
                }),
            )
            .unwrap();
        assert_eq!(*v, 1);
        assert_eq!(m.to_key_array(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn emplace_shape_errors() {
        let mut m: OrderedMap<&str, i32> = OrderedMap::new();
        assert!(matches!(m.emplace("k", Emplace::new()), Err(Error::MissingHandler)));
        assert!(matches!(
            m.emplace("k", Emplace::update(|v: &i32, _, _| *v)),
            Err(Error::MissingInsert)
        ));
        assert!(m.is_empty());
        m.set("k", 5).unwrap();
        assert!(matches!(m.emplace("k", Emplace::new()), Err(Error::MissingHandler)));
    }

    #[test]
    fn emplace_insert_only_overwrites_present_key() {
        let mut m = abc();
        assert_eq!(*m.emplace("b", Emplace::insert(|_, _| 20)).unwrap(), 20);
        assert_eq!(m.to_array(), vec![1, 20, 3]);
    }

    #[test]
    fn at_handles_negative_and_out_of_range() {
        let m = abc();
        assert_eq!(m.at(0), Some((&"a", &1)));
        assert_eq!(m.at(-1), Some((&"c", &3)));
        assert_eq!(m.at(-3), Some((&"a", &1)));
        assert_eq!(m.at(-4), None);
        assert_eq!(m.at(5), None);
        assert_eq!(m.first(), Some(&1));
        assert_eq!(m.last_key(), Some(&"c"));
    }

    #[test]
    fn reduce_and_fold() {
        let m = abc();
        assert_eq!(m.reduce(|acc, v, _, _| acc + v).unwrap(), 6);
        assert_eq!(m.fold(String::new(), |acc, _, k, _| acc + *k), "abc");
        let empty: OrderedMap<&str, i32> = OrderedMap::new();
        assert!(matches!(empty.reduce(|a, v, _, _| a + v), Err(Error::EmptyReduce)));
        assert_eq!(empty.fold(0, |a, v, _, _| a + v), 0);
    }

    /// Invariant: `unique` keeps the entry `key_of` would report.
    #[test]
    fn unique_keeps_first_entry_per_value() {
        let m = OrderedMap::of([("a", 1), ("b", 2), ("c", 1), ("d", 2), ("e", 3)]);
        let u = m.unique();
        assert_eq!(u.to_key_array(), vec!["a", "b", "e"]);
        for v in u.values() {
            assert_eq!(u.key_of(v), m.key_of(v));
        }
        let by_parity = m.unique_by(|v| v % 2);
        assert_eq!(by_parity.to_key_array(), vec!["a", "b"]);
    }

    #[test]
    fn group_by_collects_in_arrival_order() {
        let g = OrderedMap::group_by(["apple", "avocado", "banana", "blueberry", "cherry"], |s| {
            s.chars().next()
        });
        assert_eq!(g.to_key_array(), vec![Some('a'), Some('b'), Some('c')]);
        assert_eq!(g.get(&Some('b')).unwrap(), Some(&vec!["banana", "blueberry"]));
    }

    #[test]
    fn sort_default_and_by_key() {
        let mut m = OrderedMap::of([("b", 3), ("a", 1), ("c", 2)]);
        m.sort();
        assert_eq!(m.to_key_array(), vec!["a", "c", "b"]);
        m.sort_by(|_, _, ka, kb| kb.cmp(ka));
        assert_eq!(m.to_key_array(), vec!["c", "b", "a"]);
        m.set("d", 0).unwrap();
        assert_eq!(m.last_key(), Some(&"d"));
    }
}
