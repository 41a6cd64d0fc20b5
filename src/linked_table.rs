//! LinkedTable: structural layer with insertion-ordered entries and a debug
//! reentrancy guard.
//!
//! Entries live in a `SlotMap` and are indexed by a `hashbrown::HashTable`
//! of slot keys. Each entry stores its precomputed hash together with
//! `prev`/`next` links, so iteration follows insertion order and removal
//! unlinks in O(1) without shifting anything.

use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Stable reference to a live entry. Becomes stale once the entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub struct LinkedTable<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    reentrancy: DebugReentrancy,
}

impl<K, V> LinkedTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for LinkedTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for LinkedTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        // Slot keys survive a SlotMap clone, so the index and links stay valid.
        Self {
            hasher: self.hasher.clone(),
            index: self.index.clone(),
            slots: self.slots.clone(),
            head: self.head,
            tail: self.tail,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> LinkedTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("find");
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .map(|&k| Handle(k))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.value(h)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.value_mut(h)
    }

    /// Insert or overwrite. An existing key keeps both its stored key and its
    /// position; the previous value is returned. New keys are linked at the tail.
    pub fn insert(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let _g = self.reentrancy.enter("insert");
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|e| e.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let k = *o.get();
                let entry = self
                    .slots
                    .get_mut(k)
                    .expect("indexed slot must be live");
                let old = core::mem::replace(&mut entry.value, value);
                (Handle(k), Some(old))
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let prev = self.tail;
                let k = self.slots.insert(Entry {
                    key,
                    value,
                    hash,
                    prev,
                    next: None,
                });
                let _ = v.insert(k);
                match prev {
                    Some(p) => self.slots[p].next = Some(k),
                    None => self.head = Some(k),
                }
                self.tail = Some(k);
                (Handle(k), None)
            }
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let _g = self.reentrancy.enter("remove");
        let k = handle.0;
        let entry = self.slots.remove(k)?;

        match entry.prev {
            Some(p) => self.slots[p].next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next {
            Some(n) => self.slots[n].prev = entry.prev,
            None => self.tail = entry.prev,
        }

        let _ = self
            .index
            .find_entry(entry.hash, |&kk| kk == k)
            .map(|occupied| occupied.remove());

        Some((entry.key, entry.value))
    }

    pub fn remove_key<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.remove(h)
    }

    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// Drop every entry for which `keep` returns false, preserving the order
    /// of the survivors.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<Handle> = self
            .iter_handles()
            .filter(|&(_, k, v)| !keep(k, v))
            .map(|(h, _, _)| h)
            .collect();
        for h in doomed {
            let _ = self.remove(h);
        }
    }

    pub fn key(&self, h: Handle) -> Option<&K> {
        self.slots.get(h.0).map(|e| &e.key)
    }

    pub fn value(&self, h: Handle) -> Option<&V> {
        self.slots.get(h.0).map(|e| &e.value)
    }

    pub fn value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.slots.get_mut(h.0).map(|e| &mut e.value)
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.head.and_then(|k| self.slots.get(k)).map(|e| (&e.key, &e.value))
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.tail.and_then(|k| self.slots.get(k)).map(|e| (&e.key, &e.value))
    }

    /// Positional lookup; walks from whichever end is closer.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let len = self.len();
        if index >= len {
            return None;
        }
        if index <= len / 2 {
            self.iter().nth(index)
        } else {
            self.iter().nth_back(len - 1 - index)
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            front: self.head,
            back: self.tail,
            remaining: self.slots.len(),
        }
    }

    pub(crate) fn iter_handles(&self) -> impl Iterator<Item = (Handle, &K, &V)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let k = cursor?;
            let e = self.slots.get(k)?;
            cursor = e.next;
            Some((Handle(k), &e.key, &e.value))
        })
    }

    /// Rewrite the links so iteration follows `order`, which must name every
    /// live entry exactly once. Slots, hashes and the index stay put, so
    /// handles remain valid.
    pub(crate) fn relink(&mut self, order: &[Handle]) {
        let _g = self.reentrancy.enter("relink");
        debug_assert_eq!(order.len(), self.slots.len());
        let mut prev: Option<DefaultKey> = None;
        for &Handle(k) in order {
            let entry = &mut self.slots[k];
            entry.prev = prev;
            entry.next = None;
            if let Some(p) = prev {
                self.slots[p].next = Some(k);
            }
            prev = Some(k);
        }
        self.head = order.first().map(|h| h.0);
        self.tail = prev;
    }
}

impl<K, V, S> IntoIterator for LinkedTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots,
            cursor: self.head,
        }
    }
}

/// Borrowing iterator in insertion order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let e = self.slots.get(self.front?)?;
        self.front = e.next;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let e = self.slots.get(self.back?)?;
        self.back = e.prev;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// Owning iterator in insertion order.
pub struct IntoIter<K, V> {
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    cursor: Option<DefaultKey>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.slots.remove(self.cursor?)?;
        self.cursor = e.next;
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
