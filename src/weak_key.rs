//! Pointer-identity wrapper used as the storage key of the weak containers.
//!
//! Identity is the address of the `Rc` allocation. The `Weak` held here keeps
//! that allocation reserved even after the value is dropped, so an address
//! cannot be reused by another `Rc` while the entry is still stored.

use core::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

pub(crate) struct WeakKey<K: ?Sized>(Weak<K>);

impl<K: ?Sized> WeakKey<K> {
    pub(crate) fn new(rc: &Rc<K>) -> Self {
        WeakKey(Rc::downgrade(rc))
    }

    fn addr(&self) -> usize {
        Weak::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<K: ?Sized> Hash for WeakKey<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<K: ?Sized> PartialEq for WeakKey<K> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<K: ?Sized> Eq for WeakKey<K> {}

const MIN_SWEEP_THRESHOLD: usize = 16;

/// Decides when `set`/`add` should sweep dead entries.
///
/// After each sweep the next one is scheduled at twice the surviving size,
/// so sweeping stays amortized O(1) per insertion.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SweepSchedule {
    threshold: usize,
}

impl SweepSchedule {
    pub(crate) fn new() -> Self {
        Self {
            threshold: MIN_SWEEP_THRESHOLD,
        }
    }

    pub(crate) fn due(&self, stored: usize) -> bool {
        stored >= self.threshold
    }

    pub(crate) fn reschedule(&mut self, live: usize) {
        self.threshold = live.saturating_mul(2).max(MIN_SWEEP_THRESHOLD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<K: ?Sized>(k: &WeakKey<K>) -> u64 {
        let mut h = DefaultHasher::new();
        k.hash(&mut h);
        h.finish()
    }

    /// Invariant: identity is the allocation, not the value.
    #[test]
    fn equal_values_in_distinct_allocations_differ() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(WeakKey::new(&a) == WeakKey::new(&a.clone()));
        assert!(WeakKey::new(&a) != WeakKey::new(&b));
    }

    /// Invariant: a key's hash and equality survive the referent being dropped.
    #[test]
    fn dead_key_keeps_identity() {
        let a = Rc::new(String::from("x"));
        let k1 = WeakKey::new(&a);
        let k2 = WeakKey::new(&a);
        let before = hash_of(&k1);
        drop(a);
        assert!(!k1.is_live());
        assert_eq!(hash_of(&k1), before);
        assert!(k1 == k2);
    }

    #[test]
    fn unsized_referents() {
        let s: Rc<str> = Rc::from("abc");
        let k = WeakKey::new(&s);
        assert!(k.is_live());
        assert!(k == WeakKey::new(&s));
    }

    #[test]
    fn schedule_doubles_with_live_size() {
        let mut s = SweepSchedule::new();
        assert!(!s.due(15));
        assert!(s.due(16));
        s.reschedule(3);
        assert!(s.due(16));
        s.reschedule(40);
        assert!(!s.due(79));
        assert!(s.due(80));
    }
}
