//! Structural predicates for telling collection kinds apart, including
//! collections this crate did not create.

use crate::{OrderedMap, OrderedSet, WeakKeyMap, WeakValueSet};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Map,
    Set,
    WeakMap,
    WeakSet,
}

/// A collection that can report which of the four shapes it has.
pub trait Collection {
    fn shape(&self) -> Shape;
}

pub fn is_map<C: Collection + ?Sized>(c: &C) -> bool {
    c.shape() == Shape::Map
}

pub fn is_set<C: Collection + ?Sized>(c: &C) -> bool {
    c.shape() == Shape::Set
}

pub fn is_weak_map<C: Collection + ?Sized>(c: &C) -> bool {
    c.shape() == Shape::WeakMap
}

pub fn is_weak_set<C: Collection + ?Sized>(c: &C) -> bool {
    c.shape() == Shape::WeakSet
}

impl<K, V, S> Collection for OrderedMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::Map
    }
}

impl<K, V, S> Collection for HashMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::Map
    }
}

impl<K, V> Collection for BTreeMap<K, V> {
    fn shape(&self) -> Shape {
        Shape::Map
    }
}

impl<K, V, S> Collection for hashbrown::HashMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::Map
    }
}

impl<T, S> Collection for OrderedSet<T, S> {
    fn shape(&self) -> Shape {
        Shape::Set
    }
}

impl<T, S> Collection for HashSet<T, S> {
    fn shape(&self) -> Shape {
        Shape::Set
    }
}

impl<T> Collection for BTreeSet<T> {
    fn shape(&self) -> Shape {
        Shape::Set
    }
}

impl<T, S> Collection for hashbrown::HashSet<T, S> {
    fn shape(&self) -> Shape {
        Shape::Set
    }
}

impl<K: ?Sized, V> Collection for WeakKeyMap<K, V> {
    fn shape(&self) -> Shape {
        Shape::WeakMap
    }
}

impl<T: ?Sized> Collection for WeakValueSet<T> {
    fn shape(&self) -> Shape {
        Shape::WeakSet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_collections() {
        assert!(is_map(&HashMap::<u8, u8>::new()));
        assert!(is_map(&BTreeMap::<u8, u8>::new()));
        assert!(is_set(&HashSet::<u8>::new()));
        assert!(is_set(&hashbrown::HashSet::<u8>::new()));
        assert!(!is_set(&BTreeMap::<u8, u8>::new()));
    }

    #[test]
    fn trait_objects() {
        let all: Vec<Box<dyn Collection>> = vec![
            Box::new(OrderedMap::<u8, u8>::new()),
            Box::new(OrderedSet::<u8>::new()),
            Box::new(WeakKeyMap::<str, u8>::new()),
            Box::new(WeakValueSet::<u8>::new()),
        ];
        let shapes: Vec<Shape> = all.iter().map(|c| c.shape()).collect();
        assert_eq!(shapes, [Shape::Map, Shape::Set, Shape::WeakMap, Shape::WeakSet]);
        assert!(is_weak_map(all[2].as_ref()));
        assert!(is_weak_set(&*all[3]));
        assert!(!is_weak_map(&*all[0]));
    }
}
