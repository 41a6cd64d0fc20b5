//! OrderedSet: insertion-ordered set sharing the map's transform vocabulary,
//! plus set algebra.

use crate::error::{Error, Result};
use crate::hooks::{self, Canonical, Coerce};
use crate::linked_table::{self, LinkedTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::RandomState;

/// Insertion-ordered set of unique values.
///
/// The optional coercion hook runs on `add`/`has`/`delete` and on every
/// argument element of the set-algebra methods, which therefore return
/// `Result`. Transforms and set-algebra results are hookless.
pub struct OrderedSet<T, S = RandomState> {
    table: LinkedTable<T, (), S>,
    coerce: Option<Coerce<T>>,
}

impl<T> OrderedSet<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_coercion(coerce: Coerce<T>) -> Self {
        let mut set = Self::new();
        set.coerce = Some(coerce);
        set
    }

    /// Build from values, running each through `coerce` exactly as `add` does.
    pub fn from_values<I>(values: I, coerce: Coerce<T>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::with_coercion(coerce);
        set.add_all(values)?;
        Ok(set)
    }

    /// Build from arbitrary items, turning each into a value with `f(item, index)`.
    pub fn from_iter_with<I, F>(items: I, mut f: F) -> Self
    where
        I: IntoIterator,
        F: FnMut(I::Item, usize) -> T,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect()
    }

    pub fn of<const N: usize>(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, S> OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: LinkedTable::with_hasher(hasher),
            coerce: None,
        }
    }

    fn sibling<U>(&self) -> OrderedSet<U, S>
    where
        U: Eq + Hash,
    {
        OrderedSet::with_hasher(self.table.hasher().clone())
    }

    /// Hookless copy of this set's elements.
    fn plain_copy(&self) -> Self
    where
        T: Clone,
    {
        let mut out = self.sibling();
        out.extend(self.iter().cloned());
        out
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

    /// Raw membership of an already canonical value.
    pub(crate) fn contains(&self, value: &T) -> bool {
        self.table.contains_key(value)
    }

    pub fn has(&self, value: &T) -> Result<bool> {
        let value = hooks::canonical(self.coerce.as_ref(), value)?;
        Ok(self.table.contains_key(&*value))
    }

    /// Adding a present value keeps its original position.
    pub fn add(&mut self, value: T) -> Result<&mut Self> {
        let value = hooks::owned(self.coerce.as_ref(), value)?;
        self.table.insert(value, ());
        Ok(self)
    }

    pub fn add_all<I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(self)
    }

    pub fn delete(&mut self, value: &T) -> Result<bool> {
        let value = hooks::canonical(self.coerce.as_ref(), value)?;
        Ok(self.table.remove_key(&*value).is_some())
    }

    /// Delete every given value and report whether all of them were present.
    /// An empty list clears the set.
    pub fn delete_all<'v, I>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'v T>,
        T: 'v,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            self.clear();
            return Ok(true);
        }
        let mut all = true;
        for value in values {
            all &= self.delete(value)?;
        }
        Ok(all)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    pub fn map<U, F>(&self, mut f: F) -> OrderedSet<U, S>
    where
        U: Eq + Hash,
        F: FnMut(&T, &Self) -> U,
    {
        let mut out = self.sibling();
        for value in self.iter() {
            out.table.insert(f(value, self), ());
        }
        out
    }

    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T, &Self) -> bool,
    {
        let mut out = self.sibling();
        for value in self.iter() {
            if pred(value, self) {
                out.table.insert(value.clone(), ());
            }
        }
        out
    }

    pub fn filter_out<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T, &Self) -> bool,
    {
        self.filter(|v, s| !pred(v, s))
    }

    pub fn partition<F>(&self, mut pred: F) -> (Self, Self)
    where
        T: Clone,
        F: FnMut(&T, &Self) -> bool,
    {
        let mut passed = self.sibling();
        let mut failed = self.sibling();
        for value in self.iter() {
            let side = if pred(value, self) { &mut passed } else { &mut failed };
            side.table.insert(value.clone(), ());
        }
        (passed, failed)
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T, &Self) -> bool,
    {
        self.iter().find(|v| pred(v, self))
    }

    pub fn every<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T, &Self) -> bool,
    {
        self.iter().all(|v| pred(v, self))
    }

    pub fn some<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T, &Self) -> bool,
    {
        self.iter().any(|v| pred(v, self))
    }

    /// Left fold seeded by the first element, which is not passed to `f`.
    pub fn reduce<F>(&self, mut f: F) -> Result<T>
    where
        T: Clone,
        F: FnMut(T, &T, &Self) -> T,
    {
        let mut it = self.iter();
        let seed = it.next().ok_or(Error::EmptyReduce)?;
        Ok(it.fold(seed.clone(), |acc, v| f(acc, v, self)))
    }

    pub fn fold<A, F>(&self, initial: A, mut f: F) -> A
    where
        F: FnMut(A, &T, &Self) -> A,
    {
        self.iter().fold(initial, |acc, v| f(acc, v, self))
    }

    /// Element at `index`; negative indices count from the end.
    pub fn at(&self, index: isize) -> Option<&T> {
        let len = self.len() as isize;
        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return None;
        }
        self.table.get_index(index as usize).map(|(v, _)| v)
    }

    pub fn first(&self) -> Option<&T> {
        self.table.first().map(|(v, _)| v)
    }

    pub fn last(&self) -> Option<&T> {
        self.table.last().map(|(v, _)| v)
    }

    pub fn sample_one(&self) -> Option<&T> {
        self.sample_one_with(&mut rand::thread_rng())
    }

    pub fn sample_one_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.len());
        self.table.get_index(i).map(|(v, _)| v)
    }

    /// `n` elements drawn independently with replacement. Empty when the set is.
    pub fn sample_many(&self, n: usize) -> Vec<&T> {
        self.sample_many_with(n, &mut rand::thread_rng())
    }

    pub fn sample_many_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&T> {
        let pool: Vec<&T> = self.iter().collect();
        (0..n).filter_map(|_| pool.choose(&mut *rng).copied()).collect()
    }

    pub fn to_array(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        use fmt::Write;

        let mut out = String::new();
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            let _ = write!(out, "{value}");
        }
        out
    }

    /// Canonical form of an argument element under this set's hook.
    fn canonical_arg<'a>(&self, value: &'a T) -> Result<Canonical<'a, T>> {
        hooks::canonical(self.coerce.as_ref(), value)
    }

    pub fn union<I>(&self, other: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = self.plain_copy();
        for v in other {
            let v = self.canonical_arg(Borrow::<T>::borrow(&v))?;
            out.table.insert(v.into_owned(), ());
        }
        Ok(out)
    }

    /// Elements of `other` that are also in `self`, in `other`'s order. The
    /// result holds this set's stored elements.
    pub fn intersection<I>(&self, other: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = self.sibling();
        for v in other {
            let v = self.canonical_arg(Borrow::<T>::borrow(&v))?;
            if let Some(stored) = self.table.find(&*v).and_then(|h| self.table.key(h)) {
                out.table.insert(stored.clone(), ());
            }
        }
        Ok(out)
    }

    pub fn difference<I>(&self, other: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = self.plain_copy();
        for v in other {
            let v = self.canonical_arg(Borrow::<T>::borrow(&v))?;
            out.table.remove_key(&*v);
        }
        Ok(out)
    }

    /// Toggle each distinct element of `other` against a copy of `self`.
    pub fn symmetric_difference<I>(&self, other: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = self.plain_copy();
        let other = self.collect_canonical(other)?;
        for v in other.iter() {
            if out.table.remove_key(v).is_none() {
                out.table.insert(v.clone(), ());
            }
        }
        Ok(out)
    }

    pub fn is_subset_of<I>(&self, other: I) -> Result<bool>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let other = self.collect_canonical(other)?;
        Ok(self.iter().all(|v| other.contains(v)))
    }

    /// Stops at the first element of `other` that is not a member.
    pub fn is_superset_of<I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for v in other {
            if !self.has(Borrow::<T>::borrow(&v))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Stops at the first element of `other` that is a member.
    pub fn is_disjoint_from<I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for v in other {
            if self.has(Borrow::<T>::borrow(&v))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Hookless set of `items` after this set's coercion.
    fn collect_canonical<I>(&self, items: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = self.sibling();
        for v in items {
            let v = self.canonical_arg(Borrow::<T>::borrow(&v))?;
            out.table.insert(v.into_owned(), ());
        }
        Ok(out)
    }
}

/// Borrowing iterator in insertion order.
pub struct Iter<'a, T> {
    inner: linked_table::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(v, _)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(v, _)| v)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T, S> IntoIterator for &'a OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator in insertion order.
pub struct IntoIter<T> {
    inner: linked_table::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(v, _)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S> IntoIterator for OrderedSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

/// Collects without the coercion hook.
impl<T, S> FromIterator<T> for OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

/// Raw insertion; the coercion hook is not applied.
impl<T, S> Extend<T> for OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.table.insert(value, ());
        }
    }
}

impl<T, const N: usize> From<[T; N]> for OrderedSet<T>
where
    T: Eq + Hash,
{
    fn from(values: [T; N]) -> Self {
        Self::of(values)
    }
}

impl<T> Default for OrderedSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Clone for OrderedSet<T, S>
where
    T: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            coerce: self.coerce.clone(),
        }
    }
}

impl<T, S> fmt::Debug for OrderedSet<T, S>
where
    T: Eq + Hash + fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Same elements, regardless of order.
impl<T, S> PartialEq for OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for OrderedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_first_position() {
        let mut s = OrderedSet::new();
        s.add(3).unwrap().add(1).unwrap().add(3).unwrap();
        assert_eq!(s.to_array(), vec![3, 1]);
        assert!(s.delete(&3).unwrap());
        s.add(3).unwrap();
        assert_eq!(s.to_array(), vec![1, 3]);
    }

    #[test]
    fn coercion_applies_to_membership() {
        let mut s = OrderedSet::with_coercion(Coerce::new(|v: &String| v.trim().to_string()));
        s.add(" a ".to_string()).unwrap();
        s.add("a".to_string()).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.has(&"  a".to_string()).unwrap());
        assert!(s.delete(&"a  ".to_string()).unwrap());
        assert!(s.is_empty());
    }

    #[test]
    fn symmetric_difference_toggles() {
        let s = OrderedSet::of([1, 2, 3]);
        assert_eq!(s.symmetric_difference([3, 4]).unwrap().to_array(), vec![1, 2, 4]);
        // Duplicates in the argument toggle once.
        assert_eq!(s.symmetric_difference([4, 4]).unwrap().to_array(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn intersection_is_true_intersection() {
        let s = OrderedSet::of([1, 2, 3]);
        assert_eq!(s.intersection([3, 9, 1, 3]).unwrap().to_array(), vec![3, 1]);
        assert!(s.intersection([7, 8]).unwrap().is_empty());
    }

    #[test]
    fn join_and_at() {
        let s = OrderedSet::of(["x", "y", "z"]);
        assert_eq!(s.join(", "), "x, y, z");
        assert_eq!(s.at(-1), Some(&"z"));
        assert_eq!(s.at(3), None);
        assert_eq!(OrderedSet::<i32>::new().join("-"), "");
    }
}
