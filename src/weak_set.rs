//! WeakValueSet: membership of `Rc` allocations without keeping them alive.

use crate::error::Result;
use crate::hooks::{self, Coerce};
use crate::linked_table::LinkedTable;
use crate::weak_key::{SweepSchedule, WeakKey};
use core::fmt;
use std::rc::Rc;
use tracing::debug;

/// Identity set over `Rc<T>`. Same liveness and sweep rules as
/// [`WeakKeyMap`](crate::WeakKeyMap).
pub struct WeakValueSet<T: ?Sized> {
    table: LinkedTable<WeakKey<T>, ()>,
    coerce: Option<Coerce<Rc<T>>>,
    sweep: SweepSchedule,
}

impl<T: ?Sized> WeakValueSet<T> {
    pub fn new() -> Self {
        Self {
            table: LinkedTable::new(),
            coerce: None,
            sweep: SweepSchedule::new(),
        }
    }

    pub fn with_coercion(coerce: Coerce<Rc<T>>) -> Self {
        let mut set = Self::new();
        set.coerce = Some(coerce);
        set
    }

    pub fn from_values<I>(values: I, coerce: Coerce<Rc<T>>) -> Result<Self>
    where
        I: IntoIterator<Item = Rc<T>>,
    {
        let mut set = Self::with_coercion(coerce);
        set.add_all(values)?;
        Ok(set)
    }

    pub fn from_iter_with<I, F>(items: I, mut f: F) -> Self
    where
        I: IntoIterator,
        F: FnMut(I::Item, usize) -> Rc<T>,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect()
    }

    pub fn of<const N: usize>(values: [Rc<T>; N]) -> Self {
        values.into_iter().collect()
    }

    pub fn has(&self, value: &Rc<T>) -> Result<bool> {
        let value = hooks::canonical(self.coerce.as_ref(), value)?;
        Ok(self.table.contains_key(&WeakKey::new(&*value)))
    }

    pub fn add(&mut self, value: Rc<T>) -> Result<&mut Self> {
        let value = hooks::owned(self.coerce.as_ref(), value)?;
        self.insert_raw(&value);
        Ok(self)
    }

    pub fn add_all<I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Rc<T>>,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(self)
    }

    pub fn delete(&mut self, value: &Rc<T>) -> Result<bool> {
        let value = hooks::canonical(self.coerce.as_ref(), value)?;
        Ok(self.table.remove_key(&WeakKey::new(&*value)).is_some())
    }

    /// Delete every given value and report whether all of them were present.
    /// An empty list drops every element.
    pub fn delete_all<'v, I>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'v Rc<T>>,
        T: 'v,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            self.table.clear();
            self.sweep.reschedule(0);
            return Ok(true);
        }
        let mut all = true;
        for value in values {
            all &= self.delete(value)?;
        }
        Ok(all)
    }

    /// Drop every element that is gone and return how many were dropped.
    pub fn purge(&mut self) -> usize {
        let before = self.table.len();
        self.table.retain(|k, _| k.is_live());
        let live = self.table.len();
        self.sweep.reschedule(live);
        let reclaimed = before - live;
        debug!(reclaimed, live, "swept weak value set");
        reclaimed
    }

    fn insert_raw(&mut self, value: &Rc<T>) {
        if self.sweep.due(self.table.len()) {
            self.purge();
        }
        self.table.insert(WeakKey::new(value), ());
    }

    #[cfg(test)]
    pub(crate) fn stored(&self) -> usize {
        self.table.len()
    }
}

/// Collects without the coercion hook.
impl<T: ?Sized> FromIterator<Rc<T>> for WeakValueSet<T> {
    fn from_iter<I: IntoIterator<Item = Rc<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert_raw(&value);
        }
        set
    }
}

impl<T: ?Sized> Default for WeakValueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for WeakValueSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakValueSet")
            .field("coerce", &self.coerce.is_some())
            .finish_non_exhaustive()
    }
}
