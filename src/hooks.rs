//! Normalization hooks: optional functions that canonicalize a key or a
//! value before it touches storage.
//!
//! Hooks borrow their input and return the canonical owned form. They are
//! expected to be pure and idempotent; the containers call them and
//! propagate failures but do not check either property.

use crate::error::{Error, HookError, Result};
use core::fmt;
use core::ops::Deref;
use std::rc::Rc;

/// A single normalization function.
pub struct Coerce<T>(Rc<dyn Fn(&T) -> core::result::Result<T, HookError>>);

impl<T: 'static> Coerce<T> {
    /// Infallible hook.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> T + 'static,
    {
        Coerce(Rc::new(move |t: &T| Ok::<T, HookError>(f(t))))
    }

    /// Hook that may reject its input.
    pub fn try_new<F, E>(f: F) -> Self
    where
        F: Fn(&T) -> core::result::Result<T, E> + 'static,
        E: Into<HookError>,
    {
        Coerce(Rc::new(move |t: &T| f(t).map_err(Into::into)))
    }
}

impl<T> Coerce<T> {
    pub fn apply(&self, t: &T) -> Result<T> {
        (self.0)(t).map_err(Error::Coercion)
    }
}

impl<T> Clone for Coerce<T> {
    fn clone(&self) -> Self {
        Coerce(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Coerce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coerce(..)")
    }
}

/// Key/value hooks supplied at construction time.
pub struct NormalizationHooks<K, V> {
    key: Option<Coerce<K>>,
    value: Option<Coerce<V>>,
}

impl<K, V> NormalizationHooks<K, V> {
    pub fn new() -> Self {
        Self {
            key: None,
            value: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }

    pub(crate) fn has_key_hook(&self) -> bool {
        self.key.is_some()
    }

    /// Canonical form of a borrowed key, for lookups.
    pub(crate) fn key<'a>(&self, key: &'a K) -> Result<Canonical<'a, K>> {
        canonical(self.key.as_ref(), key)
    }

    /// Canonical form of an owned key, for placement.
    pub(crate) fn owned_key(&self, key: K) -> Result<K> {
        owned(self.key.as_ref(), key)
    }

    pub(crate) fn owned_value(&self, value: V) -> Result<V> {
        owned(self.value.as_ref(), value)
    }
}

impl<K: 'static, V: 'static> NormalizationHooks<K, V> {
    pub fn coerce_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&K) -> K + 'static,
    {
        self.key = Some(Coerce::new(f));
        self
    }

    pub fn try_coerce_key<F, E>(mut self, f: F) -> Self
    where
        F: Fn(&K) -> core::result::Result<K, E> + 'static,
        E: Into<HookError>,
    {
        self.key = Some(Coerce::try_new(f));
        self
    }

    pub fn coerce_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&V) -> V + 'static,
    {
        self.value = Some(Coerce::new(f));
        self
    }

    pub fn try_coerce_value<F, E>(mut self, f: F) -> Self
    where
        F: Fn(&V) -> core::result::Result<V, E> + 'static,
        E: Into<HookError>,
    {
        self.value = Some(Coerce::try_new(f));
        self
    }
}

impl<K, V> Default for NormalizationHooks<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for NormalizationHooks<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K, V> fmt::Debug for NormalizationHooks<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizationHooks")
            .field("key", &self.key.is_some())
            .field("value", &self.value.is_some())
            .finish()
    }
}

/// A key or value after normalization: the caller's own reference when no
/// hook is installed, the hook's output otherwise.
pub(crate) enum Canonical<'a, T> {
    Borrowed(&'a T),
    Owned(T),
}

impl<T: Clone> Canonical<'_, T> {
    pub(crate) fn into_owned(self) -> T {
        match self {
            Canonical::Borrowed(t) => t.clone(),
            Canonical::Owned(t) => t,
        }
    }
}

impl<T> Deref for Canonical<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Canonical::Borrowed(t) => t,
            Canonical::Owned(t) => t,
        }
    }
}

pub(crate) fn canonical<'a, T>(hook: Option<&Coerce<T>>, t: &'a T) -> Result<Canonical<'a, T>> {
    match hook {
        Some(h) => h.apply(t).map(Canonical::Owned),
        None => Ok(Canonical::Borrowed(t)),
    }
}

pub(crate) fn owned<T>(hook: Option<&Coerce<T>>, t: T) -> Result<T> {
    match hook {
        Some(h) => h.apply(&t),
        None => Ok(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_hooks_pass_through() {
        let hooks: NormalizationHooks<String, i32> = NormalizationHooks::new();
        assert!(hooks.is_empty());
        assert!(!hooks.has_key_hook());
        let k = "Key".to_string();
        assert!(matches!(hooks.key(&k).unwrap(), Canonical::Borrowed(_)));
        assert_eq!(hooks.owned_value(7).unwrap(), 7);
    }

    #[test]
    fn hooks_canonicalize() {
        let hooks: NormalizationHooks<String, i32> = NormalizationHooks::new()
            .coerce_key(|k: &String| k.to_lowercase())
            .coerce_value(|v: &i32| v.abs());
        assert!(hooks.has_key_hook());
        assert_eq!(&*hooks.key(&"KeY".to_string()).unwrap(), "key");
        assert_eq!(hooks.key(&"Q".to_string()).unwrap().into_owned(), "q");
        assert_eq!(hooks.owned_key("ABC".to_string()).unwrap(), "abc");
        assert_eq!(hooks.owned_value(-3).unwrap(), 3);
    }

    #[test]
    fn failing_hook_maps_to_coercion_error() {
        let hooks: NormalizationHooks<i32, i32> = NormalizationHooks::new().try_coerce_key(|k: &i32| {
            if *k < 0 {
                Err("negative key")
            } else {
                Ok(*k)
            }
        });
        assert_eq!(hooks.owned_key(4).unwrap(), 4);
        assert!(matches!(hooks.owned_key(-4), Err(Error::Coercion(_))));
    }
}
