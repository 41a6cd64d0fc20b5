//! extended-collections: insertion-ordered maps and sets with an
//! insert-or-update primitive, normalization hooks and a functional
//! transform surface, plus weak-keyed siblings built on `Rc`/`Weak`.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the storage layer small and free of user callbacks, and
//!   run every hook and closure in the layer above it.
//! - Layers:
//!   - LinkedTable<K, V, S>: structural storage. A `hashbrown::HashTable`
//!     of slot keys indexes a `slotmap::SlotMap` of entries; each entry
//!     carries its precomputed hash and `prev`/`next` links that give
//!     insertion order. A debug-only tracker records the table operation in
//!     flight and panics on a nested one.
//!   - OrderedMap<K, V, S> / OrderedSet<T, S>: public containers. They run
//!     normalization hooks and user closures first, then delegate a single
//!     structural operation to the table.
//!   - WeakKeyMap<K, V> / WeakValueSet<T>: the same table keyed by a
//!     pointer-identity wrapper around `std::rc::Weak`.
//!   - shape: `Collection` and the `is_map`/`is_set`/`is_weak_map`/
//!     `is_weak_set` predicates, implemented for std and hashbrown
//!     collections as well.
//!
//! Constraints
//! - Single-threaded: hooks are `Rc<dyn Fn>`, so hooked containers are
//!   `!Send`/`!Sync`.
//! - Insertion order is the only order. Overwriting a key keeps its
//!   position; deleting and re-adding moves it to the end. `sort` computes
//!   the new order first and then relinks entries in place.
//! - Reentrancy: disallowed while LinkedTable is mid-update (only
//!   `K: Eq/Hash` may run there); allowed everywhere else. Closures passed
//!   to `emplace`, transforms and folds receive `&Self` and may read freely.
//!
//! Normalization
//! - A key hook and a value hook may be installed at construction. `get`,
//!   `has`, `delete` run the key hook on the probe; `set` and `emplace` run
//!   both before storage is touched, so a failing hook leaves the container
//!   unchanged. Hook failures surface as `Error::Coercion`.
//! - Map lookups take any borrowed form of the key. Without a key hook the
//!   borrowed form is probed directly; with one it is first made owned.
//! - Set algebra runs the set's hook on every argument element, so
//!   `is_superset_of`, `intersection` and friends agree with `has`.
//! - Transforms (`map`, `filter`, `partition`, set algebra, ...) produce
//!   containers without hooks that share the receiver's hasher.
//!
//! Weak containers
//! - Identity is the `Rc` allocation. Holding an entry never raises the
//!   strong count. Entries of dropped referents are unreachable and are
//!   swept by `purge` or automatically once storage doubles past the last
//!   sweep. There is no `len` and no iteration.
//!
//! Hasher invariants
//! - Each entry stores its `u64` hash and the index always uses the stored
//!   hash, so `K: Hash` is never invoked after insertion.

mod emplace;
mod error;
mod hooks;
#[cfg(feature = "bench_internal")]
pub mod linked_table;
#[cfg(not(feature = "bench_internal"))]
mod linked_table;
mod linked_table_proptest;
mod ordered_map;
mod ordered_set;
mod reentrancy;
pub mod shape;
mod weak_key;
mod weak_map;
mod weak_set;

// Public surface
pub use emplace::Emplace;
pub use error::{Error, HookError, Result};
pub use hooks::{Coerce, NormalizationHooks};
pub use ordered_map::{Iter as MapIter, OrderedMap};
pub use ordered_set::{Iter as SetIter, OrderedSet};
pub use shape::{is_map, is_set, is_weak_map, is_weak_set, Collection, Shape};
pub use weak_map::WeakKeyMap;
pub use weak_set::WeakValueSet;
