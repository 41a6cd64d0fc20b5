#![cfg(test)]

// Property tests for LinkedTable kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::linked_table::{Handle, LinkedTable};
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    At(usize),
    RetainEven,
    Reverse,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (0usize..10).prop_map(OpI::At),
            1 => Just(OpI::RetainEven),
            1 => Just(OpI::Reverse),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Model: a Vec of (key, value) in insertion order, keys unique.
fn model_pos(model: &[(Key, i32)], k: &Key) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

// Invariants checked after every operation:
// - Iteration order (forward and backward) equals the model's order.
// - Keys are unique; `len`/`is_empty` match the model.
// - Overwriting a present key keeps its position and returns the old value.
// - Handles of removed entries never resolve again.
fn run_state_machine<S>(
    mut sut: LinkedTable<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone + Default,
{
    let mut model: Vec<(Key, i32)> = Vec::new();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let (h, old) = sut.insert(k.clone(), v);
                match model_pos(&model, &k) {
                    Some(p) => {
                        prop_assert_eq!(old, Some(model[p].1));
                        prop_assert_eq!(Some(&h), live.get(&k), "overwrite keeps the handle");
                        model[p].1 = v;
                    }
                    None => {
                        prop_assert!(old.is_none());
                        model.push((k.clone(), v));
                        live.insert(k, h);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                match live.remove(&k) {
                    Some(h) => {
                        let (kk, vv) = sut.remove(h).expect("handle valid for removal");
                        let p = model_pos(&model, &k).expect("present in model");
                        let (mk, mv) = model.remove(p);
                        prop_assert!(kk == mk);
                        prop_assert_eq!(vv, mv);
                        stale.push(h);
                    }
                    None => prop_assert!(sut.remove_key(&k).is_none()),
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                prop_assert_eq!(has, model.iter().any(|(k, _)| k.0 == s));
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let p = model_pos(&model, &k).expect("present in model");
                    model[p].1 = model[p].1.saturating_add(d);
                } else {
                    prop_assert!(model_pos(&model, &k).is_none());
                }
            }
            OpI::At(i) => {
                let got = sut.get_index(i).map(|(k, v)| (k.clone(), *v));
                prop_assert_eq!(got, model.get(i).cloned());
            }
            OpI::RetainEven => {
                sut.retain(|_, v| v % 2 == 0);
                for (k, _) in model.iter().filter(|(_, v)| v % 2 != 0) {
                    if let Some(h) = live.remove(k) {
                        stale.push(h);
                    }
                }
                model.retain(|(_, v)| v % 2 == 0);
            }
            OpI::Reverse => {
                let mut order: Vec<Handle> = sut.iter_handles().map(|(h, _, _)| h).collect();
                order.reverse();
                sut.relink(&order);
                model.reverse();
            }
            OpI::Iterate => {
                let back: Vec<_> = sut.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
                let mut expected = model.clone();
                expected.reverse();
                prop_assert_eq!(back, expected);
            }
        }

        let forward: Vec<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&forward, &model);
        prop_assert_eq!(sut.iter().len(), model.len());
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.first().map(|(k, _)| k), model.first().map(|(k, _)| k));
        prop_assert_eq!(sut.last().map(|(k, _)| k), model.last().map(|(k, _)| k));
        for &h in &stale {
            prop_assert!(sut.value(h).is_none());
        }
    }

    let owned: Vec<_> = sut.into_iter().collect();
    prop_assert_eq!(owned, model);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(LinkedTable::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Same invariants under worst-case collision behavior.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(LinkedTable::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
