// OrderedSet test suite.
//
// Core invariants exercised:
// - Uniqueness and insertion order over post-coercion values.
// - Set algebra coerces argument elements and never mutates operands;
//   its results are hookless.
// - Transforms mirror OrderedMap with `(value, set)` callbacks.
use extended_collections::{Coerce, Error, OrderedSet};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn set(values: &[i32]) -> OrderedSet<i32> {
    values.iter().copied().collect()
}

// Test: symmetric difference by toggling.
// Verifies: {1,2,3} △ [3,4] = {1,2,4} in that order.
#[test]
fn symmetric_difference_scenario() {
    let a = set(&[1, 2, 3]);
    let sd = a.symmetric_difference([3, 4]).unwrap();
    assert_eq!(sd.to_array(), vec![1, 2, 4]);
    assert_eq!(a.to_array(), vec![1, 2, 3]);
}

// Test: intersection filters the argument against the receiver.
// Verifies: a true intersection in the argument's order, de-duplicated.
#[test]
fn intersection_uses_receiver_membership() {
    let a = set(&[1, 2, 3, 4]);
    assert_eq!(a.intersection([4, 9, 2, 4]).unwrap().to_array(), vec![4, 2]);
    assert_eq!(a.intersection(&set(&[5, 6])).unwrap().len(), 0);
}

#[test]
fn union_and_difference() {
    let a = set(&[1, 2, 3]);
    let b = set(&[3, 4]);
    assert_eq!(a.union(&b).unwrap().to_array(), vec![1, 2, 3, 4]);
    assert_eq!(a.difference(&b).unwrap().to_array(), vec![1, 2]);
    assert_eq!(a.difference(Vec::<i32>::new()).unwrap(), a);
}

// Test: relations.
// Verifies: textbook subset/superset/disjoint, including the empty set.
#[test]
fn subset_superset_disjoint() {
    let a = set(&[1, 2]);
    let b = set(&[1, 2, 3]);
    assert!(a.is_subset_of(&b).unwrap());
    assert!(!b.is_subset_of(&a).unwrap());
    assert!(b.is_superset_of(&a).unwrap());
    assert!(b.is_superset_of([3, 3, 1]).unwrap());
    assert!(a.is_disjoint_from([5, 6]).unwrap());
    assert!(!a.is_disjoint_from([6, 2]).unwrap());
    let empty = set(&[]);
    assert!(empty.is_subset_of(&a).unwrap());
    assert!(a.is_superset_of(&empty).unwrap());
    assert!(empty.is_disjoint_from(&empty).unwrap());
}

// Test: coercion on add/has/delete, and its absence on algebra results.
// Verifies: union stores canonical argument elements; the result has no hook.
#[test]
fn coercion_and_hookless_results() {
    let lower = Coerce::new(|s: &String| s.to_lowercase());
    let mut s = OrderedSet::from_values(["A".to_string(), "b".to_string(), "a".to_string()], lower).unwrap();
    assert_eq!(s.to_array(), vec!["a".to_string(), "b".to_string()]);
    assert!(s.has(&"B".to_string()).unwrap());

    let u = s.union(["C".to_string()]).unwrap();
    assert_eq!(u.to_array(), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    assert!(!u.has(&"C".to_string()).unwrap());

    assert!(s.delete(&"A".to_string()).unwrap());
    assert_eq!(s.len(), 1);
}

fn lowercase_set() -> OrderedSet<String> {
    let lower = Coerce::new(|s: &String| s.to_lowercase());
    OrderedSet::from_values(["a".to_string(), "b".to_string()], lower).unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Test: set algebra on a hooked set.
// Assumes: the hook lowercases; stored elements are lowercase.
// Verifies: every relation agrees with `has`, and results hold the
// canonical (stored) elements.
#[test]
fn algebra_applies_coercion_to_arguments() {
    let s = lowercase_set();
    assert!(s.has(&"A".to_string()).unwrap());

    assert!(s.is_superset_of(strings(&["A"])).unwrap());
    assert!(s.is_superset_of(strings(&["B", "a"])).unwrap());
    assert!(!s.is_disjoint_from(strings(&["A"])).unwrap());
    assert!(s.is_disjoint_from(strings(&["C"])).unwrap());
    assert!(s.is_subset_of(strings(&["B", "A", "C"])).unwrap());
    assert!(!s.is_subset_of(strings(&["B"])).unwrap());

    assert_eq!(s.intersection(strings(&["B", "A", "C"])).unwrap().to_array(), strings(&["b", "a"]));
    assert_eq!(s.difference(strings(&["A"])).unwrap().to_array(), strings(&["b"]));
    assert_eq!(s.difference(strings(&["A", "B"])).unwrap().len(), 0);
    assert_eq!(s.union(strings(&["B", "C"])).unwrap().to_array(), strings(&["a", "b", "c"]));
    assert_eq!(
        s.symmetric_difference(strings(&["B", "C", "c"])).unwrap().to_array(),
        strings(&["a", "c"])
    );
    assert_eq!(s.to_array(), strings(&["a", "b"]));
}

// Test: a failing hook inside set algebra.
// Verifies: the Coercion error reaches the caller and the receiver is untouched.
#[test]
fn algebra_reports_coercion_failure() {
    let positive = Coerce::try_new(|v: &i32| if *v > 0 { Ok(*v) } else { Err("not positive") });
    let s = OrderedSet::from_values([1, 2], positive).unwrap();
    assert!(matches!(s.union([3, -1]), Err(Error::Coercion(_))));
    assert!(matches!(s.intersection([0]), Err(Error::Coercion(_))));
    assert!(matches!(s.difference([-2]), Err(Error::Coercion(_))));
    assert!(matches!(s.symmetric_difference([-3]), Err(Error::Coercion(_))));
    assert!(matches!(s.is_subset_of([1, 2, -4]), Err(Error::Coercion(_))));
    assert!(matches!(s.is_superset_of([-1]), Err(Error::Coercion(_))));
    assert!(matches!(s.is_disjoint_from([-1]), Err(Error::Coercion(_))));
    assert_eq!(s.to_array(), vec![1, 2]);
}

#[test]
fn failing_coercion_is_reported() {
    let positive = Coerce::try_new(|v: &i32| if *v > 0 { Ok(*v) } else { Err("not positive") });
    let mut s = OrderedSet::with_coercion(positive);
    s.add(1).unwrap();
    assert!(matches!(s.add(-1), Err(Error::Coercion(_))));
    assert!(s.add_all([2, 0, 3]).is_err());
    assert_eq!(s.to_array(), vec![1, 2]);
}

#[test]
fn delete_all_and_clear() {
    let mut s = set(&[1, 2, 3]);
    assert!(s.delete_all(&[1, 3]).unwrap());
    assert!(!s.delete_all(&[2, 9]).unwrap());
    assert!(s.is_empty());
    let mut t = set(&[4, 5]);
    assert!(t.delete_all(&[]).unwrap());
    assert!(t.is_empty());
}

#[test]
fn transforms() {
    let s = set(&[1, 2, 3, 4]);
    assert_eq!(s.map(|v, _| v % 2).to_array(), vec![1, 0]);
    assert_eq!(s.filter(|v, _| *v > 2).to_array(), vec![3, 4]);
    assert_eq!(s.filter_out(|v, _| *v > 2).to_array(), vec![1, 2]);
    let (even, odd) = s.partition(|v, _| v % 2 == 0);
    assert_eq!((even.to_array(), odd.to_array()), (vec![2, 4], vec![1, 3]));
    assert_eq!(s.find(|v, set| set.has(&(v * 2)).unwrap()), Some(&1));
    assert!(s.every(|v, _| *v > 0));
    assert!(!s.some(|v, _| *v > 4));
    assert_eq!(s.reduce(|a, v, _| a * v).unwrap(), 24);
    assert_eq!(s.fold(String::new(), |acc, v, _| acc + &v.to_string()), "1234");
    assert!(matches!(set(&[]).reduce(|a, v, _| a + v), Err(Error::EmptyReduce)));
}

#[test]
fn positional_and_join() {
    let s: OrderedSet<&str> = OrderedSet::of(["x", "y", "z"]);
    assert_eq!(s.first(), Some(&"x"));
    assert_eq!(s.last(), Some(&"z"));
    assert_eq!(s.at(-2), Some(&"y"));
    assert_eq!(s.at(-4), None);
    assert_eq!(s.join("/"), "x/y/z");
    let rev: Vec<_> = s.iter().rev().copied().collect();
    assert_eq!(rev, vec!["z", "y", "x"]);
}

#[test]
fn sampling() {
    let s = set(&[10, 20, 30]);
    let mut rng = StdRng::seed_from_u64(42);
    for v in s.sample_many_with(20, &mut rng) {
        assert!(s.has(v).unwrap());
    }
    assert!(s.sample_one_with(&mut rng).is_some());
    assert!(set(&[]).sample_one().is_none());
    assert!(set(&[]).sample_many(5).is_empty());
}

#[test]
fn from_iter_with_and_equality() {
    let s = OrderedSet::from_iter_with(["a", "bb", "cc"], |w, _| w.len());
    assert_eq!(s.to_array(), vec![1, 2]);
    assert_eq!(set(&[1, 2]), set(&[2, 1]));
    assert_eq!(format!("{:?}", set(&[2, 1])), "{2, 1}");
    assert_eq!(OrderedSet::from([3, 3, 3]).len(), 1);
}
