#![cfg(test)]

// Property tests for Engine kept inside the crate so they can check chain
// placement through `check_invariants` and drive the hash-level operations.

use crate::config::EngineConfig;
use crate::engine::tests::{ConstStrategy, IdentityStrategy};
use crate::engine::Engine;
use crate::strategy::{DefaultStrategy, FibonacciStrategy, HashStrategy};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
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

// Pool-indexed operations so shrinking converges on earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    RetainEven,
    Iterate,
    Clear,
}

fn arb_config() -> impl Strategy<Value = EngineConfig> {
    (1usize..=16).prop_flat_map(|cap| {
        (1usize..cap.max(2)).prop_map(move |thr| EngineConfig::new(cap.max(2), thr))
    })
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => "[a-z]{0,4}".prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::RetainEven),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap:
// - `put` returns the model's previous value; `len` counts distinct keys.
// - lookups return the last written value; removed keys are absent.
// - iteration yields each entry exactly once.
// - every node sits in the bucket its cached hash maps to, after every op,
//   including ops that crossed the resize threshold.
fn run<S: HashStrategy>(
    mut sut: Engine<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let key = |i: usize| Key(pool[i].clone());

    for op in ops {
        let before_capacity = sut.capacity();
        match op {
            Op::Put(i, v) => {
                prop_assert_eq!(sut.put(key(i), v), model.insert(key(i), v));
            }
            Op::Remove(i) => {
                prop_assert_eq!(sut.remove(pool[i].as_str()), model.remove(&key(i)));
            }
            Op::Get(i) => {
                prop_assert_eq!(sut.get(pool[i].as_str()), model.get(&key(i)));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&Key(s)));
            }
            Op::Mutate(i, d) => {
                let got = sut.get_mut(pool[i].as_str()).map(|v| {
                    *v = v.wrapping_add(d);
                    *v
                });
                let want = model.get_mut(&key(i)).map(|v| {
                    *v = v.wrapping_add(d);
                    *v
                });
                prop_assert_eq!(got, want);
            }
            Op::RetainEven => {
                sut.retain(|_, v| *v % 2 == 0);
                model.retain(|_, v| *v % 2 == 0);
            }
            Op::Iterate => {
                let seen: BTreeMap<Key, i32> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen.len(), sut.len());
                let want: BTreeMap<Key, i32> = model.clone().into_iter().collect();
                prop_assert_eq!(seen, want);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.capacity() >= before_capacity, "capacity never shrinks");
        prop_assert!(sut.len() < sut.resize_threshold(), "no pending resize");
        sut.check_invariants();
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k.0.as_str()), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_default_strategy((pool, ops) in arb_scenario(), config in arb_config()) {
        let sut = Engine::with_config(DefaultStrategy::default(), config).unwrap();
        run(sut, &pool, ops)?;
    }

    #[test]
    fn prop_fibonacci_strategy((pool, ops) in arb_scenario(), config in arb_config()) {
        let sut = Engine::with_config(FibonacciStrategy::<hashbrown::hash_map::DefaultHashBuilder>::default(), config).unwrap();
        run(sut, &pool, ops)?;
    }

    #[test]
    fn prop_identity_strategy((pool, ops) in arb_scenario(), config in arb_config()) {
        let sut = Engine::with_config(IdentityStrategy, config).unwrap();
        run(sut, &pool, ops)?;
    }

    // Every key collides: exercises long chains through resizes.
    #[test]
    fn prop_single_chain((pool, ops) in arb_scenario(), config in arb_config()) {
        let sut = Engine::with_config(ConstStrategy, config).unwrap();
        run(sut, &pool, ops)?;
    }
}

// Hash-level operations as the weak map uses them: purging the bucket of a
// hash removes exactly the stale nodes of that bucket and nothing else.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_purge_bucket_removes_only_matching(keys in proptest::collection::btree_set(0u64..200, 1..60), probe in 0u64..200) {
        let mut sut: Engine<u64, bool, IdentityStrategy> =
            Engine::with_config(IdentityStrategy, EngineConfig::new(8, 6)).unwrap();
        for k in &keys {
            sut.put(*k, k % 3 == 0);
        }
        let capacity = sut.capacity() as u64;
        let hash = sut.hash_of(&probe);
        let purged = sut.purge_bucket(hash, |_, stale| *stale);

        let expect_gone: Vec<u64> = keys
            .iter()
            .copied()
            .filter(|k| k % capacity == probe % capacity && k % 3 == 0)
            .collect();
        prop_assert_eq!(purged, expect_gone.len());
        for k in &keys {
            prop_assert_eq!(sut.contains_key(k), !expect_gone.contains(k));
        }
        sut.check_invariants();
    }
}
