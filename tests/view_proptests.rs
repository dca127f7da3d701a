// View property tests (consolidated).
//
// Property 1: distinct-key size and last write wins.
//  - Model: BTreeMap of the last value put per key.
//  - Invariant: len() == model.len(); get(k) == model[k] for all k.
//  - Small builder sizes force several resizes per case.
//
// Property 2: set membership equals the model set.
//  - Invariant: add returns true iff the element was new; len() unchanged on re-add;
//    contains(e) == model.contains(e) for every probed element.
//
// Property 3: cache round trip.
//  - Invariant: lookup immediately after insert returns the inserted value.
use hashstruct::{Builder, Cache, CacheView};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    #[test]
    fn prop_map_last_write_wins(
        cap in 2usize..=8,
        puts in proptest::collection::vec((0u16..64, any::<i64>()), 1..200),
    ) {
        let mut m = Builder::new()
            .initial_capacity(cap)
            .resize_threshold(cap - 1)
            .build_map::<u16, i64>()
            .unwrap()
            .into_strong()
            .unwrap();
        let mut model = BTreeMap::new();
        for (k, v) in puts {
            prop_assert_eq!(m.put(k, v), model.insert(k, v));
        }
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }
        let seen: BTreeMap<u16, i64> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(seen, model);
    }

    #[test]
    fn prop_set_membership(
        adds in proptest::collection::vec(0u8..32, 0..100),
        probes in proptest::collection::vec(0u8..48, 1..50),
    ) {
        let mut s = Builder::new().build_set::<u8>().unwrap();
        let mut model = BTreeSet::new();
        for e in adds {
            let before = s.len();
            let fresh = s.add(e);
            prop_assert_eq!(fresh, model.insert(e));
            if !fresh {
                prop_assert_eq!(s.len(), before);
            }
        }
        prop_assert_eq!(s.len(), model.len());
        for p in probes {
            prop_assert_eq!(s.contains(&p), model.contains(&p));
        }
    }

    #[test]
    fn prop_cache_round_trip(entries in proptest::collection::vec(("[a-z]{1,3}", any::<u32>()), 1..80)) {
        let mut c: CacheView<String, u32> = CacheView::new();
        for (k, v) in entries {
            prop_assert_eq!(*c.insert(k.clone(), v), v);
            prop_assert_eq!(c.lookup(k.as_str()), Some(&v));
        }
    }
}
