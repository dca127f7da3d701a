use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashstruct::{Builder, CacheView, Cache, FibonacciStrategy, MapView, WeakMode, WeakMapView};
use std::rc::Rc;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_put_with_growth(c: &mut Criterion) {
    c.bench_function("map_put_10k_from_default", |b| {
        b.iter_batched(
            MapView::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("map_put_10k_presized", |b| {
        let builder = Builder::new().initial_capacity(16_384).resize_threshold(12_288);
        b.iter_batched(
            || builder.build_map::<String, u64>().unwrap().into_strong().unwrap(),
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get(c: &mut Criterion) {
    let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();

    c.bench_function("map_get_hit", |b| {
        let m: MapView<String, u64> = keys.iter().cloned().zip(0..).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| black_box(m.get(it.next().unwrap().as_str())))
    });

    c.bench_function("map_get_hit_fibonacci", |b| {
        let mut m = MapView::with_strategy(FibonacciStrategy::<hashbrown::hash_map::DefaultHashBuilder>::default());
        for (i, k) in keys.iter().enumerate() {
            m.put(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| black_box(m.get(it.next().unwrap().as_str())))
    });

    c.bench_function("map_get_miss", |b| {
        let m: MapView<String, u64> = keys.iter().cloned().zip(0..).collect();
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_cache(c: &mut Criterion) {
    c.bench_function("cache_insert_lookup", |b| {
        let mut cache: CacheView<u64, u64> = CacheView::new();
        let mut xs = lcg(3);
        b.iter(|| {
            let x = xs.next().unwrap() % 4_096;
            cache.insert(x, x);
            black_box(cache.lookup(&x));
        })
    });
}

fn bench_weak(c: &mut Criterion) {
    c.bench_function("weak_values_get_with_expiry", |b| {
        let mut m: WeakMapView<u64, u64> = WeakMapView::new(WeakMode::Values);
        let held: Vec<Rc<u64>> = (0..1_024).map(Rc::new).collect();
        for v in &held {
            m.put(Rc::new(**v), Rc::clone(v));
        }
        let mut xs = lcg(5);
        b.iter(|| {
            let x = xs.next().unwrap() % 2_048;
            if x >= 1_024 {
                // Short-lived value: expires as soon as this scope ends.
                m.put(Rc::new(x), Rc::new(x));
            }
            black_box(m.get(&x));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put_with_growth, bench_get, bench_cache, bench_weak
}
criterion_main!(benches);
