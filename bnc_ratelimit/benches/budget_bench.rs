use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use bnc_ratelimit::WeightBudget;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

fn bench_reserve_admitted(c: &mut Criterion) {
    c.bench_function("reserve_admitted", |b| {
        let budget = WeightBudget::new(u32::MAX, Duration::from_secs(3600)).unwrap();

        b.iter(|| black_box(budget.reserve(black_box(1))));
    });
}

fn bench_reserve_rejected(c: &mut Criterion) {
    c.bench_function("reserve_rejected", |b| {
        let budget = WeightBudget::per_minute(1).unwrap();
        budget.reserve(1);

        b.iter(|| black_box(budget.reserve(black_box(5))));
    });
}

fn bench_reserve_contended(c: &mut Criterion) {
    c.bench_function("reserve_contended_4_threads", |b| {
        let budget = Arc::new(WeightBudget::new(u32::MAX, Duration::from_secs(3600)).unwrap());

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let budget = Arc::clone(&budget);
                    std::thread::spawn(move || {
                        for _ in 0..1000 {
                            black_box(budget.reserve(1));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_reserve_admitted, bench_reserve_rejected, bench_reserve_contended);
criterion_main!(benches);
