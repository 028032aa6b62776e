//! Benchmarks for the hot leaf operations.
//!
//! The scheduler calls phase arithmetic and ledger accumulation once per
//! identity-recruiter pair per tick, so these are the operations a large
//! lattice spends its time in.
//!
//! Run with: `cargo bench --bench core_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use etm_core::prelude::*;

fn bench_phase_ops(c: &mut Criterion) {
    c.bench_function("phase_advance", |b| {
        b.iter(|| {
            let mut p = 0.0;
            for _ in 0..1_000 {
                p = phase::advance(black_box(p), black_box(0.037));
            }
            p
        })
    });

    c.bench_function("circular_distance", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..1_000 {
                acc += phase::circular_distance(black_box(i as f64 * 0.001), black_box(0.5));
            }
            acc
        })
    });
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_accumulate_decay");
    for ancestry_count in [2usize, 8, 32] {
        group.bench_with_input(
            BenchmarkId::from_parameter(ancestry_count),
            &ancestry_count,
            |b, &count| {
                let tags: Vec<Ancestry> = (0..count)
                    .map(|i| Ancestry::new(format!("ancestry_{i}")))
                    .collect();
                b.iter(|| {
                    let mut ledger = SupportLedger::per_ancestry(tags.clone());
                    for tick in 0..100 {
                        let tag = &tags[tick % count];
                        ledger.accumulate(black_box(tag), black_box(0.02));
                        ledger.decay(black_box(0.002));
                    }
                    ledger.total()
                })
            },
        );
    }
    group.finish();
}

fn bench_recruiter_echo(c: &mut Criterion) {
    c.bench_function("recruiter_receive_echo", |b| {
        let p = Ancestry::new("H1_proton");
        b.iter(|| {
            let mut rec = RecruiterNode::new("z", 0.0)
                .with_ledger(SupportLedger::per_ancestry([p.clone()]));
            for tick in 1..=100u64 {
                let echo = Echo::from_identity(p.clone(), black_box(0.01), black_box(0.02));
                rec.receive_echo(&echo, PhaseCompareMode::Circular, tick);
                rec.decay_reinforcement(0.002);
            }
            rec.ledger().total()
        })
    });
}

criterion_group!(benches, bench_phase_ops, bench_ledger, bench_recruiter_echo);
criterion_main!(benches);
