//! Replay loop benchmark — bars per second through the full step pipeline.

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hypolab_core::config::ReplayConfig;
use hypolab_core::domain::Bar;
use hypolab_core::engine::ReplayEngine;
use hypolab_core::execution::NextBarOpenExecutor;
use hypolab_core::hypothesis::catalog::SimpleMomentum;

fn synthetic_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2015, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            let change = ((seed % 400) as f64 - 200.0) * 0.01;
            price = (price + change).max(5.0);
            let open = price;
            let close = (price + change * 0.5).max(5.0);
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 0.8,
                low: open.min(close) - 0.8,
                close,
                volume: 10_000.0,
            }
        })
        .collect()
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    for n in [1_000usize, 10_000] {
        let bars = synthetic_bars(n);
        group.bench_with_input(BenchmarkId::new("simple_momentum", n), &bars, |b, bars| {
            b.iter(|| {
                let mut engine = ReplayEngine::new(
                    ReplayConfig::new(1, Some(100), 100_000.0),
                    Box::new(SimpleMomentum::new(3, 1.0)),
                    Box::new(NextBarOpenExecutor::frictionless()),
                )
                .unwrap();
                engine.run(&mut bars.clone().into_iter()).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
