//! Performance benchmarks for view-state propagation
//!
//! Measures synchronous fan-out through shared streams and the cost of
//! building autocomplete options for growing tag lists.
//! Run with: cargo bench

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use accountcat_view::models::Tag;
use accountcat_view::reactive::{build_options, latest_with_reset, Subject};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark one emit reaching N observers through a shared chain
fn bench_shared_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_fanout");

    for observers in [1usize, 4, 16, 64].iter() {
        let input: Subject<u64> = Subject::new();
        let shared = input.source().map(|v| v * 2).share();
        let total = Arc::new(AtomicU64::new(0));
        let _subs: Vec<_> = (0..*observers)
            .map(|_| {
                let total = Arc::clone(&total);
                shared.subscribe(move |v| {
                    total.fetch_add(*v, Ordering::Relaxed);
                })
            })
            .collect();
        group.throughput(Throughput::Elements(*observers as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_observers", observers)),
            observers,
            |b, _| {
                b.iter(|| input.emit(black_box(21)));
            },
        );
    }

    group.finish();
}

/// Benchmark a form field following input with periodic resets
fn bench_field_updates(c: &mut Criterion) {
    let input: Subject<String> = Subject::new();
    let reset: Subject<()> = Subject::new();
    let field = latest_with_reset(&input.source(), String::new(), &reset.source());

    c.bench_function("field_input_then_reset", |b| {
        b.iter(|| {
            input.emit(black_box("Coffee".to_string()));
            reset.emit(());
            black_box(field.get())
        });
    });
}

/// Benchmark option building against tag lists of increasing size
fn bench_build_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_options");

    for size in [10usize, 100, 1000].iter() {
        let tags: Vec<Tag> = (0..*size)
            .map(|i| Tag::new(i.to_string(), format!("tag-{}", i)))
            .collect();
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &tags, |b, tags| {
            b.iter(|| black_box(build_options(black_box("tag-new"), tags)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shared_fanout, bench_field_updates, bench_build_options);
criterion_main!(benches);
