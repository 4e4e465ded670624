use callcheck_core::AgentMatch;
use callcheck_detect::{detect_partitioned, OrderedDetector, PairwiseScanner};
use callcheck_test_utils::fixtures::non_overlapping_calls;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const SIZES: [usize; 3] = [250, 1_000, 4_000];

fn bench_scanner_vs_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    for size in SIZES {
        let calls = non_overlapping_calls(10, size);

        group.bench_with_input(BenchmarkId::new("pairwise_scan", size), &calls, |b, calls| {
            let scanner = PairwiseScanner::new();
            b.iter(|| black_box(scanner.scan(black_box(calls)).count));
        });

        group.bench_with_input(BenchmarkId::new("ordered", size), &calls, |b, calls| {
            b.iter(|| {
                let outcome = OrderedDetector::new().detect(black_box(calls.clone()));
                black_box(outcome.report.count)
            });
        });
    }
    group.finish();
}

fn bench_partitioned(c: &mut Criterion) {
    let calls = non_overlapping_calls(75, 50_000);

    c.bench_function("detect/partitioned_4_workers", |b| {
        b.iter(|| {
            let outcome = detect_partitioned(black_box(calls.clone()), AgentMatch::Exact, 4);
            black_box(outcome.accepted_count())
        });
    });
}

criterion_group!(benches, bench_scanner_vs_ordered, bench_partitioned);
criterion_main!(benches);
