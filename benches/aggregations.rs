//! Query pipeline benchmarks
//!
//! Measures the grouping and selection paths on synthetic sweeps of
//! increasing size: `groupby`, `groupdiff`, per-group `topk`, and the mean
//! aggregation that merges temporal series step by step.
//!
//! Run with: cargo bench --bench aggregations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ablate_db::query::{AggregateMethod, Query};
use ablate_db::selector::{Direction, Metric, Param};
use ablate_db::source::{Mock, Source};

/// Sweeps of 4 models x N learning rates x 5 seeds
const LR_COUNTS: [usize; 3] = [2, 10, 50];

fn sweep(lr_count: usize) -> Query {
    #[allow(clippy::cast_precision_loss)]
    let lrs: Vec<f64> = (1..=lr_count).map(|i| 1.0 / i as f64).collect();
    let runs = Mock::builder()
        .param("model", ["resnet", "vit", "mlp", "convnext"])
        .param("lr", lrs)
        .num_seeds(5)
        .steps(50)
        .build()
        .load()
        .expect("mock source never fails");
    Query::new(runs)
}

fn bench_groupby(c: &mut Criterion) {
    let mut group = c.benchmark_group("groupby");

    for lr_count in LR_COUNTS {
        let query = sweep(lr_count);
        group.bench_with_input(BenchmarkId::new("param", query.len()), &query, |b, query| {
            b.iter(|| black_box(query).groupby([Param::new("model"), Param::new("lr")]));
        });
        group.bench_with_input(BenchmarkId::new("diff", query.len()), &query, |b, query| {
            b.iter(|| black_box(query).groupdiff([Param::new("seed")]));
        });
    }

    group.finish();
}

fn bench_topk(c: &mut Criterion) {
    let mut group = c.benchmark_group("topk");
    let accuracy = Metric::new("accuracy", Direction::Max);

    for lr_count in LR_COUNTS {
        let query = sweep(lr_count);
        group.bench_with_input(BenchmarkId::new("flat_k3", query.len()), &query, |b, query| {
            b.iter(|| black_box(query).topk(&accuracy, 3));
        });

        let grouped = query.groupby([Param::new("model")]);
        group.bench_with_input(
            BenchmarkId::new("per_group_k1", query.len()),
            &grouped,
            |b, grouped| {
                b.iter(|| black_box(grouped).topk(&accuracy, 1));
            },
        );

        // Baseline: full sort then head
        group.bench_with_input(
            BenchmarkId::new("sort_head_k3", query.len()),
            &query,
            |b, query| {
                b.iter(|| black_box(query).sort(&accuracy, false).head(3));
            },
        );
    }

    group.finish();
}

fn bench_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("mean_aggregate");

    for lr_count in LR_COUNTS {
        let grouped = sweep(lr_count).groupdiff([Param::new("seed")]);
        group.bench_with_input(BenchmarkId::new("over_seeds", grouped.len()), &grouped, |b, grouped| {
            b.iter(|| black_box(grouped).aggregate(AggregateMethod::Mean, None));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_groupby, bench_topk, bench_mean);
criterion_main!(benches);
