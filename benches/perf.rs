use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use plstats::aggregate::{self, GroupBy};
use plstats::metrics::Normalization;
use plstats::record::{PlayerRecord, ValidityRule, normalize_rows};
use plstats::sample_feed;
use plstats::view::{SampleCap, ViewConfig, run_view};

fn bench_normalize(c: &mut Criterion) {
    let rows = sample_feed::sample_rows(600, 42);
    c.bench_function("normalize_rows", |b| {
        b.iter(|| {
            let records = normalize_rows(black_box(&rows), &ValidityRule::identity());
            black_box(records.len());
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let rows = sample_feed::sample_rows(600, 42);
    let records = normalize_rows(&rows, &ValidityRule::identity());
    let refs: Vec<&PlayerRecord> = records.iter().collect();
    c.bench_function("aggregate_by_position", |b| {
        b.iter(|| {
            let groups = aggregate::aggregate(
                black_box(&refs),
                GroupBy::Position,
                "Goals",
                Normalization::PerAppearance,
                5,
            );
            black_box(groups.len());
        })
    });
}

fn bench_density(c: &mut Criterion) {
    let rows = sample_feed::sample_rows(600, 42);
    let records = normalize_rows(&rows, &ValidityRule::identity());
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.metric("Goals"))
        .collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let ticks = aggregate::even_ticks(0.0, max * 1.1, aggregate::DENSITY_TICKS);
    c.bench_function("kernel_density", |b| {
        b.iter(|| {
            let density = aggregate::kernel_density(
                black_box(&values),
                aggregate::DENSITY_BANDWIDTH,
                &ticks,
            );
            black_box(density.len());
        })
    });
}

fn bench_full_view(c: &mut Criterion) {
    let rows = sample_feed::sample_rows(600, 42);
    let records = normalize_rows(&rows, &ValidityRule::identity());
    let cfg = ViewConfig {
        metric: "Goals".to_string(),
        mode: Normalization::PerAppearance,
        sample_cap: SampleCap::Top(30),
        ..ViewConfig::default()
    };
    c.bench_function("full_view_recompute", |b| {
        b.iter(|| {
            let view = run_view(black_box(&records), black_box(&cfg));
            black_box(view.groups.len());
        })
    });
}

criterion_group!(
    perf,
    bench_normalize,
    bench_aggregate,
    bench_density,
    bench_full_view
);
criterion_main!(perf);
