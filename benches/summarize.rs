//! Results analysis benchmarks
//!
//! Measures the columnar path behind the results report: building the Arrow
//! table, partitioning by contract and summarizing, plus a CSV round trip.
//!
//! Run with: cargo bench --bench summarize

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use record_bench::experiment::MeasurementRecord;
use record_bench::results::{Analyzer, ResultsStore, ResultsTable};

const SIZES: [usize; 3] = [100, 1_000, 10_000]; // dataset rows

/// Two records per row, gas and latency in realistic ranges
fn generate_records(rows: usize) -> Vec<MeasurementRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..rows)
        .flat_map(|index| {
            let basic = MeasurementRecord::builder("BasicContract", index)
                .add(rng.gen_range(150_000..400_000), rng.gen_range(5.0..40.0))
                .delete(rng.gen_range(20_000..60_000), rng.gen_range(3.0..20.0))
                .build();
            let light = MeasurementRecord::builder("LightweightContract", index)
                .add(rng.gen_range(60_000..120_000), rng.gen_range(4.0..30.0))
                .delete(rng.gen_range(15_000..30_000), rng.gen_range(3.0..15.0))
                .build();
            [basic, light]
        })
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for rows in SIZES {
        let records = generate_records(rows);
        let table = ResultsTable::from_records(&records).unwrap();

        group.bench_with_input(BenchmarkId::new("build_table", rows), &records, |b, records| {
            b.iter(|| ResultsTable::from_records(black_box(records)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("summary", rows), &table, |b, table| {
            b.iter(|| Analyzer::summarize(black_box(table)));
        });

        group.bench_with_input(BenchmarkId::new("coverage", rows), &table, |b, table| {
            b.iter(|| Analyzer::coverage(black_box(table)).unwrap());
        });
    }

    group.finish();
}

fn bench_csv_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("results_csv");
    let dir = tempfile::tempdir().unwrap();
    let store = ResultsStore::new(dir.path());

    for rows in SIZES {
        let records = generate_records(rows);
        group.bench_with_input(BenchmarkId::new("save_load", rows), &records, |b, records| {
            b.iter(|| {
                let _ = store.save(black_box(records));
                store.load()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summarize, bench_csv_roundtrip);
criterion_main!(benches);
