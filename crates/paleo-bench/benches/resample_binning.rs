// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paleo_core::{AgeGrid, ProxyRecord};
use paleo_resample::{bin_record, interpolate, InterpMethod};

fn irregular_record(n: usize) -> ProxyRecord {
    // Deterministic jittered spacing and a slow oscillation.
    let rows: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let jitter = ((i * 7919) % 13) as f64 / 13.0;
            let age = i as f64 * 1.5 + jitter;
            (age, (age / 40.0).sin() + 0.1 * jitter)
        })
        .collect();
    ProxyRecord::from_rows(&rows).expect("benchmark rows should be valid")
}

fn bench_binning(c: &mut Criterion, case_id: &str, n: usize, step: f64) {
    let record = irregular_record(n);
    let grid = AgeGrid::new(record.min_age(), record.max_age(), step)
        .expect("benchmark grid should be valid");

    c.bench_function(case_id, |b| {
        b.iter(|| {
            bin_record(black_box(&record), black_box(&grid))
                .expect("binning benchmark should succeed");
        })
    });
}

fn bench_interpolation(c: &mut Criterion, case_id: &str, n: usize, method: InterpMethod) {
    let record = irregular_record(n);
    let grid = AgeGrid::new(record.min_age(), record.max_age(), 0.5)
        .expect("benchmark grid should be valid");

    c.bench_function(case_id, |b| {
        b.iter(|| {
            interpolate(black_box(&record), black_box(&grid), method)
                .expect("interpolation benchmark should succeed");
        })
    });
}

fn binning_benches(c: &mut Criterion) {
    bench_binning(c, "bin_record_n1k_step2", 1_000, 2.0);
    bench_binning(c, "bin_record_n10k_step2", 10_000, 2.0);
    bench_binning(c, "bin_record_n10k_step05", 10_000, 0.5);
}

fn interpolation_benches(c: &mut Criterion) {
    bench_interpolation(c, "interp_linear_n10k", 10_000, InterpMethod::Linear);
    bench_interpolation(c, "interp_pchip_n10k", 10_000, InterpMethod::Pchip);
}

criterion_group!(benches, binning_benches, interpolation_benches);
criterion_main!(benches);
