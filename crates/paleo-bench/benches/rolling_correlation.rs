// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paleo_stats::{rolling_correlation, CorrMethod, RollingConfig};

fn paired_series(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let ages: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x: Vec<f64> = ages.iter().map(|a| (a / 23.0).sin()).collect();
    let y: Vec<f64> = ages
        .iter()
        .map(|a| (a / 23.0 + 0.4).sin() + 0.05 * (a / 3.0).cos())
        .collect();
    (ages, x, y)
}

fn bench_rolling(c: &mut Criterion, case_id: &str, n: usize, method: CorrMethod) {
    let (ages, x, y) = paired_series(n);
    let config = RollingConfig {
        window: 100.0,
        step: 10.0,
        method,
    };

    c.bench_function(case_id, |b| {
        b.iter(|| {
            rolling_correlation(
                black_box(&ages),
                black_box(&x),
                black_box(&y),
                black_box(&config),
            )
            .expect("rolling benchmark should succeed");
        })
    });
}

fn rolling_benches(c: &mut Criterion) {
    bench_rolling(c, "rolling_pearson_n2k", 2_000, CorrMethod::Pearson);
    bench_rolling(c, "rolling_pearson_n20k", 20_000, CorrMethod::Pearson);
    bench_rolling(c, "rolling_spearman_n2k", 2_000, CorrMethod::Spearman);
}

criterion_group!(benches, rolling_benches);
criterion_main!(benches);
