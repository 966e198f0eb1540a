// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_stats::{pearson, rolling_correlation, spearman, CorrMethod, RollingConfig};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn paired_series() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 3..64)
        .prop_map(|pairs| pairs.into_iter().unzip())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn pearson_is_symmetric_and_bounded((x, y) in paired_series()) {
        let (r_xy, p_xy) = pearson(&x, &y).expect("pearson should succeed");
        let (r_yx, p_yx) = pearson(&y, &x).expect("pearson should succeed");

        if r_xy.is_finite() {
            prop_assert!((-1.0..=1.0).contains(&r_xy));
            prop_assert!((r_xy - r_yx).abs() < 1e-12);
            prop_assert!((p_xy - p_yx).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&p_xy));
        } else {
            prop_assert!(r_yx.is_nan());
        }
    }

    #[test]
    fn pearson_is_invariant_under_affine_maps(
        (x, y) in paired_series(),
        scale in 0.1f64..10.0,
        shift in -100.0f64..100.0,
    ) {
        let mapped: Vec<f64> = x.iter().map(|v| scale * v + shift).collect();
        let (r_base, _) = pearson(&x, &y).expect("pearson should succeed");
        let (r_mapped, _) = pearson(&mapped, &y).expect("pearson should succeed");

        if r_base.is_finite() && r_mapped.is_finite() {
            prop_assert!((r_base - r_mapped).abs() < 1e-6);
        }
    }

    #[test]
    fn spearman_is_invariant_under_monotone_maps((x, y) in paired_series()) {
        // exp is strictly increasing, so ranks are unchanged.
        let mapped: Vec<f64> = x.iter().map(|v| (v / 25.0).exp()).collect();
        let (r_base, _) = spearman(&x, &y).expect("spearman should succeed");
        let (r_mapped, _) = spearman(&mapped, &y).expect("spearman should succeed");

        if r_base.is_finite() && r_mapped.is_finite() {
            prop_assert!((r_base - r_mapped).abs() < 1e-9);
        }
    }

    #[test]
    fn rolling_rows_are_ordered_and_inside_the_span(
        (x, y) in paired_series(),
        window_frac in 0.2f64..0.9,
        step in 0.5f64..5.0,
    ) {
        let n = x.len();
        let ages: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let span = (n - 1) as f64;
        let window = (window_frac * span).max(0.5);

        let config = RollingConfig { window, step, method: CorrMethod::Pearson };
        let rows = rolling_correlation(&ages, &x, &y, &config)
            .expect("rolling correlation should succeed");

        prop_assert!(!rows.is_empty());
        for pair in rows.windows(2) {
            prop_assert!(pair[1].age_min > pair[0].age_min);
        }
        for row in &rows {
            prop_assert!(row.age_min >= ages[0] - 1e-9);
            prop_assert!(row.age_max <= span + window * 1e-6 + 1e-9);
            if row.r.is_finite() {
                prop_assert!((-1.0..=1.0).contains(&row.r));
                prop_assert!((0.0..=1.0).contains(&row.p_value));
            } else {
                prop_assert!(row.p_value.is_nan());
            }
        }
    }

    #[test]
    fn self_correlation_is_one_wherever_defined(
        values in prop::collection::vec(-50.0f64..50.0, 8..64),
        window in 2.0f64..6.0,
    ) {
        let ages: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let config = RollingConfig { window, step: 1.0, method: CorrMethod::Pearson };
        let rows = rolling_correlation(&ages, &values, &values, &config)
            .expect("rolling correlation should succeed");

        for row in rows {
            if row.r.is_finite() {
                prop_assert!((row.r - 1.0).abs() < 1e-9);
            }
        }
    }
}
