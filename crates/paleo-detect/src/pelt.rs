// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::{Diagnostics, PaleoError};
use std::borrow::Cow;
use std::time::Instant;

use crate::rbf::RbfCost;

const DEFAULT_MIN_SEGMENT_LEN: usize = 2;
const ALGORITHM_NAME: &str = "pelt-rbf";

/// Configuration for [`detect_changepoints`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeltConfig {
    /// Penalty added per change point; larger values mean fewer changes.
    pub penalty: f64,
    /// Minimum samples per segment.
    pub min_segment_len: usize,
    /// RBF bandwidth; `None` resolves it from the data.
    pub gamma: Option<f64>,
}

impl PeltConfig {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            min_segment_len: DEFAULT_MIN_SEGMENT_LEN,
            gamma: None,
        }
    }

    fn validate(&self) -> Result<(), PaleoError> {
        if !self.penalty.is_finite() || self.penalty <= 0.0 {
            return Err(PaleoError::invalid_input(format!(
                "PeltConfig.penalty must be finite and > 0; got {}",
                self.penalty
            )));
        }
        if self.min_segment_len == 0 {
            return Err(PaleoError::invalid_input(
                "PeltConfig.min_segment_len must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Segmentation of a series into homogeneous regimes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChangePointResult {
    /// Strictly increasing segment ends in sample indices, terminated by `n`.
    pub breakpoints: Vec<usize>,
    /// Ages of the first sample of each new regime (internal breakpoints
    /// mapped through the age axis).
    pub change_ages: Vec<f64>,
    pub diagnostics: Diagnostics,
}

/// Exact penalized segmentation of `values` by the PELT dynamic program
/// under an RBF kernel cost.
///
/// Ties between equal-objective splits resolve to the leftmost split. A
/// series too short to hold two minimum-length segments comes back as the
/// trivial segmentation `[n]` with a note in the diagnostics.
pub fn detect_changepoints(
    ages: &[f64],
    values: &[f64],
    config: &PeltConfig,
) -> Result<ChangePointResult, PaleoError> {
    config.validate()?;
    let started_at = Instant::now();

    if ages.len() != values.len() {
        return Err(PaleoError::invalid_input(format!(
            "ages/values must have equal length: {} vs {}",
            ages.len(),
            values.len()
        )));
    }
    if values.is_empty() {
        return Err(PaleoError::invalid_input(
            "detect_changepoints requires a non-empty series",
        ));
    }
    if ages.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(PaleoError::invalid_input(
            "ages must be sorted ascending for change-point detection",
        ));
    }

    let n = values.len();
    let mut diagnostics = Diagnostics {
        n,
        algorithm: Cow::Borrowed(ALGORITHM_NAME),
        ..Diagnostics::default()
    };

    if n < 2 * config.min_segment_len {
        diagnostics.notes.push(format!(
            "series of {n} samples cannot hold two segments of {}; returning trivial segmentation",
            config.min_segment_len
        ));
        diagnostics.runtime_ms = Some(started_at.elapsed().as_millis() as u64);
        return Ok(ChangePointResult {
            breakpoints: vec![n],
            change_ages: vec![],
            diagnostics,
        });
    }

    let cost = RbfCost::new(values, config.gamma)?;
    if cost.gamma_was_auto() {
        diagnostics
            .notes
            .push(format!("rbf.gamma_auto={}", cost.gamma()));
    }

    let breakpoints = run_pelt(&cost, n, config.penalty, config.min_segment_len)?;

    let change_ages = breakpoints
        .iter()
        .filter(|&&bp| bp != n)
        .map(|&bp| ages[bp])
        .collect();

    diagnostics.runtime_ms = Some(started_at.elapsed().as_millis() as u64);
    Ok(ChangePointResult {
        breakpoints,
        change_ages,
        diagnostics,
    })
}

/// Penalized PELT sweep with candidate pruning.
fn run_pelt(
    cost: &RbfCost,
    n: usize,
    penalty: f64,
    min_segment_len: usize,
) -> Result<Vec<usize>, PaleoError> {
    let inf = f64::INFINITY;
    // best[t]: optimal objective over [0, t); last_cp[t]: start of its final
    // segment.
    let mut best = vec![inf; n + 1];
    let mut last_cp = vec![0usize; n + 1];
    best[0] = -penalty;

    // Admissible last-change positions, always ascending.
    let mut candidates: Vec<usize> = vec![0];

    for t in min_segment_len..=n {
        let mut best_obj = inf;
        let mut best_start = 0usize;
        // Candidates ascend and improvement is strict, so equal objectives
        // keep the leftmost split.
        for &s in &candidates {
            if t - s < min_segment_len {
                continue;
            }
            let obj = best[s] + cost.segment_cost(s, t) + penalty;
            if obj < best_obj {
                best_obj = obj;
                best_start = s;
            }
        }

        if !best_obj.is_finite() {
            return Err(PaleoError::numerical_issue(format!(
                "non-finite objective at t={t}"
            )));
        }

        best[t] = best_obj;
        last_cp[t] = best_start;

        // PELT pruning: a candidate already beaten without its penalty can
        // never become optimal for a later end. Positions the minimum-length
        // rule has not admitted yet are kept untouched.
        candidates.retain(|&s| {
            t - s < min_segment_len || best[s] + cost.segment_cost(s, t) <= best_obj
        });
        // t itself becomes an admissible segment start for later ends.
        candidates.push(t);
    }

    let mut breakpoints = vec![n];
    let mut cursor = n;
    while cursor > 0 {
        let start = last_cp[cursor];
        if start == 0 {
            break;
        }
        breakpoints.push(start);
        cursor = start;
    }
    breakpoints.reverse();
    Ok(breakpoints)
}

#[cfg(test)]
mod tests {
    use super::{detect_changepoints, PeltConfig};
    use paleo_core::PaleoError;

    fn uniform_ages(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn step_signal(segments: &[(usize, f64)]) -> Vec<f64> {
        let mut out = Vec::new();
        for &(len, level) in segments {
            out.extend(std::iter::repeat(level).take(len));
        }
        out
    }

    fn assert_strictly_increasing(values: &[usize]) {
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1], "breakpoints must strictly increase");
        }
    }

    #[test]
    fn single_level_shift_is_found_at_the_shift() {
        let values = step_signal(&[(30, 0.0), (30, 8.0)]);
        let ages = uniform_ages(values.len());

        let result = detect_changepoints(&ages, &values, &PeltConfig::new(1.0))
            .expect("detection should succeed");
        assert_eq!(result.breakpoints, vec![30, 60]);
        assert_eq!(result.change_ages, vec![30.0]);
        assert_eq!(result.diagnostics.n, 60);
        assert_eq!(result.diagnostics.algorithm, "pelt-rbf");
    }

    #[test]
    fn two_level_shifts_are_both_found() {
        let values = step_signal(&[(25, 0.0), (25, 6.0), (25, -3.0)]);
        let ages = uniform_ages(values.len());

        let result = detect_changepoints(&ages, &values, &PeltConfig::new(1.0))
            .expect("detection should succeed");
        assert_eq!(result.breakpoints, vec![25, 50, 75]);
        assert_eq!(result.change_ages, vec![25.0, 50.0]);
        assert_strictly_increasing(&result.breakpoints);
    }

    #[test]
    fn constant_series_has_no_changes_with_reasonable_penalty() {
        let values = vec![4.25; 80];
        let ages = uniform_ages(80);

        let result = detect_changepoints(&ages, &values, &PeltConfig::new(5.0))
            .expect("detection should succeed");
        assert_eq!(result.breakpoints, vec![80]);
        assert!(result.change_ages.is_empty());
    }

    #[test]
    fn noisy_shift_is_found_within_a_few_samples() {
        // Deterministic low-amplitude wiggle around two well-separated levels.
        let values: Vec<f64> = (0..100)
            .map(|i| {
                let level = if i < 50 { 0.0 } else { 5.0 };
                level + 0.3 * ((i * 37 % 17) as f64 / 17.0 - 0.5)
            })
            .collect();
        let ages = uniform_ages(100);

        let result = detect_changepoints(&ages, &values, &PeltConfig::new(3.0))
            .expect("detection should succeed");
        assert_eq!(*result.breakpoints.last().expect("terminal entry"), 100);
        let internal: Vec<usize> = result
            .breakpoints
            .iter()
            .copied()
            .filter(|&bp| bp != 100)
            .collect();
        assert_eq!(internal.len(), 1, "breakpoints: {:?}", result.breakpoints);
        assert!((48..=52).contains(&internal[0]));
    }

    #[test]
    fn detection_is_deterministic() {
        let values = step_signal(&[(20, 1.0), (20, -1.0), (20, 3.0)]);
        let ages = uniform_ages(values.len());
        let config = PeltConfig::new(2.0);

        let first = detect_changepoints(&ages, &values, &config)
            .expect("detection should succeed");
        let second = detect_changepoints(&ages, &values, &config)
            .expect("detection should succeed");
        assert_eq!(first.breakpoints, second.breakpoints);
        assert_eq!(first.change_ages, second.change_ages);
    }

    #[test]
    fn larger_penalty_never_finds_more_changes() {
        let values = step_signal(&[(15, 0.0), (15, 4.0), (15, 0.5), (15, 6.0)]);
        let ages = uniform_ages(values.len());

        let loose = detect_changepoints(&ages, &values, &PeltConfig::new(0.5))
            .expect("detection should succeed");
        let strict = detect_changepoints(&ages, &values, &PeltConfig::new(50.0))
            .expect("detection should succeed");
        assert!(strict.breakpoints.len() <= loose.breakpoints.len());
    }

    #[test]
    fn min_segment_len_suppresses_short_segments() {
        let values = step_signal(&[(4, 0.0), (4, 9.0), (40, 0.0)]);
        let ages = uniform_ages(values.len());
        let config = PeltConfig {
            penalty: 1.0,
            min_segment_len: 10,
            gamma: None,
        };

        let result =
            detect_changepoints(&ages, &values, &config).expect("detection should succeed");
        let mut start = 0;
        for &bp in &result.breakpoints {
            assert!(bp - start >= 10, "segment [{start}, {bp}) too short");
            start = bp;
        }
    }

    #[test]
    fn short_series_returns_trivial_segmentation_with_a_note() {
        let values = vec![1.0, 2.0, 3.0];
        let ages = uniform_ages(3);
        let config = PeltConfig {
            penalty: 1.0,
            min_segment_len: 2,
            gamma: None,
        };

        let result =
            detect_changepoints(&ages, &values, &config).expect("detection should succeed");
        assert_eq!(result.breakpoints, vec![3]);
        assert!(result.change_ages.is_empty());
        assert!(result
            .diagnostics
            .notes
            .iter()
            .any(|note| note.contains("trivial segmentation")));
    }

    #[test]
    fn auto_gamma_is_noted_in_diagnostics() {
        let values = step_signal(&[(20, 0.0), (20, 5.0)]);
        let ages = uniform_ages(values.len());

        let auto = detect_changepoints(&ages, &values, &PeltConfig::new(1.0))
            .expect("detection should succeed");
        assert!(auto
            .diagnostics
            .notes
            .iter()
            .any(|note| note.starts_with("rbf.gamma_auto=")));

        let fixed = detect_changepoints(
            &ages,
            &values,
            &PeltConfig {
                penalty: 1.0,
                min_segment_len: 2,
                gamma: Some(0.5),
            },
        )
        .expect("detection should succeed");
        assert!(!fixed
            .diagnostics
            .notes
            .iter()
            .any(|note| note.starts_with("rbf.gamma_auto=")));
    }

    #[test]
    fn rejects_invalid_config_and_inputs() {
        let ages = uniform_ages(10);
        let values = vec![1.0; 10];

        let err = detect_changepoints(&ages, &values, &PeltConfig::new(0.0))
            .expect_err("zero penalty must fail");
        assert!(matches!(err, PaleoError::InvalidInput(_)));

        let err = detect_changepoints(&ages, &values, &PeltConfig::new(f64::NAN))
            .expect_err("NaN penalty must fail");
        assert!(err.to_string().contains("penalty"));

        let bad_config = PeltConfig {
            penalty: 1.0,
            min_segment_len: 0,
            gamma: None,
        };
        assert!(detect_changepoints(&ages, &values, &bad_config).is_err());

        let err = detect_changepoints(&ages[..5], &values, &PeltConfig::new(1.0))
            .expect_err("length mismatch must fail");
        assert!(err.to_string().contains("equal length"));

        let mut with_nan = values.clone();
        with_nan[3] = f64::NAN;
        let err = detect_changepoints(&ages, &with_nan, &PeltConfig::new(1.0))
            .expect_err("NaN value must fail");
        assert!(err.to_string().contains("finite"));

        let unsorted = vec![0.0, 2.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let err = detect_changepoints(&unsorted, &values, &PeltConfig::new(1.0))
            .expect_err("unsorted ages must fail");
        assert!(err.to_string().contains("sorted ascending"));
    }
}
