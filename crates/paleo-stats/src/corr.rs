// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::PaleoError;

use crate::pvalue::student_t_two_sided;

const MIN_CORR_SAMPLES: usize = 3;

/// Correlation statistic used for whole-series and windowed comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorrMethod {
    #[default]
    Pearson,
    Spearman,
}

impl CorrMethod {
    pub fn parse(raw: &str) -> Result<Self, PaleoError> {
        match raw {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            other => Err(PaleoError::invalid_input(format!(
                "unknown correlation method '{other}'; expected pearson|spearman"
            ))),
        }
    }
}

/// Pearson correlation with its two-sided p-value.
///
/// Fails on length mismatch or fewer than 3 samples; returns `(NaN, NaN)`
/// when either input has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<(f64, f64), PaleoError> {
    check_paired(x, y)?;
    Ok(pearson_unchecked(x, y))
}

/// Spearman rank correlation with its two-sided p-value.
///
/// Computed as Pearson over average ranks; ties share the mean of the ranks
/// they occupy.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<(f64, f64), PaleoError> {
    check_paired(x, y)?;
    Ok(spearman_unchecked(x, y))
}

fn check_paired(x: &[f64], y: &[f64]) -> Result<(), PaleoError> {
    if x.len() != y.len() {
        return Err(PaleoError::invalid_input(format!(
            "correlation inputs must have equal length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_CORR_SAMPLES {
        return Err(PaleoError::invalid_input(format!(
            "correlation requires at least {MIN_CORR_SAMPLES} samples; got {}",
            x.len()
        )));
    }
    Ok(())
}

/// Core Pearson on pre-validated, equal-length inputs; NaN on zero variance
/// or non-finite samples in the pair.
pub(crate) fn pearson_unchecked(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len();
    if n < MIN_CORR_SAMPLES {
        return (f64::NAN, f64::NAN);
    }

    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 || !cov.is_finite() {
        return (f64::NAN, f64::NAN);
    }

    let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);
    (r, p_value_for(r, n))
}

pub(crate) fn spearman_unchecked(x: &[f64], y: &[f64]) -> (f64, f64) {
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    pearson_unchecked(&rx, &ry)
}

fn p_value_for(r: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        // |r| == 1: the statistic is unbounded and the tail mass vanishes.
        return 0.0;
    }
    let t = r * (df / denom).sqrt();
    student_t_two_sided(t, df)
}

/// Average (fractional) ranks, 1-based; tied values share the mean of the
/// rank positions they span.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j (0-based) share the mean 1-based rank.
        let shared = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = shared;
        }
        i = j;
    }
    ranks
}
