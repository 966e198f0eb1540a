// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::PaleoError;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::corr::{pearson_unchecked, spearman_unchecked, CorrMethod};

/// Relative slack applied to the final window position so float accumulation
/// along the sweep cannot drop the last admissible window.
const WINDOW_SWEEP_RELATIVE_TOL: f64 = 1.0e-9;
const MIN_ROLLING_SAMPLES: usize = 2;

/// Sliding-window setup; `window` and `step` are widths in age units.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollingConfig {
    pub window: f64,
    pub step: f64,
    pub method: CorrMethod,
}

impl RollingConfig {
    fn validate(&self) -> Result<(), PaleoError> {
        if !self.window.is_finite() || self.window <= 0.0 {
            return Err(PaleoError::invalid_input(format!(
                "rolling window must be finite and > 0; got {}",
                self.window
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(PaleoError::invalid_input(format!(
                "rolling step must be finite and > 0; got {}",
                self.step
            )));
        }
        Ok(())
    }
}

/// One window of a rolling correlation sweep.
///
/// `r` and `p_value` are NaN when the window held fewer than 3 samples or
/// either input had zero variance there.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowCorrelation {
    pub center: f64,
    pub age_min: f64,
    pub age_max: f64,
    pub r: f64,
    pub p_value: f64,
    pub n_samples: usize,
}

/// Correlates `x` against `y` in windows sliding along a shared age axis.
///
/// The window start sweeps from the first age in increments of `config.step`
/// while the full window still fits inside the covered span; samples with
/// `age` in `[start, start + window]` (inclusive) enter each window. Output
/// order follows the sweep; with the `rayon` feature the windows are
/// evaluated in parallel without changing that order.
pub fn rolling_correlation(
    ages: &[f64],
    x: &[f64],
    y: &[f64],
    config: &RollingConfig,
) -> Result<Vec<WindowCorrelation>, PaleoError> {
    config.validate()?;

    if ages.len() != x.len() || ages.len() != y.len() {
        return Err(PaleoError::invalid_input(format!(
            "ages/x/y must have equal length: {} vs {} vs {}",
            ages.len(),
            x.len(),
            y.len()
        )));
    }
    if ages.len() < MIN_ROLLING_SAMPLES {
        return Err(PaleoError::invalid_input(format!(
            "rolling correlation requires at least {MIN_ROLLING_SAMPLES} samples; got {}",
            ages.len()
        )));
    }
    if ages.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(PaleoError::invalid_input(
            "ages must be sorted ascending for rolling correlation",
        ));
    }
    if let Some(bad) = ages.iter().find(|a| !a.is_finite()) {
        return Err(PaleoError::invalid_input(format!(
            "ages must be finite; got {bad}"
        )));
    }

    let first = ages[0];
    let last = ages[ages.len() - 1];
    let span = last - first;
    let tol = WINDOW_SWEEP_RELATIVE_TOL * span.max(1.0);
    if config.window > span + tol {
        return Err(PaleoError::invalid_input(format!(
            "window {} exceeds the covered age span {span}",
            config.window
        )));
    }

    let mut starts = Vec::new();
    let mut i = 0usize;
    loop {
        let start = first + i as f64 * config.step;
        if start + config.window > last + tol {
            break;
        }
        starts.push(start);
        i += 1;
    }

    let evaluate = |&start: &f64| -> WindowCorrelation {
        let end = start + config.window;
        let lo = ages.partition_point(|&a| a < start);
        let hi = ages.partition_point(|&a| a <= end);
        let n_samples = hi - lo;

        let (r, p_value) = match config.method {
            CorrMethod::Pearson => pearson_unchecked(&x[lo..hi], &y[lo..hi]),
            CorrMethod::Spearman => spearman_unchecked(&x[lo..hi], &y[lo..hi]),
        };

        WindowCorrelation {
            center: start + config.window / 2.0,
            age_min: start,
            age_max: end,
            r,
            p_value,
            n_samples,
        }
    };

    #[cfg(feature = "rayon")]
    let out: Vec<WindowCorrelation> = starts.par_iter().map(evaluate).collect();
    #[cfg(not(feature = "rayon"))]
    let out: Vec<WindowCorrelation> = starts.iter().map(evaluate).collect();

    Ok(out)
}
