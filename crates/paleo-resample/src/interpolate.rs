// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::{AgeGrid, PaleoError, ProxyRecord};

const MIN_PCHIP_POINTS: usize = 2;

/// Interpolation scheme used when resampling a record onto a grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpMethod {
    /// Piecewise-linear, with linear extrapolation beyond the record ends.
    Linear,
    /// Shape-preserving cubic Hermite (Fritsch-Carlson slopes); the boundary
    /// polynomial extends beyond the record ends.
    Pchip,
}

impl InterpMethod {
    pub fn parse(raw: &str) -> Result<Self, PaleoError> {
        match raw {
            "linear" => Ok(Self::Linear),
            "pchip" => Ok(Self::Pchip),
            other => Err(PaleoError::invalid_input(format!(
                "unknown interpolation method '{other}'; expected linear|pchip"
            ))),
        }
    }
}

/// Evaluates `record` at every grid age. Output length equals grid length.
pub fn interpolate(
    record: &ProxyRecord,
    grid: &AgeGrid,
    method: InterpMethod,
) -> Result<Vec<f64>, PaleoError> {
    let targets = grid.ages();
    interpolate_at(record, &targets, method)
}

/// Evaluates `record` at arbitrary target ages.
pub fn interpolate_at(
    record: &ProxyRecord,
    targets: &[f64],
    method: InterpMethod,
) -> Result<Vec<f64>, PaleoError> {
    match method {
        InterpMethod::Linear => Ok(linear(record.ages(), record.values(), targets)),
        InterpMethod::Pchip => {
            if record.len() < MIN_PCHIP_POINTS {
                return Err(PaleoError::invalid_input(format!(
                    "pchip interpolation requires at least {MIN_PCHIP_POINTS} points; got {}",
                    record.len()
                )));
            }
            let slopes = pchip_slopes(record.ages(), record.values());
            Ok(targets
                .iter()
                .map(|&t| hermite_eval(record.ages(), record.values(), &slopes, t))
                .collect())
        }
    }
}

/// Index of the segment `[ages[i], ages[i+1]]` that evaluation of `t` uses.
///
/// Targets below the first knot use the first segment and targets above the
/// last knot use the last segment, which gives extrapolation by extension.
fn segment_index(ages: &[f64], t: f64) -> usize {
    let last_segment = ages.len() - 2;
    match ages.binary_search_by(|probe| probe.total_cmp(&t)) {
        Ok(i) => i.min(last_segment),
        Err(0) => 0,
        Err(i) => (i - 1).min(last_segment),
    }
}

fn linear(ages: &[f64], values: &[f64], targets: &[f64]) -> Vec<f64> {
    if ages.len() == 1 {
        // Single point: constant, slope 0.
        return vec![values[0]; targets.len()];
    }

    targets
        .iter()
        .map(|&t| {
            let i = segment_index(ages, t);
            let slope = (values[i + 1] - values[i]) / (ages[i + 1] - ages[i]);
            values[i] + slope * (t - ages[i])
        })
        .collect()
}

/// Fritsch-Carlson monotone slopes at each knot.
///
/// Interior slopes are the weighted harmonic mean of adjacent secants, zeroed
/// where the secants change sign or vanish; endpoint slopes come from the
/// one-sided three-point formula, clamped so the end segments stay monotone.
fn pchip_slopes(ages: &[f64], values: &[f64]) -> Vec<f64> {
    let n = ages.len();
    let h: Vec<f64> = (0..n - 1).map(|i| ages[i + 1] - ages[i]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|i| (values[i + 1] - values[i]) / h[i]).collect();

    if n == 2 {
        return vec![delta[0], delta[0]];
    }

    let mut slopes = vec![0.0; n];
    for k in 1..n - 1 {
        let d_prev = delta[k - 1];
        let d_next = delta[k];
        if d_prev == 0.0 || d_next == 0.0 || (d_prev > 0.0) != (d_next > 0.0) {
            slopes[k] = 0.0;
        } else {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            slopes[k] = (w1 + w2) / (w1 / d_prev + w2 / d_next);
        }
    }

    slopes[0] = endpoint_slope(h[0], h[1], delta[0], delta[1]);
    slopes[n - 1] = endpoint_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    slopes
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn endpoint_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let mut slope = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if sign(slope) != sign(d0) {
        slope = 0.0;
    } else if sign(d0) != sign(d1) && slope.abs() > 3.0 * d0.abs() {
        slope = 3.0 * d0;
    }
    slope
}

fn hermite_eval(ages: &[f64], values: &[f64], slopes: &[f64], t: f64) -> f64 {
    let i = segment_index(ages, t);
    let h = ages[i + 1] - ages[i];
    let s = (t - ages[i]) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * values[i] + h10 * h * slopes[i] + h01 * values[i + 1] + h11 * h * slopes[i + 1]
}
