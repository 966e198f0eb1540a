// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::{AgeGrid, PaleoError, ProxyRecord};
use paleo_resample::{interpolate, InterpMethod};

use crate::sos::{run_cascade, Biquad};

const MIN_FILTER_INPUT_LEN: usize = 2;

/// Designs an order-N Butterworth low-pass as a second-order-section cascade.
///
/// Analog prototype poles are prewarped for the bilinear transform so the
/// digital -3 dB point lands exactly on `cutoff_hz`. Each section's numerator
/// places its zeros at the Nyquist frequency and is scaled to unit DC gain.
pub fn design_low_pass(
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Vec<Biquad>, PaleoError> {
    if order == 0 {
        return Err(PaleoError::invalid_input("filter order must be >= 1"));
    }
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
        return Err(PaleoError::invalid_input(format!(
            "cutoff frequency must be finite and > 0; got {cutoff_hz}"
        )));
    }
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(PaleoError::invalid_input(format!(
            "sample rate must be finite and > 0; got {sample_rate_hz}"
        )));
    }
    let nyquist = sample_rate_hz / 2.0;
    if cutoff_hz >= nyquist {
        return Err(PaleoError::invalid_input(format!(
            "cutoff frequency {cutoff_hz} must lie below the Nyquist frequency {nyquist}"
        )));
    }

    let fs2 = 2.0 * sample_rate_hz;
    // Prewarped analog cutoff.
    let warped = fs2 * (std::f64::consts::PI * cutoff_hz / sample_rate_hz).tan();

    let mut sections = Vec::with_capacity(order / 2 + order % 2);

    // Conjugate pole pairs of the analog prototype, scaled by the warped
    // cutoff and mapped through the bilinear transform.
    for k in 0..order / 2 {
        let theta = std::f64::consts::PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
        let pole_re = -warped * theta.sin();
        let pole_im = warped * theta.cos();

        // z = (fs2 + p) / (fs2 - p) for p = pole_re + i*pole_im.
        let denom = (fs2 - pole_re) * (fs2 - pole_re) + pole_im * pole_im;
        let z_re = ((fs2 + pole_re) * (fs2 - pole_re) - pole_im * pole_im) / denom;
        let z_im = (pole_im * (fs2 - pole_re) + (fs2 + pole_re) * pole_im) / denom;

        let a1 = -2.0 * z_re;
        let a2 = z_re * z_re + z_im * z_im;
        // Zeros at z = -1; numerator (1 + q^-1)^2 scaled to DC gain 1.
        let b0 = (1.0 + a1 + a2) / 4.0;
        sections.push(Biquad {
            b0,
            b1: 2.0 * b0,
            b2: b0,
            a1,
            a2,
        });
    }

    if order % 2 == 1 {
        // The real pole at -warped maps to a first-order section.
        let z = (fs2 - warped) / (fs2 + warped);
        let a1 = -z;
        let b0 = (1.0 + a1) / 2.0;
        sections.push(Biquad {
            b0,
            b1: b0,
            b2: 0.0,
            a1,
            a2: 0.0,
        });
    }

    Ok(sections)
}

/// Padding length for the forward-backward pass.
fn pad_len(order: usize, n: usize) -> usize {
    (3 * (2 * order + 1)).min(n - 1)
}

/// Odd reflection of the signal about its endpoints.
fn reflect_pad(values: &[f64], pad: usize) -> Vec<f64> {
    let n = values.len();
    let mut padded = Vec::with_capacity(n + 2 * pad);
    let first = values[0];
    let last = values[n - 1];
    for i in (1..=pad).rev() {
        padded.push(2.0 * first - values[i]);
    }
    padded.extend_from_slice(values);
    for i in (1..=pad).rev() {
        padded.push(2.0 * last - values[n - 1 - i]);
    }
    padded
}

/// Applies a Butterworth low-pass forward then backward (zero phase).
///
/// `cutoff_period` and `sample_interval` are in age units; the design cutoff
/// is `1 / cutoff_period` at sampling rate `1 / sample_interval`. Odd
/// reflection padding of `3 * (2*order + 1)` samples (clamped to `n - 1`)
/// suppresses edge transients. Output length equals input length.
pub fn low_pass(
    values: &[f64],
    cutoff_period: f64,
    sample_interval: f64,
    order: usize,
) -> Result<Vec<f64>, PaleoError> {
    if values.len() < MIN_FILTER_INPUT_LEN {
        return Err(PaleoError::invalid_input(format!(
            "low_pass requires at least {MIN_FILTER_INPUT_LEN} samples; got {}",
            values.len()
        )));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(PaleoError::invalid_input(format!(
            "low_pass input must be finite; got {bad}"
        )));
    }
    if !cutoff_period.is_finite() || cutoff_period <= 0.0 {
        return Err(PaleoError::invalid_input(format!(
            "cutoff period must be finite and > 0; got {cutoff_period}"
        )));
    }
    if !sample_interval.is_finite() || sample_interval <= 0.0 {
        return Err(PaleoError::invalid_input(format!(
            "sample interval must be finite and > 0; got {sample_interval}"
        )));
    }

    let sections = design_low_pass(1.0 / cutoff_period, 1.0 / sample_interval, order)?;
    let pad = pad_len(order, values.len());

    let mut work = reflect_pad(values, pad);
    run_cascade(&sections, &mut work);
    work.reverse();
    run_cascade(&sections, &mut work);
    work.reverse();

    let out: Vec<f64> = work[pad..pad + values.len()].to_vec();
    if out.iter().any(|v| !v.is_finite()) {
        return Err(PaleoError::numerical_issue(
            "low_pass produced non-finite output",
        ));
    }
    Ok(out)
}

/// Interpolates a record onto `grid` (linear) and low-passes it there, with
/// the sampling interval taken from the grid step.
pub fn filter_record(
    record: &ProxyRecord,
    grid: &AgeGrid,
    cutoff_period: f64,
    order: usize,
) -> Result<Vec<f64>, PaleoError> {
    let resampled = interpolate(record, grid, InterpMethod::Linear)?;
    low_pass(&resampled, cutoff_period, grid.step(), order)
}
