// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PaleoError;

/// Relative tolerance used when deciding whether the accumulated grid age has
/// passed `end`; absorbs float accumulation error over long grids.
const GRID_END_RELATIVE_TOL: f64 = 1.0e-9;

/// A uniform age grid: `start, start + step, ...` up to and including `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgeGrid {
    start: f64,
    end: f64,
    step: f64,
}

impl AgeGrid {
    /// Constructs a validated grid with at least two points.
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self, PaleoError> {
        if !start.is_finite() || !end.is_finite() || !step.is_finite() {
            return Err(PaleoError::invalid_input(format!(
                "grid parameters must be finite: start={start}, end={end}, step={step}"
            )));
        }
        if step <= 0.0 {
            return Err(PaleoError::invalid_input(format!(
                "grid step must be > 0; got {step}"
            )));
        }
        if start >= end {
            return Err(PaleoError::invalid_input(format!(
                "grid requires start < end; got start={start}, end={end}"
            )));
        }
        if step > end - start {
            return Err(PaleoError::invalid_input(format!(
                "grid step {step} exceeds covered span {}; grid would have a single point",
                end - start
            )));
        }
        Ok(Self { start, end, step })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Half of the grid step; the binning window extends this far on each side.
    pub fn half_window(&self) -> f64 {
        self.step / 2.0
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        let span = (self.end - self.start) / self.step;
        let tol = GRID_END_RELATIVE_TOL * span.max(1.0);
        (span + tol).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        // Validation guarantees at least two points.
        false
    }

    /// Materializes the grid ages.
    ///
    /// Each age is computed as `start + i * step` rather than accumulated, so
    /// long grids do not drift.
    pub fn ages(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}
