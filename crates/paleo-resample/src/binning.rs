// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::{AgeGrid, AlignedTable, PaleoError, ProxyRecord};

/// A record resampled onto a uniform age grid by windowed averaging.
///
/// Grid points whose window caught no input samples carry `f64::NAN`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedSeries {
    ages: Vec<f64>,
    values: Vec<f64>,
}

impl BinnedSeries {
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Grid points that caught at least one input sample.
    pub fn coverage(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

/// Resamples a record onto `grid` by averaging samples within
/// `[grid_age - step/2, grid_age + step/2]`, both ends inclusive.
///
/// Empty windows yield `f64::NAN`, never an error. The record's own
/// construction already dropped incomplete rows and duplicate ages, so every
/// surviving sample participates in at most the windows that cover its age.
pub fn bin_record(record: &ProxyRecord, grid: &AgeGrid) -> Result<BinnedSeries, PaleoError> {
    let grid_ages = grid.ages();
    let half_window = grid.half_window();
    let ages = record.ages();
    let values = record.values();

    let mut out = Vec::with_capacity(grid_ages.len());
    // Ages are sorted, so each window is a contiguous run; advance a cursor
    // instead of rescanning the record per grid point.
    let mut lower = 0usize;
    for &grid_age in &grid_ages {
        let window_min = grid_age - half_window;
        let window_max = grid_age + half_window;

        while lower < ages.len() && ages[lower] < window_min {
            lower += 1;
        }
        let mut upper = lower;
        let mut sum = 0.0;
        while upper < ages.len() && ages[upper] <= window_max {
            sum += values[upper];
            upper += 1;
        }

        let count = upper - lower;
        if count == 0 {
            out.push(f64::NAN);
        } else {
            out.push(sum / count as f64);
        }
    }

    Ok(BinnedSeries {
        ages: grid_ages,
        values: out,
    })
}

/// Bins several named records onto one grid and merges them into a table
/// keyed by grid age.
pub fn bin_records(
    named_records: &[(&str, &ProxyRecord)],
    grid: &AgeGrid,
) -> Result<AlignedTable, PaleoError> {
    if named_records.is_empty() {
        return Err(PaleoError::invalid_input(
            "bin_records requires at least one record",
        ));
    }

    let mut table = AlignedTable::new(grid.ages())?;
    for (name, record) in named_records {
        let binned = bin_record(record, grid)?;
        table.insert_column(*name, binned.values)?;
    }
    Ok(table)
}
