// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::collections::HashSet;

use crate::PaleoError;

/// A cleaned proxy time series: age-sorted, duplicate-free, all-finite.
///
/// Raw measurement tables routinely carry empty cells and repeated depths
/// that resolve to the same age-model age. Construction applies the cleanup
/// every downstream operation relies on: rows with a non-finite age or value
/// are dropped, duplicate ages are dropped keep-first (first row in input
/// order wins), and the survivors are sorted by ascending age.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyRecord {
    ages: Vec<f64>,
    values: Vec<f64>,
}

impl ProxyRecord {
    /// Builds a record from raw (age, value) rows.
    ///
    /// Fails only when no valid row survives the cleanup.
    pub fn from_rows(rows: &[(f64, f64)]) -> Result<Self, PaleoError> {
        let mut seen_ages: HashSet<u64> = HashSet::with_capacity(rows.len());
        let mut kept: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

        for &(age, value) in rows {
            if !age.is_finite() || !value.is_finite() {
                continue;
            }
            // Adding 0.0 collapses -0.0 onto +0.0 so the two bit patterns
            // count as the same age.
            let bits = (age + 0.0).to_bits();
            if !seen_ages.insert(bits) {
                continue;
            }
            kept.push((age, value));
        }

        if kept.is_empty() {
            return Err(PaleoError::invalid_input(
                "no valid rows remain after dropping incomplete and duplicate-age entries",
            ));
        }

        kept.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (ages, values) = kept.into_iter().unzip();
        Ok(Self { ages, values })
    }

    /// Builds a record from parallel age and value columns.
    pub fn from_columns(ages: &[f64], values: &[f64]) -> Result<Self, PaleoError> {
        if ages.len() != values.len() {
            return Err(PaleoError::invalid_input(format!(
                "age/value column length mismatch: {} vs {}",
                ages.len(),
                values.len()
            )));
        }
        let rows: Vec<(f64, f64)> = ages.iter().copied().zip(values.iter().copied()).collect();
        Self::from_rows(&rows)
    }

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
        // Construction guarantees at least one row.
        false
    }

    pub fn min_age(&self) -> f64 {
        self.ages[0]
    }

    pub fn max_age(&self) -> f64 {
        self.ages[self.ages.len() - 1]
    }

    /// Covered age span; zero for a single-sample record.
    pub fn age_span(&self) -> f64 {
        self.max_age() - self.min_age()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ages
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}
