// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PaleoError;

/// A table of aligned series sharing one age axis.
///
/// Missing cells are `f64::NAN`; the age column has no missing entries.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedTable {
    ages: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl AlignedTable {
    /// Creates a table keyed by the given age axis.
    pub fn new(ages: Vec<f64>) -> Result<Self, PaleoError> {
        if ages.is_empty() {
            return Err(PaleoError::invalid_input("table age axis must be non-empty"));
        }
        if let Some(bad) = ages.iter().find(|age| !age.is_finite()) {
            return Err(PaleoError::invalid_input(format!(
                "table age axis must be finite; got {bad}"
            )));
        }
        Ok(Self {
            ages,
            columns: vec![],
        })
    }

    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Number of rows (grid points).
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Adds a named column; rejects length mismatches and duplicate names.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), PaleoError> {
        let name = name.into();
        if values.len() != self.ages.len() {
            return Err(PaleoError::invalid_input(format!(
                "column '{name}' length mismatch: got {}, expected {}",
                values.len(),
                self.ages.len()
            )));
        }
        if self.column(&name).is_some() {
            return Err(PaleoError::invalid_input(format!(
                "column '{name}' already present in table"
            )));
        }
        self.columns.push((name, values));
        Ok(())
    }
}
