// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::{PaleoError, ProxyRecord};

/// Parses two-column `age,value` CSV text into a record.
///
/// An optional single header row is skipped when its cells are non-numeric
/// and the following row parses. Rows with an empty age or value cell, or an
/// unparsable value cell, become NaN and are dropped by record construction;
/// a non-empty unparsable age cell is an error.
pub fn parse_record_csv(raw: &str) -> Result<ProxyRecord, PaleoError> {
    let rows: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if rows.is_empty() {
        return Err(PaleoError::invalid_input("CSV input is empty"));
    }

    let data_rows = if rows.len() > 1 && first_row_looks_like_header(rows[0], rows[1]) {
        &rows[1..]
    } else {
        &rows[..]
    };

    let mut pairs = Vec::with_capacity(data_rows.len());
    for (row_idx, row) in data_rows.iter().enumerate() {
        let cells: Vec<&str> = row.split(',').map(str::trim).collect();
        if cells.len() != 2 {
            return Err(PaleoError::invalid_input(format!(
                "CSV row {} has {} columns but expected 2 (age,value)",
                row_idx + 1,
                cells.len()
            )));
        }

        // An empty age cell is a missing field, dropped with the row; only
        // non-empty garbage is a hard error.
        let age = if cells[0].is_empty() {
            f64::NAN
        } else {
            cells[0].parse::<f64>().map_err(|_| {
                PaleoError::invalid_input(format!(
                    "CSV row {} has unparsable age '{}'",
                    row_idx + 1,
                    cells[0]
                ))
            })?
        };
        // Empty or non-numeric value cells are missing data, not a hard
        // error; the record constructor drops them.
        let value = cells[1].parse::<f64>().unwrap_or(f64::NAN);
        pairs.push((age, value));
    }

    ProxyRecord::from_rows(&pairs)
}

fn first_row_looks_like_header(first_row: &str, second_row: &str) -> bool {
    let first_cells: Vec<&str> = first_row.split(',').map(str::trim).collect();
    let second_cells: Vec<&str> = second_row.split(',').map(str::trim).collect();

    if first_cells.is_empty()
        || first_cells.len() != second_cells.len()
        || first_cells.iter().any(|cell| cell.is_empty())
    {
        return false;
    }

    let first_all_non_numeric = first_cells.iter().all(|cell| cell.parse::<f64>().is_err());
    let second_all_numeric = second_cells.iter().all(|cell| cell.parse::<f64>().is_ok());

    first_all_non_numeric && second_all_numeric
}

pub fn crate_name() -> &'static str {
    let _ = (
        paleo_core::crate_name(),
        paleo_resample::crate_name(),
        paleo_filter::crate_name(),
        paleo_stats::crate_name(),
        paleo_detect::crate_name(),
    );
    "paleo-cli"
}
