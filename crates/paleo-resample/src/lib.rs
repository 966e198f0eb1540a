// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod binning;
pub mod interpolate;

pub use binning::{bin_record, bin_records, BinnedSeries};
pub use interpolate::{interpolate, InterpMethod};

pub fn crate_name() -> &'static str {
    "paleo-resample"
}
