// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod butterworth;
pub mod sos;

pub use butterworth::{design_low_pass, filter_record, low_pass};
pub use sos::Biquad;

pub fn crate_name() -> &'static str {
    "paleo-filter"
}
