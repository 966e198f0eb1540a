// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod pelt;
pub mod rbf;

pub use pelt::{detect_changepoints, ChangePointResult, PeltConfig};

pub fn crate_name() -> &'static str {
    "paleo-detect"
}
