// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod corr;
pub mod pvalue;
pub mod rolling;

pub use corr::{pearson, spearman, CorrMethod};
pub use rolling::{rolling_correlation, RollingConfig, WindowCorrelation};

pub fn crate_name() -> &'static str {
    "paleo-stats"
}
