// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod record;
pub mod table;

pub use diagnostics::Diagnostics;
pub use error::PaleoError;
pub use grid::AgeGrid;
pub use record::ProxyRecord;
pub use table::AlignedTable;

/// Core shared types for the paleo toolkit.
pub fn crate_name() -> &'static str {
    "paleo-core"
}
