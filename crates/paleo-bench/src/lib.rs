// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub fn crate_name() -> &'static str {
    "paleo-bench"
}
