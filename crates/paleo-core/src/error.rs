// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

/// Error type shared across the paleo toolkit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaleoError {
    /// The caller supplied data or parameters the operation cannot accept.
    InvalidInput(String),
    /// A computation produced non-finite or otherwise unusable intermediates.
    NumericalIssue(String),
    /// The requested combination is recognized but not implemented.
    NotSupported(String),
}

impl PaleoError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn numerical_issue(message: impl Into<String>) -> Self {
        Self::NumericalIssue(message.into())
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }
}

impl fmt::Display for PaleoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NumericalIssue(message) => write!(f, "numerical issue: {message}"),
            Self::NotSupported(message) => write!(f, "not supported: {message}"),
        }
    }
}

impl std::error::Error for PaleoError {}
