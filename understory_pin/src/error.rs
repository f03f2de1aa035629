// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors surfaced when building pins.

use alloc::string::String;
use core::fmt;

/// Errors reported while parsing pin options or constructing a pin.
///
/// Placement itself never fails: once a pin exists, geometry problems degrade
/// to a best-effort position instead of an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinError {
    /// A textual length was not a number, `<n>px`, or `<n>%`.
    InvalidLength(String),
    /// A box-spacing shorthand had an unsupported number of terms (must be 1 to 4).
    InvalidSpacing {
        /// Number of terms that were supplied.
        count: usize,
    },
    /// The pin was configured without any candidate placements.
    NoCandidates,
    /// A selector did not resolve to an element in the host document.
    UnresolvedElement(String),
    /// The pin identifier is stale (the pin was already removed).
    UnknownPin,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(text) => write!(f, "invalid length `{text}`"),
            Self::InvalidSpacing { count } => {
                write!(f, "box spacing takes 1 to 4 values, got {count}")
            }
            Self::NoCandidates => f.write_str("pin has no candidate placements"),
            Self::UnresolvedElement(selector) => {
                write!(f, "selector `{selector}` did not match any element")
            }
            Self::UnknownPin => f.write_str("pin id is stale"),
        }
    }
}

impl core::error::Error for PinError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            PinError::InvalidLength("12em".into()).to_string(),
            "invalid length `12em`"
        );
        assert_eq!(
            PinError::InvalidSpacing { count: 5 }.to_string(),
            "box spacing takes 1 to 4 values, got 5"
        );
    }
}
