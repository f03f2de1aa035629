// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Absolute and relative lengths.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::PinError;

/// A length that is either absolute or a percentage of some reference dimension.
///
/// Which dimension a percentage refers to depends on where the length is used:
/// target anchors resolve against the target's size, pinned anchors and offsets
/// against the floating element's size, and viewport offsets against the
/// viewport's size.
///
/// ```
/// use understory_pin::Length;
///
/// let half: Length = "50%".parse().unwrap();
/// assert_eq!(half.resolve(300.0), 150.0);
/// assert_eq!("12px".parse::<Length>().unwrap(), Length::Px(12.0));
/// assert_eq!(Length::from(8.0).resolve(1000.0), 8.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    /// Absolute length in logical pixels.
    Px(f64),
    /// Percentage (`0.0..=100.0` for the usual range) of the reference dimension.
    Percent(f64),
}

impl Length {
    /// The zero length.
    pub const ZERO: Self = Self::Px(0.0);

    /// The full reference dimension (`100%`).
    pub const FULL: Self = Self::Percent(100.0);

    /// Resolve against `reference`, yielding an absolute length.
    #[inline]
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => p / 100.0 * reference,
        }
    }

    /// Whether the magnitude is a finite number.
    #[inline]
    pub fn is_finite(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v.is_finite(),
        }
    }

    /// Reject NaN and infinite magnitudes with [`PinError::InvalidLength`].
    pub(crate) fn validate(self) -> Result<(), PinError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(PinError::InvalidLength(self.to_string()))
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Self::Px(v)
    }
}

impl FromStr for Length {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || PinError::InvalidLength(s.to_string());
        let (number, make): (&str, fn(f64) -> Self) = if let Some(n) = text.strip_suffix('%') {
            (n, Self::Percent)
        } else if let Some(n) = text.strip_suffix("px") {
            (n, Self::Px)
        } else {
            (text, Self::Px)
        };
        let v: f64 = number.trim_end().parse().map_err(|_| invalid())?;
        if !v.is_finite() {
            return Err(invalid());
        }
        Ok(make(v))
    }
}

impl TryFrom<&str> for Length {
    type Error = PinError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Resolve `value` against `reference`; see [`Length::resolve`].
#[inline]
pub fn resolve_length(value: Length, reference: f64) -> f64 {
    value.resolve(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!("25%".parse::<Length>(), Ok(Length::Percent(25.0)));
        assert_eq!("-4px".parse::<Length>(), Ok(Length::Px(-4.0)));
        assert_eq!(" 7 ".parse::<Length>(), Ok(Length::Px(7.0)));
        assert_eq!("1.5 %".parse::<Length>(), Ok(Length::Percent(1.5)));
    }

    #[test]
    fn rejects_unknown_units() {
        assert_eq!(
            "3em".parse::<Length>(),
            Err(PinError::InvalidLength("3em".into()))
        );
        assert!("".parse::<Length>().is_err());
        assert!("inf".parse::<Length>().is_err());
    }

    #[test]
    fn non_finite_magnitudes_fail_validation() {
        assert!(Length::Px(3.0).validate().is_ok());
        assert!(!Length::from(f64::NAN).is_finite());
        assert_eq!(
            Length::Percent(f64::INFINITY).validate(),
            Err(PinError::InvalidLength("inf%".into()))
        );
    }

    #[test]
    fn percent_resolves_against_reference() {
        assert_eq!(resolve_length(Length::Percent(100.0), 20.0), 20.0);
        assert_eq!(resolve_length(Length::Percent(-50.0), 30.0), -15.0);
        assert_eq!(resolve_length(Length::Px(5.0), 30.0), 5.0);
    }
}
