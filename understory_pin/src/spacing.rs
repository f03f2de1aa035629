// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box spacing with CSS margin-style shorthand expansion.

use alloc::vec::Vec;
use core::str::FromStr;

use kurbo::{Insets, Size};

use crate::{Length, PinError};

/// Per-side spacing, used to inset the viewport before visibility testing.
///
/// Build it from a shorthand of 1 to 4 values with the same expansion rules as
/// CSS `margin`:
///
/// | values | top | right | bottom | left |
/// |--------|-----|-------|--------|------|
/// | `a`          | a | a | a | a |
/// | `a b`        | a | b | a | b |
/// | `a b c`      | a | b | c | b |
/// | `a b c d`    | a | b | c | d |
///
/// ```
/// use understory_pin::{Length, Spacing};
///
/// let header: Spacing = "64px 0".parse().unwrap();
/// assert_eq!(header.top, Length::Px(64.0));
/// assert_eq!(header.bottom, Length::Px(64.0));
/// assert_eq!(header.left, Length::ZERO);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    /// Space reserved at the top edge.
    pub top: Length,
    /// Space reserved at the right edge.
    pub right: Length,
    /// Space reserved at the bottom edge.
    pub bottom: Length,
    /// Space reserved at the left edge.
    pub left: Length,
}

impl Spacing {
    /// No spacing on any side.
    pub const ZERO: Self = Self::uniform(Length::ZERO);

    /// Spacing with explicit values for every side.
    pub const fn new(top: Length, right: Length, bottom: Length, left: Length) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same spacing on all four sides.
    pub const fn uniform(v: Length) -> Self {
        Self::new(v, v, v, v)
    }

    /// The sides in shorthand order: top, right, bottom, left.
    pub const fn to_array(self) -> [Length; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    pub(crate) fn validate(&self) -> Result<(), PinError> {
        self.to_array().into_iter().try_for_each(Length::validate)
    }

    /// Resolve into absolute insets.
    ///
    /// Vertical sides resolve percentages against `reference.height`,
    /// horizontal sides against `reference.width`.
    pub fn resolve(&self, reference: Size) -> Insets {
        Insets::new(
            self.left.resolve(reference.width),
            self.top.resolve(reference.height),
            self.right.resolve(reference.width),
            self.bottom.resolve(reference.height),
        )
    }
}

/// Expand a 1 to 4 value shorthand into per-side spacing.
///
/// Returns [`PinError::InvalidSpacing`] for empty input or more than four values.
pub fn expand_box_spacing(values: &[Length]) -> Result<Spacing, PinError> {
    match *values {
        [all] => Ok(Spacing::uniform(all)),
        [vertical, horizontal] => Ok(Spacing::new(vertical, horizontal, vertical, horizontal)),
        [top, horizontal, bottom] => Ok(Spacing::new(top, horizontal, bottom, horizontal)),
        [top, right, bottom, left] => Ok(Spacing::new(top, right, bottom, left)),
        _ => Err(PinError::InvalidSpacing {
            count: values.len(),
        }),
    }
}

impl FromStr for Spacing {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Length>, _>>()?;
        expand_box_spacing(&values)
    }
}

impl TryFrom<&[Length]> for Spacing {
    type Error = PinError;

    fn try_from(values: &[Length]) -> Result<Self, Self::Error> {
        expand_box_spacing(values)
    }
}

impl From<Length> for Spacing {
    fn from(v: Length) -> Self {
        Self::uniform(v)
    }
}

impl From<f64> for Spacing {
    fn from(v: f64) -> Self {
        Self::uniform(Length::Px(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Length = Length::Px(1.0);
    const B: Length = Length::Px(2.0);
    const C: Length = Length::Percent(3.0);
    const D: Length = Length::Px(4.0);

    #[test]
    fn shorthand_expansion() {
        assert_eq!(expand_box_spacing(&[A]), Ok(Spacing::new(A, A, A, A)));
        assert_eq!(expand_box_spacing(&[A, B]), Ok(Spacing::new(A, B, A, B)));
        assert_eq!(
            expand_box_spacing(&[A, B, C]),
            Ok(Spacing::new(A, B, C, B)),
            "three values are top, horizontal, bottom"
        );
        assert_eq!(
            expand_box_spacing(&[A, B, C, D]),
            Ok(Spacing::new(A, B, C, D))
        );
    }

    #[test]
    fn expanding_expanded_spacing_is_identity() {
        let s = Spacing::new(A, B, C, D);
        assert_eq!(expand_box_spacing(&s.to_array()), Ok(s));
    }

    #[test]
    fn unsupported_shapes_fail() {
        assert_eq!(
            expand_box_spacing(&[]),
            Err(PinError::InvalidSpacing { count: 0 })
        );
        assert_eq!(
            expand_box_spacing(&[A, A, A, A, A]),
            Err(PinError::InvalidSpacing { count: 5 })
        );
        assert!("1px 2px 3px 4px 5px".parse::<Spacing>().is_err());
        assert!("1px bogus".parse::<Spacing>().is_err());
    }

    #[test]
    fn resolves_percentages_per_axis() {
        let s: Spacing = "10% 5%".parse().unwrap();
        let insets = s.resolve(Size::new(200.0, 100.0));
        assert_eq!(insets, Insets::new(10.0, 10.0, 10.0, 10.0));
    }
}
