// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate placement rules.

use crate::{Length, PinError, Spacing};

/// A 2D point expressed in [`Length`]s.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Anchor {
    /// Horizontal component.
    pub x: Length,
    /// Vertical component.
    pub y: Length,
}

impl Anchor {
    /// The top-left corner (`0, 0`).
    pub const TOP_LEFT: Self = Self::new(Length::ZERO, Length::ZERO);

    /// Create an anchor from two lengths.
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    /// Create an anchor from two percentages.
    pub const fn percent(x: f64, y: f64) -> Self {
        Self::new(Length::Percent(x), Length::Percent(y))
    }

    /// Create an anchor from two absolute lengths.
    pub const fn px(x: f64, y: f64) -> Self {
        Self::new(Length::Px(x), Length::Px(y))
    }

    pub(crate) fn validate(&self) -> Result<(), PinError> {
        self.x.validate()?;
        self.y.validate()
    }
}

impl<X: Into<Length>, Y: Into<Length>> From<(X, Y)> for Anchor {
    fn from((x, y): (X, Y)) -> Self {
        Self::new(x.into(), y.into())
    }
}

/// One way of placing the floating element relative to the target.
///
/// The point at [`target`](Self::target) on the target rectangle is aligned
/// with the point at [`pinned`](Self::pinned) on the floating element, and the
/// result is shifted by [`offset`](Self::offset).
///
/// A pin holds an ordered list of these; the first one that keeps the floating
/// element fully visible wins.
///
/// ```
/// use understory_pin::{Anchor, Placement};
///
/// // Below the target, left edges aligned, 4px gap.
/// let below = Placement::new()
///     .with_target(Anchor::percent(0.0, 100.0))
///     .with_offset(Anchor::px(0.0, 4.0));
/// // Above the target, bottom-left of the floating element on the target's top-left.
/// let above = Placement::new().with_pinned(Anchor::percent(0.0, 100.0));
/// # let _ = (below, above);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    /// Anchor on the target; percentages refer to the target's size.
    pub target: Anchor,
    /// Anchor on the floating element; percentages refer to its own size.
    pub pinned: Anchor,
    /// Extra displacement; percentages refer to the floating element's size.
    pub offset: Anchor,
    /// Viewport inset for this candidate.
    ///
    /// `None` falls back to the pin's default viewport offset.
    pub viewport_offset: Option<Spacing>,
    /// When this candidate wins, cap the floating element's height to the
    /// visible space between its pinned edge and the inset viewport edge.
    pub shrink_height: bool,
    /// When this candidate wins, make the floating element at least as wide as
    /// the target.
    pub same_width: bool,
}

impl Placement {
    /// A placement that aligns both top-left corners with no offset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the anchor on the target.
    pub fn with_target(mut self, target: impl Into<Anchor>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the anchor on the floating element.
    pub fn with_pinned(mut self, pinned: impl Into<Anchor>) -> Self {
        self.pinned = pinned.into();
        self
    }

    /// Set the extra displacement.
    pub fn with_offset(mut self, offset: impl Into<Anchor>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Override the viewport inset for this candidate.
    pub fn with_viewport_offset(mut self, spacing: impl Into<Spacing>) -> Self {
        self.viewport_offset = Some(spacing.into());
        self
    }

    /// Cap the height to the visible space when this candidate wins.
    pub fn shrink_height(mut self, yes: bool) -> Self {
        self.shrink_height = yes;
        self
    }

    /// Match the target's width when this candidate wins.
    pub fn same_width(mut self, yes: bool) -> Self {
        self.same_width = yes;
        self
    }

    /// Fail with [`PinError::InvalidLength`] if any anchor, offset, or inset is
    /// NaN or infinite.
    pub(crate) fn validate(&self) -> Result<(), PinError> {
        self.target.validate()?;
        self.pinned.validate()?;
        self.offset.validate()?;
        self.viewport_offset
            .as_ref()
            .map_or(Ok(()), Spacing::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_anchor_accepts_mixed_lengths() {
        let a: Anchor = (Length::Percent(50.0), 4.0).into();
        assert_eq!(a, Anchor::new(Length::Percent(50.0), Length::Px(4.0)));
    }

    #[test]
    fn defaults_align_top_left_corners() {
        let p = Placement::new();
        assert_eq!(p.target, Anchor::TOP_LEFT);
        assert_eq!(p.pinned, Anchor::TOP_LEFT);
        assert_eq!(p.offset, Anchor::TOP_LEFT);
        assert!(p.viewport_offset.is_none());
        assert!(!p.shrink_height && !p.same_width);
    }

    #[test]
    fn non_finite_lengths_are_invalid() {
        assert!(Placement::new().with_offset(Anchor::px(0.0, 4.0)).validate().is_ok());
        assert!(
            Placement::new()
                .with_offset(Anchor::px(f64::NAN, 0.0))
                .validate()
                .is_err()
        );
        assert_eq!(
            Placement::new()
                .with_viewport_offset(f64::INFINITY)
                .validate(),
            Err(PinError::InvalidLength("infpx".into()))
        );
    }
}
