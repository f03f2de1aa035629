// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement evaluation: score every candidate and pick one.

use kurbo::{Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::geometry::{inset_rect, intersection_ratio};
use crate::{Placement, Spacing};

/// Ratios within this distance of `1.0` count as fully visible.
pub const FIT_EPSILON: f64 = 1e-9;

/// A candidate placement after it was resolved against current geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scored {
    /// Index of the candidate in the list passed to [`evaluate`].
    pub index: usize,
    /// Where the floating element would be, in the same space as the target.
    pub rect: Rect,
    /// Resolved target anchor, relative to the target's top-left corner.
    ///
    /// Downstream code uses it to decide which edges to pin: an anchor below
    /// the target's vertical midpoint pins `top`, otherwise `bottom`; one right
    /// of the horizontal midpoint pins `right`, otherwise `left`.
    pub target_anchor: Vec2,
    /// The viewport after this candidate's inset was applied.
    pub viewport: Rect,
    /// Fraction of [`rect`](Self::rect) inside [`viewport`](Self::viewport).
    pub ratio: f64,
}

impl Scored {
    /// Whether the floating element is fully visible under this candidate.
    #[inline]
    pub fn fits(&self) -> bool {
        self.ratio >= 1.0 - FIT_EPSILON
    }
}

/// Why a candidate was selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The first candidate that keeps the element fully visible.
    Fit,
    /// No candidate fits; this one shows the largest fraction of the element.
    BestEffort,
    /// Nothing is visible under any candidate; the previously applied one is kept.
    Previous,
}

/// Result of [`evaluate`].
#[derive(Clone, Debug, Default)]
pub struct Evaluation {
    /// Scored candidates in evaluation order.
    ///
    /// Scanning stops at the first fitting candidate, so later candidates are
    /// absent when one fits.
    pub scored: SmallVec<[Scored; 4]>,
    selected: Option<(usize, Selection)>,
}

impl Evaluation {
    /// The winning candidate, or `None` when there were no candidates.
    pub fn selected(&self) -> Option<&Scored> {
        self.selected.map(|(i, _)| &self.scored[i])
    }

    /// How the winner was chosen.
    pub fn selection(&self) -> Option<Selection> {
        self.selected.map(|(_, how)| how)
    }
}

/// Resolve one candidate against the target rectangle and floating size.
///
/// `viewport` is the un-inset viewport; the candidate's own
/// [`viewport_offset`](Placement::viewport_offset) is applied here.
pub fn score(index: usize, placement: &Placement, target: Rect, size: Size, viewport: Rect) -> Scored {
    let target_anchor = Vec2::new(
        placement.target.x.resolve(target.width()),
        placement.target.y.resolve(target.height()),
    );
    let pinned_anchor = Vec2::new(
        placement.pinned.x.resolve(size.width),
        placement.pinned.y.resolve(size.height),
    );
    let offset = Vec2::new(
        placement.offset.x.resolve(size.width),
        placement.offset.y.resolve(size.height),
    );
    let origin = target.origin() + target_anchor - pinned_anchor + offset;
    let rect = Rect::from_origin_size(origin, size);

    let insets = placement
        .viewport_offset
        .unwrap_or(Spacing::ZERO)
        .resolve(viewport.size());
    let viewport = inset_rect(viewport, insets);

    Scored {
        index,
        rect,
        target_anchor,
        viewport,
        ratio: intersection_ratio(rect, viewport),
    }
}

/// Score `candidates` in order and select one.
///
/// - The first candidate that [fits](Scored::fits) wins and ends the scan.
/// - Otherwise the candidate with the highest ratio wins; ties go to the
///   earlier candidate.
/// - If even that candidate shows nothing (ratio `<= 0`) and `previous` names a
///   candidate that was scored, `previous` is kept to avoid flicker between
///   equally invisible placements.
///
/// `target` and `viewport` must be in the same coordinate space.
///
/// ```
/// use kurbo::{Rect, Size};
/// use understory_pin::{Anchor, Placement, Selection, evaluate};
///
/// let target = Rect::new(100.0, 100.0, 200.0, 120.0);
/// let below = Placement::new().with_target(Anchor::percent(0.0, 100.0));
/// let eval = evaluate(
///     target,
///     Size::new(50.0, 30.0),
///     Rect::new(0.0, 0.0, 800.0, 600.0),
///     &[below],
///     None,
/// );
/// let win = eval.selected().unwrap();
/// assert_eq!(win.rect, Rect::new(100.0, 120.0, 150.0, 150.0));
/// assert_eq!(eval.selection(), Some(Selection::Fit));
/// ```
pub fn evaluate(
    target: Rect,
    size: Size,
    viewport: Rect,
    candidates: &[Placement],
    previous: Option<usize>,
) -> Evaluation {
    let mut eval = Evaluation::default();
    for (index, placement) in candidates.iter().enumerate() {
        let scored = score(index, placement, target, size, viewport);
        trace!(index, rect = ?scored.rect, ratio = scored.ratio, "scored candidate");
        let fits = scored.fits();
        eval.scored.push(scored);
        if fits {
            eval.selected = Some((eval.scored.len() - 1, Selection::Fit));
            return eval;
        }
    }

    let mut best: Option<usize> = None;
    for (i, s) in eval.scored.iter().enumerate() {
        if best.is_none_or(|b| s.ratio > eval.scored[b].ratio) {
            best = Some(i);
        }
    }
    let Some(best) = best else {
        return eval;
    };

    eval.selected = Some((best, Selection::BestEffort));
    if eval.scored[best].ratio <= 0.0
        && let Some(prev) = previous
        && let Some(i) = eval.scored.iter().position(|s| s.index == prev)
    {
        eval.selected = Some((i, Selection::Previous));
    }
    eval
}
