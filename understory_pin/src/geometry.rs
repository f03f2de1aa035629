// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers used by the placement evaluator.
//!
//! All functions take [`kurbo::Rect`] values and assume finite, non-inverted
//! rectangles (`x0 <= x1`, `y0 <= y1`).

use kurbo::{Insets, Rect};

/// Whether two rectangles overlap with a positive-area intersection.
///
/// Rectangles that only share an edge or a corner do **not** overlap; a
/// touching edge contributes no visible area.
#[inline]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// The overlapping region of two rectangles, or `None` when they do not
/// [intersect](intersects).
#[inline]
pub fn intersection_rect(a: Rect, b: Rect) -> Option<Rect> {
    intersects(a, b).then(|| a.intersect(b))
}

/// Area of the overlap between two rectangles (zero when disjoint).
#[inline]
pub fn intersection_area(a: Rect, b: Rect) -> f64 {
    intersection_rect(a, b).map_or(0.0, |r| r.area())
}

/// Fraction of `candidate`'s own area that lies inside `viewport`, in `0.0..=1.0`.
///
/// A zero-area candidate has ratio `0.0`.
#[inline]
pub fn intersection_ratio(candidate: Rect, viewport: Rect) -> f64 {
    let area = candidate.area();
    if area <= 0.0 {
        return 0.0;
    }
    (intersection_area(candidate, viewport) / area).min(1.0)
}

/// Shrink `rect` inward by `insets` (left, top, right, bottom).
#[inline]
pub fn inset_rect(rect: Rect, insets: Insets) -> Rect {
    Rect::new(
        rect.x0 + insets.x0,
        rect.y0 + insets.y0,
        rect.x1 - insets.x1,
        rect.y1 - insets.y1,
    )
}

/// Express `rect` as distances from the edges of `container`.
///
/// The result uses [`Insets`] as a side-keyed record: `x0`/`y0` are the
/// distances from the container's left/top edges to the rect's left/top edges,
/// and `x1`/`y1` are measured inward from the container's right/bottom edges,
/// which is how `left`/`top`/`right`/`bottom` style offsets are expressed.
#[inline]
pub fn rect_relative_to(rect: Rect, container: Rect) -> Insets {
    Insets::new(
        rect.x0 - container.x0,
        rect.y0 - container.y0,
        container.x1 - rect.x1,
        container.y1 - rect.y1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 20.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 20.0);
        let corner = Rect::new(10.0, 10.0, 20.0, 20.0);
        for b in [right, below, corner] {
            assert!(!intersects(a, b), "{b:?} only touches {a:?}");
            assert_eq!(intersection_rect(a, b), None);
            assert_eq!(intersection_ratio(a, b), 0.0);
        }
    }

    #[test]
    fn overlap_region_and_ratio() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 15.0, 5.0);
        assert_eq!(intersection_rect(a, b), Some(Rect::new(5.0, 0.0, 10.0, 5.0)));
        assert_eq!(intersection_area(a, b), 25.0);
        assert_eq!(intersection_ratio(a, b), 0.25);
    }

    #[test]
    fn contained_rect_has_full_ratio() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let flush = Rect::new(750.0, 570.0, 800.0, 600.0);
        assert_eq!(intersection_ratio(flush, viewport), 1.0);
    }

    #[test]
    fn zero_area_candidate_has_zero_ratio() {
        let line = Rect::new(5.0, 5.0, 5.0, 50.0);
        assert_eq!(intersection_ratio(line, Rect::new(0.0, 0.0, 100.0, 100.0)), 0.0);
    }

    #[test]
    fn relative_offsets_measure_inward() {
        let container = Rect::new(100.0, 50.0, 500.0, 450.0);
        let r = Rect::new(120.0, 60.0, 170.0, 90.0);
        assert_eq!(
            rect_relative_to(r, container),
            Insets::new(20.0, 10.0, 330.0, 360.0)
        );
        assert_eq!(
            inset_rect(container, Insets::new(10.0, 20.0, 30.0, 40.0)),
            Rect::new(110.0, 70.0, 470.0, 410.0)
        );
    }
}
