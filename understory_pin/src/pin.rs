// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-instance controller: wrapping, recomputation, removal.

use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Rect, Size};

use crate::evaluate::{Scored, Selection, evaluate};
use crate::geometry::rect_relative_to;
use crate::host::{Host, Property, Value};
use crate::options::{ApplyHook, ElementRef, PinOptions, PositionMode, RecalcHook};
use crate::{PinError, Placement};

/// Edge mismatches smaller than this are not corrected.
const CORRECTION_EPSILON: f64 = 1e-6;

/// The elements a pin works with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PinElements<N> {
    /// The floating element.
    pub pinned: N,
    /// The element it is placed next to.
    pub target: N,
    /// The positioning wrapper the pin created around `pinned`.
    pub wrapper: N,
}

/// Style offsets computed for the wrapper, before they are written.
///
/// `None` clears the property. Exactly one of `top`/`bottom` and one of
/// `left`/`right` is set by the pin; an [`ApplyHook`] may change that.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StyleDraft {
    /// `top`, relative to the offset parent's top edge.
    pub top: Option<f64>,
    /// `right`, measured inward from the offset parent's right edge.
    pub right: Option<f64>,
    /// `bottom`, measured inward from the offset parent's bottom edge.
    pub bottom: Option<f64>,
    /// `left`, relative to the offset parent's left edge.
    pub left: Option<f64>,
    /// `max-height`, set when the winning candidate shrinks to fit.
    pub max_height: Option<f64>,
    /// `min-width`, set when the winning candidate matches the target's width.
    pub min_width: Option<f64>,
}

bitflags::bitflags! {
    /// Signals that caused a pin to recompute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        /// The viewport rectangle changed since the previous tick.
        const VIEWPORT      = 0b0000_0001;
        /// The target moved or resized.
        const TARGET        = 0b0000_0010;
        /// The floating element's size changed.
        const PINNED_SIZE   = 0b0000_0100;
        /// The offset parent is a different element.
        const OFFSET_PARENT = 0b0000_1000;
    }
}

/// What [`Pin::recompute`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum RecomputeOutcome {
    /// The wrapper is not attached to a document; caches were reset.
    Orphaned,
    /// Nothing relevant changed; no styles were written.
    Unchanged,
    /// A placement was computed and written.
    Applied(Applied),
}

/// Details of a placement written by [`Pin::recompute`].
#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    /// What triggered the recompute.
    pub invalidation: Invalidation,
    /// The winning candidate.
    pub scored: Scored,
    /// How it was chosen.
    pub selection: Selection,
    /// The style that ended up on the wrapper.
    pub style: StyleDraft,
    /// Whether the correction pass had to adjust an edge.
    pub corrected: bool,
}

/// Geometry that produced the currently applied placement.
///
/// Replaced wholesale after each recompute and compared field by field on the
/// next tick.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Snapshot<N> {
    target_rect: Rect,
    pinned_size: Size,
    offset_parent: Option<N>,
}

/// A floating element kept next to a target element.
///
/// Building a pin wraps the floating element in a positioning wrapper (and,
/// in [`PositionMode::Detach`], moves it under the document root). The pin
/// owns that wrapper until [`Pin::remove`] restores the original structure.
///
/// Pins are usually driven by a [`Scheduler`](crate::Scheduler), which calls
/// [`Pin::recompute`] once per frame.
pub struct Pin<H: Host> {
    elements: PinElements<H::Node>,
    placeholder: Option<H::Node>,
    positions: Vec<Placement>,
    offset_parent: Option<H::Node>,
    mode: PositionMode,
    on_recalc: Option<RecalcHook<H>>,
    on_apply: Option<ApplyHook<H>>,
    last: Option<Snapshot<H::Node>>,
    last_position: Option<usize>,
}

impl<H: Host> fmt::Debug for Pin<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pin")
            .field("elements", &self.elements)
            .field("placeholder", &self.placeholder)
            .field("positions", &self.positions.len())
            .field("mode", &self.mode)
            .field("last_position", &self.last_position)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Pin<H> {
    /// Validate `options`, resolve element references, and wrap `pinned`.
    ///
    /// Fails without touching the document when the candidate list is empty,
    /// when any length is NaN or infinite, or when a selector does not resolve.
    ///
    /// No placement is computed until the first [`recompute`](Self::recompute).
    pub fn new(
        host: &mut H,
        pinned: impl Into<ElementRef<H::Node>>,
        target: impl Into<ElementRef<H::Node>>,
        options: PinOptions<H>,
    ) -> Result<Self, PinError> {
        if options.positions.is_empty() {
            return Err(PinError::NoCandidates);
        }
        options.viewport_offset.validate()?;
        let default_offset = options.viewport_offset;
        let positions: Vec<Placement> = options
            .positions
            .into_iter()
            .map(|mut p| {
                p.viewport_offset.get_or_insert(default_offset);
                p
            })
            .collect();
        for placement in &positions {
            placement.validate()?;
        }

        let pinned = pinned.into().resolve(host)?;
        let target = target.into().resolve(host)?;
        let offset_parent = options
            .offset_parent
            .as_ref()
            .map(|r| r.resolve(host))
            .transpose()?;

        let placeholder = (options.mode == PositionMode::Detach).then(|| {
            let placeholder = wrap(host, pinned);
            let root = host.document_root();
            host.append_child(root, pinned);
            placeholder
        });
        let wrapper = wrap(host, pinned);
        if let Some(class) = &options.wrapper_class {
            host.add_class(wrapper, class);
        }

        let position = match options.mode {
            PositionMode::Absolute => "absolute",
            PositionMode::Fixed | PositionMode::Detach => "fixed",
        };
        for (property, value) in [
            (Property::Position, Value::Keyword(position)),
            (Property::ZIndex, Value::Number(options.z_index)),
            (Property::Display, Value::Keyword("inline-flex")),
            (Property::FlexDirection, Value::Keyword("column")),
            (Property::MinHeight, Value::Px(0.0)),
            (Property::Flex, Value::Number(1)),
        ] {
            host.set_style(wrapper, property, Some(value));
        }
        debug!(?pinned, ?target, ?wrapper, mode = ?options.mode, "pin created");

        Ok(Self {
            elements: PinElements {
                pinned,
                target,
                wrapper,
            },
            placeholder,
            positions,
            offset_parent,
            mode: options.mode,
            on_recalc: options.on_recalc,
            on_apply: options.on_apply,
            last: None,
            last_position: None,
        })
    }

    /// The floating element, its target, and the wrapper.
    pub fn elements(&self) -> PinElements<H::Node> {
        self.elements
    }

    /// The positioning wrapper around the floating element.
    pub fn wrapper(&self) -> H::Node {
        self.elements.wrapper
    }

    /// The placeholder marking the original location in detach mode.
    pub fn placeholder(&self) -> Option<H::Node> {
        self.placeholder
    }

    /// Candidate placements, with the default viewport offset filled in.
    pub fn positions(&self) -> &[Placement] {
        &self.positions
    }

    /// Positioning mode.
    pub fn mode(&self) -> PositionMode {
        self.mode
    }

    /// Index of the candidate applied most recently.
    pub fn last_position(&self) -> Option<usize> {
        self.last_position
    }

    /// Re-place the floating element if anything relevant changed.
    ///
    /// `viewport` and `viewport_changed` are shared by every pin in a tick. The
    /// placement is recomputed only when the viewport changed, the target
    /// moved or resized, the floating element resized, or the offset parent
    /// changed; otherwise nothing is measured beyond those checks and nothing
    /// is written.
    ///
    /// Never fails: a detached wrapper resets the caches and reports
    /// [`RecomputeOutcome::Orphaned`], and the pin resumes once reattached.
    pub fn recompute(
        &mut self,
        host: &mut H,
        viewport: Rect,
        viewport_changed: bool,
    ) -> RecomputeOutcome {
        let PinElements {
            pinned,
            target,
            wrapper,
        } = self.elements;
        if !host.is_attached(wrapper) {
            if self.last.take().is_some() {
                warn!(?wrapper, "pin wrapper is detached; placement cache reset");
            }
            return RecomputeOutcome::Orphaned;
        }

        let target_rect = host.bounding_rect(target);
        let pinned_size = host.offset_size(pinned);
        let offset_parent = self.offset_parent.or_else(|| host.offset_parent(wrapper));

        let mut invalidation = Invalidation::empty();
        invalidation.set(Invalidation::VIEWPORT, viewport_changed);
        match &self.last {
            Some(last) => {
                invalidation.set(Invalidation::TARGET, last.target_rect != target_rect);
                invalidation.set(Invalidation::PINNED_SIZE, last.pinned_size != pinned_size);
                invalidation.set(
                    Invalidation::OFFSET_PARENT,
                    last.offset_parent != offset_parent,
                );
            }
            None => {
                invalidation |=
                    Invalidation::TARGET | Invalidation::PINNED_SIZE | Invalidation::OFFSET_PARENT;
            }
        }
        if invalidation.is_empty() {
            return RecomputeOutcome::Unchanged;
        }

        host.set_style(wrapper, Property::MaxHeight, None);
        if let Some(hook) = self.on_recalc.as_mut() {
            hook(host, self.elements);
        }
        let pinned_size = host.offset_size(pinned);
        let container = offset_parent.map_or(viewport, |n| host.bounding_rect(n));

        let eval = evaluate(
            target_rect,
            pinned_size,
            viewport,
            &self.positions,
            self.last_position,
        );
        let (Some(scored), Some(selection)) = (eval.selected().copied(), eval.selection()) else {
            return RecomputeOutcome::Unchanged;
        };
        let placement = &self.positions[scored.index];

        let mut style = draft_style(&scored, placement, target_rect, container);
        if placement.same_width {
            style.min_width = Some(host.offset_size(target).width);
        }
        if let Some(hook) = self.on_apply.as_mut() {
            hook(host, self.elements, &scored, &mut style);
        }
        write_style(host, wrapper, &style);

        let corrected = self.mode != PositionMode::Detach
            && correct_offsets(&mut style, host.bounding_rect(wrapper), container);
        if corrected {
            write_style(host, wrapper, &style);
        }

        debug!(
            candidate = scored.index,
            ratio = scored.ratio,
            ?selection,
            ?invalidation,
            corrected,
            "pin placed"
        );

        self.last = Some(Snapshot {
            target_rect,
            pinned_size: host.offset_size(pinned),
            offset_parent,
        });
        self.last_position = Some(scored.index);

        RecomputeOutcome::Applied(Applied {
            invalidation,
            scored,
            selection,
            style,
            corrected,
        })
    }

    /// Forget the applied placement and restore the original document structure.
    ///
    /// The floating element goes back to exactly where it was before the pin
    /// was built: the wrapper is replaced by its children, and in detach mode
    /// the element returns into its placeholder, which is then unwrapped too.
    pub fn remove(self, host: &mut H) {
        let PinElements {
            pinned, wrapper, ..
        } = self.elements;
        unwrap(host, wrapper);
        if let Some(placeholder) = self.placeholder {
            host.append_child(placeholder, pinned);
            unwrap(host, placeholder);
        }
        debug!(?pinned, "pin removed");
    }
}

/// Translate a scored rectangle into offsets relative to `container`.
///
/// A target anchor in the lower half of the target pins the `top` edge
/// (the element hangs below the anchor); otherwise the `bottom` edge is pinned
/// so the element grows upward. The same rule picks `right` over `left` for
/// anchors in the target's right half.
fn draft_style(scored: &Scored, placement: &Placement, target: Rect, container: Rect) -> StyleDraft {
    let rel = rect_relative_to(scored.rect, container);
    let visible = scored.viewport;
    let mut style = StyleDraft::default();

    if scored.target_anchor.y > target.height() / 2.0 {
        let top = rel.y0.floor();
        style.top = Some(top);
        if placement.shrink_height {
            let span = (visible.y1 - container.y0).round() - top;
            style.max_height = Some(span.max(0.0));
        }
    } else {
        let bottom = rel.y1.floor();
        style.bottom = Some(bottom);
        if placement.shrink_height {
            let span = (container.y1 - visible.y0).round() - bottom;
            style.max_height = Some(span.max(0.0));
        }
    }

    if scored.target_anchor.x > target.width() / 2.0 {
        style.right = Some(rel.x1.floor());
    } else {
        style.left = Some(rel.x0.floor());
    }
    style
}

/// Compare where the wrapper actually landed with what was asked for.
///
/// A transformed or otherwise containing ancestor between the wrapper and its
/// offset parent shifts the containing block; each set edge is moved by the
/// measured discrepancy. Runs once per recompute and is not iterated.
fn correct_offsets(style: &mut StyleDraft, actual: Rect, container: Rect) -> bool {
    let rel = rect_relative_to(actual, container);
    let mut corrected = false;
    for (slot, measured) in [
        (&mut style.top, rel.y0),
        (&mut style.left, rel.x0),
        (&mut style.bottom, rel.y1),
        (&mut style.right, rel.x1),
    ] {
        if let Some(requested) = slot
            && (measured - *requested).abs() > CORRECTION_EPSILON
        {
            *requested -= measured - *requested;
            corrected = true;
        }
    }
    corrected
}

fn write_style<H: Host>(host: &mut H, wrapper: H::Node, style: &StyleDraft) {
    for (property, value) in [
        (Property::Top, style.top),
        (Property::Right, style.right),
        (Property::Bottom, style.bottom),
        (Property::Left, style.left),
        (Property::MaxHeight, style.max_height),
        (Property::MinWidth, style.min_width),
    ] {
        host.set_style(wrapper, property, value.map(Value::Px));
    }
}

/// Put `node` inside a new container that takes its place in the tree.
fn wrap<H: Host>(host: &mut H, node: H::Node) -> H::Node {
    let container = host.create_element();
    host.insert_after(node, container);
    host.append_child(container, node);
    container
}

/// Inverse of [`wrap`]: move the container's children to where it is, then drop it.
fn unwrap<H: Host>(host: &mut H, container: H::Node) {
    let mut children = Vec::new();
    host.children(container, &mut children);
    let mut anchor = container;
    for child in children {
        host.insert_after(anchor, child);
        anchor = child;
    }
    host.remove(container);
}
