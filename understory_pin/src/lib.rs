// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pin --heading-base-level=0

//! Understory Pin: keep floating elements next to a moving target.
//!
//! Tooltips, popovers, dropdown menus and context panels all need the same thing: a floating
//! element placed next to some target element, on whichever side keeps it visible, and kept
//! there while the target scrolls, animates, or resizes.
//!
//! - Describe where the element may go as an ordered list of [`Placement`] candidates.
//! - [`evaluate`] scores each candidate by how much of the floating element stays inside the
//!   (optionally inset) viewport and picks the first one that fits entirely, or the best one.
//! - A [`Pin`] binds one floating element to one target, wraps it in a positioning wrapper, and
//!   writes `top`/`right`/`bottom`/`left` (plus optional `max-height`/`min-width`) to that
//!   wrapper whenever the target, the floating element, the offset parent, or the viewport
//!   changes.
//! - A [`Scheduler`] runs one frame loop for any number of pins and reads the viewport once per
//!   frame.
//!
//! ## Hosts
//!
//! Everything that touches a document goes through the [`Host`] trait: measurement, tree
//! mutation for the wrapper, inline style writes, and frame requests. A browser binding
//! implements it over the DOM. [`scene::Scene`] is an in-memory host used by the tests and the
//! demo.
//!
//! ## Placement model
//!
//! A candidate aligns an anchor point on the target with an anchor point on the floating
//! element, then shifts by an offset. Anchors are [`Length`]s: absolute pixels or percentages
//! (of the target's size for the target anchor, of the floating element's size for the pinned
//! anchor and the offset). Each candidate may inset the viewport with a CSS-style [`Spacing`],
//! for example to keep clear of a sticky header.
//!
//! The first candidate that keeps the element fully visible wins. If none does, the one showing
//! the largest fraction wins; if nothing is visible anywhere, the previously applied candidate is
//! kept so the element does not jump around while its target is off-screen.
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_pin::{Anchor, Placement, evaluate};
//!
//! let above = Placement::new().with_pinned(Anchor::percent(0.0, 100.0));
//! let below = Placement::new().with_target(Anchor::percent(0.0, 100.0));
//!
//! // A target near the top of the viewport: "above" would stick out, so "below" wins.
//! let eval = evaluate(
//!     Rect::new(100.0, 20.0, 200.0, 40.0),
//!     Size::new(50.0, 50.0),
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//!     &[above, below],
//!     None,
//! );
//! assert_eq!(eval.selected().unwrap().index, 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library for float math.
//! - `libm`: float math for `no_std` builds.
//! - `tracing` (default): structured diagnostics through [`tracing`](https://docs.rs/tracing).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod log;

mod error;
mod evaluate;
mod geometry;
mod host;
mod length;
mod options;
mod pin;
mod placement;
mod scheduler;
mod spacing;

pub mod scene;

pub use error::PinError;
pub use evaluate::{Evaluation, FIT_EPSILON, Scored, Selection, evaluate, score};
pub use geometry::{
    inset_rect, intersection_area, intersection_ratio, intersection_rect, intersects,
    rect_relative_to,
};
pub use host::{Host, Property, Value};
pub use length::{Length, resolve_length};
pub use options::{ApplyHook, ElementRef, PinOptions, PositionMode, RecalcHook};
pub use pin::{Applied, Invalidation, Pin, PinElements, RecomputeOutcome, StyleDraft};
pub use placement::{Anchor, Placement};
pub use scheduler::{PinId, Scheduler};
pub use spacing::{Spacing, expand_box_spacing};
