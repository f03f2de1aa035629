// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capabilities a pin needs from its host document.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Rect, Size};

/// An inline style property written to the wrapper element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// `position`
    Position,
    /// `z-index`
    ZIndex,
    /// `display`
    Display,
    /// `flex-direction`
    FlexDirection,
    /// `flex`
    Flex,
    /// `min-height`
    MinHeight,
    /// `top`
    Top,
    /// `right`
    Right,
    /// `bottom`
    Bottom,
    /// `left`
    Left,
    /// `max-height`
    MaxHeight,
    /// `min-width`
    MinWidth,
}

impl Property {
    /// The CSS property name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::ZIndex => "z-index",
            Self::Display => "display",
            Self::FlexDirection => "flex-direction",
            Self::Flex => "flex",
            Self::MinHeight => "min-height",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::MaxHeight => "max-height",
            Self::MinWidth => "min-width",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value for a [`Property`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// A length in pixels, rendered as `<n>px`.
    Px(f64),
    /// A unitless number (`z-index`, `flex`).
    Number(i32),
    /// A keyword such as `fixed` or `inline-flex`.
    Keyword(&'static str),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Keyword(k) => f.write_str(k),
        }
    }
}

/// Host document operations used by pins.
///
/// A browser binding implements this over the DOM; [`Scene`](crate::scene::Scene)
/// implements it in memory for tests and headless use. Every rectangle is in
/// viewport coordinates, like `getBoundingClientRect`.
///
/// `Node` is a cheap handle; the host owns the underlying elements.
pub trait Host {
    /// Element handle.
    type Node: Copy + Eq + fmt::Debug;

    /// The visible viewport, read once per scheduler tick.
    fn viewport_rect(&self) -> Rect;

    /// Border-box rectangle of `node` in viewport coordinates.
    fn bounding_rect(&self, node: Self::Node) -> Rect;

    /// Layout size of `node` (`offsetWidth`/`offsetHeight`).
    fn offset_size(&self, node: Self::Node) -> Size;

    /// Nearest positioned ancestor of `node`, if any.
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `node` still has a parent (is part of a document tree).
    fn is_attached(&self, node: Self::Node) -> bool;

    /// Resolve a selector to an element.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// The document root that detached floating elements move to (`body`).
    fn document_root(&self) -> Self::Node;

    /// Create a new, unattached container element.
    fn create_element(&mut self) -> Self::Node;

    /// Parent of `node`.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children of `node` in document order, appended to `out`.
    fn children(&self, node: Self::Node, out: &mut Vec<Self::Node>);

    /// Move `node` to immediately after `reference` (same parent).
    fn insert_after(&mut self, reference: Self::Node, node: Self::Node);

    /// Move `child` to the end of `parent`'s children.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Detach `node` from its parent.
    fn remove(&mut self, node: Self::Node);

    /// Add a class name to `node`.
    fn add_class(&mut self, node: Self::Node, class: &str);

    /// Set (`Some`) or clear (`None`) an inline style property.
    fn set_style(&mut self, node: Self::Node, property: Property, value: Option<Value>);

    /// Ask for [`Scheduler::tick`](crate::Scheduler::tick) to run on the next
    /// display frame (`requestAnimationFrame`).
    ///
    /// Requests made before that frame arrives coalesce into a single tick.
    fn request_frame(&mut self);
}
