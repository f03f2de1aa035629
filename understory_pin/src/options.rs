// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pin configuration.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::evaluate::Scored;
use crate::host::Host;
use crate::pin::{PinElements, StyleDraft};
use crate::{PinError, Placement, Spacing};

/// How the wrapper is positioned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PositionMode {
    /// `position: fixed`, offsets relative to the viewport or offset parent.
    #[default]
    Fixed,
    /// `position: absolute`, for floating elements that should scroll with the document.
    Absolute,
    /// Move the floating element under the document root, leaving a
    /// placeholder behind, and position it with `position: fixed`.
    Detach,
}

/// An element given either as a host node or as a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRef<N> {
    /// A node handle.
    Node(N),
    /// A selector resolved through [`Host::query_selector`] when the pin is built.
    Selector(String),
}

impl<N: Copy> ElementRef<N> {
    /// Reference an element by selector.
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    pub(crate) fn resolve<H: Host<Node = N>>(&self, host: &H) -> Result<N, PinError> {
        match self {
            Self::Node(n) => Ok(*n),
            Self::Selector(s) => host
                .query_selector(s)
                .ok_or_else(|| PinError::UnresolvedElement(s.clone())),
        }
    }
}

impl<N> From<N> for ElementRef<N> {
    fn from(n: N) -> Self {
        Self::Node(n)
    }
}

/// Hook run before the floating element's natural size is measured.
///
/// It may mutate the floating element (for example, to lift a size clamp).
pub type RecalcHook<H> = Box<dyn FnMut(&mut H, PinElements<<H as Host>::Node>)>;

/// Hook run after the style offsets were computed and before they are written.
///
/// It may adjust the draft.
pub type ApplyHook<H> =
    Box<dyn FnMut(&mut H, PinElements<<H as Host>::Node>, &Scored, &mut StyleDraft)>;

/// Options for a [`Pin`](crate::Pin).
///
/// ```
/// use understory_pin::{Anchor, PinOptions, Placement, PositionMode, scene::Scene};
///
/// let options: PinOptions<Scene> = PinOptions::default()
///     .with_position(Placement::new().with_target(Anchor::percent(0.0, 100.0)))
///     .with_position(Placement::new().with_pinned(Anchor::percent(0.0, 100.0)))
///     .with_viewport_offset(8.0)
///     .with_mode(PositionMode::Detach)
///     .with_wrapper_class("tooltip-wrapper");
/// assert_eq!(options.positions.len(), 2);
/// assert_eq!(options.z_index, 999_999);
/// ```
pub struct PinOptions<H: Host> {
    /// Candidate placements in priority order.
    pub positions: Vec<Placement>,
    /// Viewport inset for candidates that do not set their own.
    pub viewport_offset: Spacing,
    /// Element whose rectangle the style offsets are relative to.
    ///
    /// `None` uses the wrapper's natural offset parent, or the viewport when
    /// it has none.
    pub offset_parent: Option<ElementRef<H::Node>>,
    /// Wrapper positioning.
    pub mode: PositionMode,
    /// Wrapper `z-index`.
    pub z_index: i32,
    /// Extra class added to the wrapper.
    pub wrapper_class: Option<String>,
    /// See [`RecalcHook`].
    pub on_recalc: Option<RecalcHook<H>>,
    /// See [`ApplyHook`].
    pub on_apply: Option<ApplyHook<H>>,
}

impl<H: Host> Default for PinOptions<H> {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            viewport_offset: Spacing::ZERO,
            offset_parent: None,
            mode: PositionMode::Fixed,
            z_index: 999_999,
            wrapper_class: None,
            on_recalc: None,
            on_apply: None,
        }
    }
}

impl<H: Host> fmt::Debug for PinOptions<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinOptions")
            .field("positions", &self.positions)
            .field("viewport_offset", &self.viewport_offset)
            .field("offset_parent", &self.offset_parent)
            .field("mode", &self.mode)
            .field("z_index", &self.z_index)
            .field("wrapper_class", &self.wrapper_class)
            .field("on_recalc", &self.on_recalc.is_some())
            .field("on_apply", &self.on_apply.is_some())
            .finish()
    }
}

impl<H: Host> PinOptions<H> {
    /// Replace the candidate list.
    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Placement>) -> Self {
        self.positions = positions.into_iter().collect();
        self
    }

    /// Append one candidate.
    pub fn with_position(mut self, position: Placement) -> Self {
        self.positions.push(position);
        self
    }

    /// Set the default viewport inset.
    pub fn with_viewport_offset(mut self, spacing: impl Into<Spacing>) -> Self {
        self.viewport_offset = spacing.into();
        self
    }

    /// Set the offset parent.
    pub fn with_offset_parent(mut self, parent: impl Into<ElementRef<H::Node>>) -> Self {
        self.offset_parent = Some(parent.into());
        self
    }

    /// Set the positioning mode.
    pub fn with_mode(mut self, mode: PositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the wrapper `z-index`.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Add a class to the wrapper.
    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = Some(class.into());
        self
    }

    /// Install a [`RecalcHook`].
    pub fn on_recalc(
        mut self,
        hook: impl FnMut(&mut H, PinElements<H::Node>) + 'static,
    ) -> Self {
        self.on_recalc = Some(Box::new(hook));
        self
    }

    /// Install an [`ApplyHook`].
    pub fn on_apply(
        mut self,
        hook: impl FnMut(&mut H, PinElements<H::Node>, &Scored, &mut StyleDraft) + 'static,
    ) -> Self {
        self.on_apply = Some(Box::new(hook));
        self
    }
}
