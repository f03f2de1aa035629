// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] for tests, demos, and headless use.
//!
//! The scene is a small element tree with a deliberately simple layout model:
//!
//! - Elements added with [`Scene::add_element`] have an explicit viewport
//!   rectangle and never move on their own.
//! - Elements added with [`Scene::add_content`] have an intrinsic size and sit
//!   at their parent's top-left corner.
//! - Elements created through [`Host::create_element`] (wrappers) size to their
//!   children: the widest child's width, the sum of child heights. `min-width`
//!   and `max-height` styles apply.
//! - An element with a `position` style is laid out against its containing
//!   block using `top`/`right`/`bottom`/`left`. `fixed` elements use the
//!   viewport; `absolute` elements use their offset parent, or the viewport
//!   when there is none. A layout shift emulates a transformed ancestor that
//!   moves the containing block.
//!
//! Every style write is recorded so tests can assert on what a pin touched.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::host::{Host, Property, Value};

/// An element in a [`Scene`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SceneNode(u32);

impl SceneNode {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One recorded style write.
pub type StyleWrite = (SceneNode, Property, Option<Value>);

#[derive(Clone, Debug, Default)]
struct Element {
    parent: Option<SceneNode>,
    children: Vec<SceneNode>,
    rect: Option<Rect>,
    size: Option<Size>,
    name: Option<String>,
    classes: Vec<String>,
    styles: BTreeMap<Property, Value>,
    positioned: bool,
    shift: Vec2,
    offset_scale: Option<f64>,
}

/// In-memory document implementing [`Host`].
#[derive(Clone, Debug)]
pub struct Scene {
    elements: Vec<Element>,
    viewport: Rect,
    writes: Vec<StyleWrite>,
    frames_requested: u32,
}

impl Scene {
    /// Create a scene whose root covers `viewport`.
    pub fn new(viewport: Rect) -> Self {
        let root = Element {
            rect: Some(viewport),
            ..Element::default()
        };
        Self {
            elements: alloc::vec![root],
            viewport,
            writes: Vec::new(),
            frames_requested: 0,
        }
    }

    /// The document root.
    pub fn root(&self) -> SceneNode {
        SceneNode(0)
    }

    fn push(&mut self, parent: Option<SceneNode>, element: Element) -> SceneNode {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SceneNode uses 32-bit indices by design."
        )]
        let node = SceneNode(self.elements.len() as u32);
        self.elements.push(element);
        if let Some(parent) = parent {
            self.append_child(parent, node);
        }
        node
    }

    /// Add an element with a fixed viewport rectangle as the last child of `parent`.
    pub fn add_element(&mut self, parent: SceneNode, rect: Rect) -> SceneNode {
        self.push(
            Some(parent),
            Element {
                rect: Some(rect),
                ..Element::default()
            },
        )
    }

    /// Add an element with an intrinsic size as the last child of `parent`.
    pub fn add_content(&mut self, parent: SceneNode, size: Size) -> SceneNode {
        self.push(
            Some(parent),
            Element {
                size: Some(size),
                ..Element::default()
            },
        )
    }

    /// Move or resize an element created with [`add_element`](Self::add_element).
    pub fn set_rect(&mut self, node: SceneNode, rect: Rect) {
        let el = &mut self.elements[node.idx()];
        el.rect = Some(rect);
        el.size = None;
    }

    /// Change an element's intrinsic size.
    pub fn set_size(&mut self, node: SceneNode, size: Size) {
        let el = &mut self.elements[node.idx()];
        el.size = Some(size);
        el.rect = None;
    }

    /// Change the viewport (a window resize).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.elements[0].rect = Some(viewport);
    }

    /// Give `node` a name that [`Host::query_selector`] matches exactly.
    pub fn set_name(&mut self, node: SceneNode, name: impl Into<String>) {
        self.elements[node.idx()].name = Some(name.into());
    }

    /// Mark `node` as positioned, making it an offset parent for its descendants.
    pub fn set_positioned(&mut self, node: SceneNode, positioned: bool) {
        self.elements[node.idx()].positioned = positioned;
    }

    /// Shift the containing block of a positioned `node`.
    ///
    /// Emulates a transformed ancestor: the element lands `shift` away from
    /// where its offsets say it should.
    pub fn set_layout_shift(&mut self, node: SceneNode, shift: Vec2) {
        self.elements[node.idx()].shift = shift;
    }

    /// Scale the offsets of a positioned `node`.
    ///
    /// Emulates a scaled ancestor: `top: 10px` moves the element `10 * scale`
    /// pixels. Unlike a shift, this cannot be undone by one corrective pass.
    pub fn set_offset_scale(&mut self, node: SceneNode, scale: f64) {
        self.elements[node.idx()].offset_scale = Some(scale);
    }

    /// Current inline value of `property` on `node`.
    pub fn style(&self, node: SceneNode, property: Property) -> Option<Value> {
        self.elements[node.idx()].styles.get(&property).copied()
    }

    /// Classes on `node`.
    pub fn classes(&self, node: SceneNode) -> &[String] {
        &self.elements[node.idx()].classes
    }

    /// Children of `node` in document order.
    pub fn children_of(&self, node: SceneNode) -> &[SceneNode] {
        &self.elements[node.idx()].children
    }

    /// Every style write since the last [`clear_writes`](Self::clear_writes).
    pub fn writes(&self) -> &[StyleWrite] {
        &self.writes
    }

    /// Forget recorded style writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// How many frames were requested so far.
    pub fn frames_requested(&self) -> u32 {
        self.frames_requested
    }

    fn detach(&mut self, node: SceneNode) {
        if let Some(parent) = self.elements[node.idx()].parent.take() {
            self.elements[parent.idx()].children.retain(|&c| c != node);
        }
    }

    fn is_positioned(&self, node: SceneNode) -> bool {
        let el = &self.elements[node.idx()];
        el.positioned || el.styles.contains_key(&Property::Position)
    }

    fn px(&self, node: SceneNode, property: Property) -> Option<f64> {
        match self.style(node, property) {
            Some(Value::Px(v)) => Some(v),
            _ => None,
        }
    }

    /// Rectangle `node` is positioned against, if it has a `position` style.
    fn containing_block(&self, node: SceneNode) -> Option<Rect> {
        match self.style(node, Property::Position)? {
            Value::Keyword("absolute") => Some(
                self.offset_parent(node)
                    .map_or(self.viewport, |p| self.bounding_rect(p)),
            ),
            _ => Some(self.viewport),
        }
    }
}

impl Host for Scene {
    type Node = SceneNode;

    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn bounding_rect(&self, node: SceneNode) -> Rect {
        let el = &self.elements[node.idx()];
        let size = self.offset_size(node);
        if let Some(block) = self.containing_block(node) {
            let k = el.offset_scale.unwrap_or(1.0);
            let x = match (self.px(node, Property::Left), self.px(node, Property::Right)) {
                (Some(left), _) => block.x0 + left * k,
                (None, Some(right)) => block.x1 - right * k - size.width,
                (None, None) => block.x0,
            };
            let y = match (self.px(node, Property::Top), self.px(node, Property::Bottom)) {
                (Some(top), _) => block.y0 + top * k,
                (None, Some(bottom)) => block.y1 - bottom * k - size.height,
                (None, None) => block.y0,
            };
            return Rect::from_origin_size(Point::new(x, y) + el.shift, size);
        }
        if let Some(rect) = el.rect {
            return rect;
        }
        let origin = el
            .parent
            .map_or(Point::ZERO, |p| self.bounding_rect(p).origin());
        Rect::from_origin_size(origin, size)
    }

    fn offset_size(&self, node: SceneNode) -> Size {
        let el = &self.elements[node.idx()];
        let mut size = match (el.rect, el.size) {
            (Some(rect), _) => rect.size(),
            (None, Some(size)) => size,
            (None, None) => el.children.iter().fold(Size::ZERO, |acc, &c| {
                let s = self.offset_size(c);
                Size::new(acc.width.max(s.width), acc.height + s.height)
            }),
        };
        if let Some(min_width) = self.px(node, Property::MinWidth) {
            size.width = size.width.max(min_width);
        }
        if let Some(max_height) = self.px(node, Property::MaxHeight) {
            size.height = size.height.min(max_height);
        }
        size
    }

    fn offset_parent(&self, node: SceneNode) -> Option<SceneNode> {
        if self.style(node, Property::Position) == Some(Value::Keyword("fixed")) {
            return None;
        }
        let mut current = self.elements[node.idx()].parent;
        while let Some(n) = current {
            if self.is_positioned(n) {
                return Some(n);
            }
            current = self.elements[n.idx()].parent;
        }
        None
    }

    fn is_attached(&self, node: SceneNode) -> bool {
        let root = self.root();
        let mut current = Some(node);
        while let Some(n) = current {
            if n == root {
                return true;
            }
            current = self.elements[n.idx()].parent;
        }
        false
    }

    fn query_selector(&self, selector: &str) -> Option<SceneNode> {
        let idx = self
            .elements
            .iter()
            .position(|el| el.name.as_deref() == Some(selector))?;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SceneNode uses 32-bit indices by design."
        )]
        let node = SceneNode(idx as u32);
        Some(node)
    }

    fn document_root(&self) -> SceneNode {
        self.root()
    }

    fn create_element(&mut self) -> SceneNode {
        self.push(None, Element::default())
    }

    fn parent(&self, node: SceneNode) -> Option<SceneNode> {
        self.elements[node.idx()].parent
    }

    fn children(&self, node: SceneNode, out: &mut Vec<SceneNode>) {
        out.extend_from_slice(&self.elements[node.idx()].children);
    }

    fn insert_after(&mut self, reference: SceneNode, node: SceneNode) {
        let Some(parent) = self.elements[reference.idx()].parent else {
            return;
        };
        self.detach(node);
        let siblings = &mut self.elements[parent.idx()].children;
        let at = siblings
            .iter()
            .position(|&c| c == reference)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(at, node);
        self.elements[node.idx()].parent = Some(parent);
    }

    fn append_child(&mut self, parent: SceneNode, child: SceneNode) {
        self.detach(child);
        self.elements[parent.idx()].children.push(child);
        self.elements[child.idx()].parent = Some(parent);
    }

    fn remove(&mut self, node: SceneNode) {
        self.detach(node);
    }

    fn add_class(&mut self, node: SceneNode, class: &str) {
        self.elements[node.idx()].classes.push(class.to_string());
    }

    fn set_style(&mut self, node: SceneNode, property: Property, value: Option<Value>) {
        let styles = &mut self.elements[node.idx()].styles;
        match value {
            Some(v) => {
                styles.insert(property, v);
            }
            None => {
                styles.remove(&property);
            }
        }
        self.writes.push((node, property, value));
    }

    fn request_frame(&mut self) {
        self.frames_requested += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_sizes_to_children() {
        let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let root = scene.root();
        let wrapper = scene.create_element();
        scene.append_child(root, wrapper);
        scene.add_content(wrapper, Size::new(40.0, 10.0));
        scene.add_content(wrapper, Size::new(60.0, 15.0));
        assert_eq!(scene.offset_size(wrapper), Size::new(60.0, 25.0));

        scene.set_style(wrapper, Property::MaxHeight, Some(Value::Px(20.0)));
        scene.set_style(wrapper, Property::MinWidth, Some(Value::Px(80.0)));
        assert_eq!(scene.offset_size(wrapper), Size::new(80.0, 20.0));
    }

    #[test]
    fn insert_after_keeps_sibling_order() {
        let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let root = scene.root();
        let a = scene.add_content(root, Size::new(1.0, 1.0));
        let b = scene.add_content(root, Size::new(1.0, 1.0));
        let c = scene.add_content(root, Size::new(1.0, 1.0));
        scene.insert_after(a, c);
        assert_eq!(scene.children_of(root), &[a, c, b]);

        let loose = scene.create_element();
        assert!(!scene.is_attached(loose));
        scene.insert_after(loose, a);
        assert_eq!(scene.parent(a), Some(root), "no-op without a parent");
    }

    #[test]
    fn positioned_layout_uses_offsets() {
        let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let root = scene.root();
        let panel = scene.add_element(root, Rect::new(100.0, 100.0, 300.0, 300.0));
        scene.set_positioned(panel, true);
        let box_ = scene.add_content(panel, Size::new(20.0, 10.0));

        scene.set_style(box_, Property::Position, Some(Value::Keyword("absolute")));
        scene.set_style(box_, Property::Right, Some(Value::Px(5.0)));
        scene.set_style(box_, Property::Bottom, Some(Value::Px(5.0)));
        assert_eq!(scene.offset_parent(box_), Some(panel));
        assert_eq!(
            scene.bounding_rect(box_),
            Rect::new(275.0, 285.0, 295.0, 295.0)
        );

        scene.set_style(box_, Property::Position, Some(Value::Keyword("fixed")));
        assert_eq!(scene.offset_parent(box_), None);
        assert_eq!(scene.bounding_rect(box_), Rect::new(775.0, 585.0, 795.0, 595.0));

        scene.set_offset_scale(box_, 2.0);
        assert_eq!(scene.bounding_rect(box_), Rect::new(770.0, 580.0, 790.0, 590.0));
    }
}
