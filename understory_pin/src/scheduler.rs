// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One frame loop shared by every pin.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::host::Host;
use crate::options::{ElementRef, PinOptions};
use crate::pin::Pin;
use crate::PinError;

/// Identifier for a pin registered with a [`Scheduler`] (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PinId(u32, u32);

impl PinId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

struct Slot<H: Host> {
    generation: u32,
    pin: Pin<H>,
}

/// Registry of live pins plus the frame loop that recomputes them.
///
/// The scheduler is an ordinary value owned by the embedding code; there is no
/// global state. The host drives it: [`Host::request_frame`] asks for the next
/// display frame, and the embedder calls [`tick`](Self::tick) when that frame
/// arrives. Each tick reads the viewport once and hands the same rectangle to
/// every pin, in registration order.
///
/// The loop starts lazily when the first pin is inserted and stops when the
/// last pin is removed or [`stop`](Self::stop) is called.
///
/// ```
/// use kurbo::{Rect, Size};
/// use understory_pin::{Anchor, Host, PinOptions, Placement, Scheduler, scene::Scene};
///
/// let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
/// let root = scene.root();
/// let button = scene.add_element(root, Rect::new(100.0, 100.0, 200.0, 120.0));
/// let menu = scene.add_content(root, Size::new(50.0, 30.0));
///
/// let mut pins = Scheduler::new();
/// let below = Placement::new().with_target(Anchor::percent(0.0, 100.0));
/// let id = pins
///     .insert(&mut scene, menu, button, PinOptions::default().with_position(below))
///     .unwrap();
///
/// // Inserting the first pin started the loop and placed the menu.
/// assert!(pins.is_active());
/// let wrapper = pins.get(id).unwrap().wrapper();
/// assert_eq!(scene.bounding_rect(wrapper), Rect::new(100.0, 120.0, 150.0, 150.0));
///
/// // The host delivers frames; each one re-places pins whose inputs changed.
/// scene.set_rect(button, Rect::new(300.0, 100.0, 400.0, 120.0));
/// assert!(pins.tick(&mut scene));
/// assert_eq!(scene.bounding_rect(wrapper).origin().x, 300.0);
///
/// pins.remove(&mut scene, id).unwrap();
/// assert!(!pins.is_active());
/// ```
pub struct Scheduler<H: Host> {
    slots: Vec<Option<Slot<H>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// live ids in registration order
    order: Vec<PinId>,
    active: bool,
    last_viewport: Option<Rect>,
}

impl<H: Host> fmt::Debug for Scheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pins", &self.order.len())
            .field("free_list", &self.free_list.len())
            .field("active", &self.active)
            .field("last_viewport", &self.last_viewport)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Default for Scheduler<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Scheduler<H> {
    /// Create an idle scheduler with no pins.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            active: false,
            last_viewport: None,
        }
    }

    /// Build a pin and register it.
    ///
    /// Starts the loop (running one tick immediately) if it is not running.
    /// Nothing is registered when construction fails.
    pub fn insert(
        &mut self,
        host: &mut H,
        pinned: impl Into<ElementRef<H::Node>>,
        target: impl Into<ElementRef<H::Node>>,
        options: PinOptions<H>,
    ) -> Result<PinId, PinError> {
        let pin = Pin::new(host, pinned, target, options)?;
        let id = self.register(pin);
        debug!(?id, pins = self.order.len(), "pin registered");
        if !self.active {
            self.start(host);
        }
        Ok(id)
    }

    fn register(&mut self, pin: Pin<H>) -> PinId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot { generation, pin });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot { generation, pin }));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "PinId uses 32-bit indices by design."
        )]
        let id = PinId(idx as u32, generation);
        self.order.push(id);
        id
    }

    /// Unregister a pin and restore its element (see [`Pin::remove`]).
    ///
    /// Removing the last pin stops the loop.
    pub fn remove(&mut self, host: &mut H, id: PinId) -> Result<(), PinError> {
        let Some(slot) = self
            .slots
            .get_mut(id.idx())
            .and_then(|entry| entry.take_if(|slot| slot.generation == id.1))
        else {
            return Err(PinError::UnknownPin);
        };
        self.free_list.push(id.idx());
        self.order.retain(|&live| live != id);
        slot.pin.remove(host);
        debug!(?id, pins = self.order.len(), "pin unregistered");
        if self.order.is_empty() {
            self.stop();
        }
        Ok(())
    }

    /// Whether `id` names a live pin.
    pub fn contains(&self, id: PinId) -> bool {
        matches!(self.slots.get(id.idx()), Some(Some(slot)) if slot.generation == id.1)
    }

    /// The pin registered under `id`.
    pub fn get(&self, id: PinId) -> Option<&Pin<H>> {
        match self.slots.get(id.idx()) {
            Some(Some(slot)) if slot.generation == id.1 => Some(&slot.pin),
            _ => None,
        }
    }

    /// Mutable access to the pin registered under `id`.
    pub fn get_mut(&mut self, id: PinId) -> Option<&mut Pin<H>> {
        match self.slots.get_mut(id.idx()) {
            Some(Some(slot)) if slot.generation == id.1 => Some(&mut slot.pin),
            _ => None,
        }
    }

    /// Number of live pins.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no pins are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live pins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PinId, &Pin<H>)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|pin| (id, pin)))
    }

    /// Whether the loop is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start the loop and run one tick right away.
    ///
    /// Does nothing if the loop is already running. The next tick compares
    /// against no previous viewport, so every pin sees a viewport change.
    pub fn start(&mut self, host: &mut H) {
        if self.active {
            return;
        }
        self.active = true;
        self.last_viewport = None;
        debug!(pins = self.order.len(), "pin scheduler started");
        self.tick(host);
    }

    /// Stop the loop.
    ///
    /// A frame that was already requested still arrives, but its tick does
    /// nothing and requests no further frames.
    pub fn stop(&mut self) {
        if self.active {
            self.active = false;
            debug!("pin scheduler stopped");
        }
    }

    /// Run one frame: recompute every pin and request the next frame.
    ///
    /// Returns `false`, doing nothing, when the loop is stopped. While running,
    /// the viewport is read only if there is at least one pin, but the next
    /// frame is always requested.
    pub fn tick(&mut self, host: &mut H) -> bool {
        if !self.active {
            return false;
        }
        if !self.order.is_empty() {
            let viewport = host.viewport_rect();
            let viewport_changed = self.last_viewport != Some(viewport);
            self.last_viewport = Some(viewport);
            trace!(pins = self.order.len(), viewport_changed, "pin scheduler tick");
            for id in &self.order {
                if let Some(Some(slot)) = self.slots.get_mut(id.idx())
                    && slot.generation == id.1
                {
                    slot.pin.recompute(host, viewport, viewport_changed);
                }
            }
        }
        host.request_frame();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Property;
    use crate::scene::{Scene, SceneNode};
    use crate::{Anchor, Placement};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::Size;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn below() -> PinOptions<Scene> {
        PinOptions::default().with_position(Placement::new().with_target(Anchor::percent(0.0, 100.0)))
    }

    fn scene_with_target() -> (Scene, SceneNode) {
        let mut scene = Scene::new(VIEWPORT);
        let root = scene.root();
        let target = scene.add_element(root, Rect::new(100.0, 100.0, 200.0, 120.0));
        (scene, target)
    }

    #[test]
    fn first_insert_starts_and_places() {
        let (mut scene, target) = scene_with_target();
        let tip = scene.add_content(scene.root(), Size::new(50.0, 30.0));
        let mut pins = Scheduler::new();
        assert!(!pins.is_active());

        let id = pins.insert(&mut scene, tip, target, below()).unwrap();
        assert!(pins.is_active());
        assert_eq!(scene.frames_requested(), 1);
        assert_eq!(pins.get(id).unwrap().last_position(), Some(0));
    }

    #[test]
    fn failed_insert_registers_nothing() {
        let (mut scene, target) = scene_with_target();
        let tip = scene.add_content(scene.root(), Size::new(50.0, 30.0));
        let mut pins = Scheduler::new();
        let err = pins
            .insert(&mut scene, tip, target, PinOptions::default())
            .unwrap_err();
        assert_eq!(err, PinError::NoCandidates);
        assert!(pins.is_empty());
        assert!(!pins.is_active());
        assert_eq!(scene.frames_requested(), 0);
    }

    #[test]
    fn tick_requests_frames_until_stopped() {
        let (mut scene, target) = scene_with_target();
        let tip = scene.add_content(scene.root(), Size::new(50.0, 30.0));
        let mut pins = Scheduler::new();
        pins.insert(&mut scene, tip, target, below()).unwrap();
        assert!(pins.tick(&mut scene));
        assert!(pins.tick(&mut scene));
        assert_eq!(scene.frames_requested(), 3);

        pins.stop();
        assert!(!pins.tick(&mut scene), "stopped loop does not reschedule");
        assert_eq!(scene.frames_requested(), 3);
    }

    #[test]
    fn start_is_idempotent() {
        let mut scene = Scene::new(VIEWPORT);
        let mut pins = Scheduler::<Scene>::new();
        pins.start(&mut scene);
        pins.start(&mut scene);
        assert_eq!(scene.frames_requested(), 1);
        // Empty but active: keeps scheduling frames.
        assert!(pins.tick(&mut scene));
        assert_eq!(scene.frames_requested(), 2);
    }

    #[test]
    fn idle_ticks_write_nothing() {
        let (mut scene, target) = scene_with_target();
        let tip = scene.add_content(scene.root(), Size::new(50.0, 30.0));
        let mut pins = Scheduler::new();
        pins.insert(&mut scene, tip, target, below()).unwrap();
        scene.clear_writes();
        for _ in 0..5 {
            pins.tick(&mut scene);
        }
        assert!(scene.writes().is_empty());
    }

    #[test]
    fn viewport_change_reaches_every_pin() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let a = scene.add_content(root, Size::new(50.0, 30.0));
        let b = scene.add_content(root, Size::new(20.0, 20.0));
        let mut pins = Scheduler::new();
        pins.insert(&mut scene, a, target, below()).unwrap();
        pins.insert(&mut scene, b, target, below()).unwrap();
        pins.tick(&mut scene);
        scene.clear_writes();

        scene.set_viewport(Rect::new(0.0, 0.0, 1024.0, 768.0));
        pins.tick(&mut scene);
        let touched: Vec<_> = pins
            .iter()
            .map(|(_, pin)| {
                let w = pin.wrapper();
                scene.writes().iter().any(|(n, p, _)| *n == w && *p == Property::Top)
            })
            .collect();
        assert_eq!(touched, vec![true, true]);
    }

    #[test]
    fn pins_recompute_in_registration_order() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pins = Scheduler::new();
        let mut ids = Vec::new();
        for name in ["first", "second", "third"] {
            let tip = scene.add_content(root, Size::new(10.0, 10.0));
            let log = Rc::clone(&log);
            let options = below().on_recalc(move |_, _| log.borrow_mut().push(name));
            ids.push(pins.insert(&mut scene, tip, target, options).unwrap());
        }
        log.borrow_mut().clear();
        pins.remove(&mut scene, ids[0]).unwrap();
        let again = scene.add_content(root, Size::new(10.0, 10.0));
        let log2 = Rc::clone(&log);
        let id = pins
            .insert(
                &mut scene,
                again,
                target,
                below().on_recalc(move |_, _| log2.borrow_mut().push("fourth")),
            )
            .unwrap();
        assert_eq!(id.idx(), ids[0].idx(), "freed slot is reused");
        assert_ne!(id, ids[0]);

        scene.set_viewport(Rect::new(0.0, 0.0, 640.0, 480.0));
        log.borrow_mut().clear();
        pins.tick(&mut scene);
        assert_eq!(*log.borrow(), vec!["second", "third", "fourth"]);
    }

    #[test]
    fn stale_ids_are_rejected() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let tip = scene.add_content(root, Size::new(10.0, 10.0));
        let keep = scene.add_content(root, Size::new(10.0, 10.0));
        let mut pins = Scheduler::new();
        let id = pins.insert(&mut scene, tip, target, below()).unwrap();
        pins.insert(&mut scene, keep, target, below()).unwrap();

        pins.remove(&mut scene, id).unwrap();
        assert_eq!(pins.remove(&mut scene, id), Err(PinError::UnknownPin));
        assert!(pins.get(id).is_none());
        assert!(!pins.contains(id));
        assert_eq!(pins.len(), 1);
        assert!(pins.is_active());
    }

    #[test]
    fn stale_id_does_not_remove_slot_reuser() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let first = scene.add_content(root, Size::new(10.0, 10.0));
        let second = scene.add_content(root, Size::new(10.0, 10.0));
        let mut pins = Scheduler::new();
        let stale = pins.insert(&mut scene, first, target, below()).unwrap();
        pins.remove(&mut scene, stale).unwrap();
        let live = pins.insert(&mut scene, second, target, below()).unwrap();
        assert_eq!(live.idx(), stale.idx(), "the freed slot is reused");

        assert_eq!(pins.remove(&mut scene, stale), Err(PinError::UnknownPin));
        assert!(pins.contains(live));
        assert_eq!(pins.len(), 1);
        assert!(pins.is_active());
        let wrapper = pins.get(live).unwrap().wrapper();
        assert_eq!(scene.parent(second), Some(wrapper));
    }

    #[test]
    fn removing_last_pin_stops_and_restores() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let tip = scene.add_content(root, Size::new(10.0, 10.0));
        let before = scene.children_of(root).to_vec();
        let mut pins = Scheduler::new();
        let id = pins.insert(&mut scene, tip, target, below()).unwrap();
        pins.remove(&mut scene, id).unwrap();
        assert!(!pins.is_active());
        assert_eq!(scene.children_of(root), before.as_slice());
    }

    #[test]
    fn orphaned_pin_does_not_block_others() {
        let (mut scene, target) = scene_with_target();
        let root = scene.root();
        let a = scene.add_content(root, Size::new(10.0, 10.0));
        let b = scene.add_content(root, Size::new(10.0, 10.0));
        let mut pins = Scheduler::new();
        let ia = pins.insert(&mut scene, a, target, below()).unwrap();
        let ib = pins.insert(&mut scene, b, target, below()).unwrap();
        let wa = pins.get(ia).unwrap().wrapper();
        scene.remove(wa);

        scene.set_rect(target, Rect::new(300.0, 100.0, 400.0, 120.0));
        pins.tick(&mut scene);
        let wb = pins.get(ib).unwrap().wrapper();
        assert_eq!(scene.bounding_rect(wb).origin().x, 300.0);
    }
}
