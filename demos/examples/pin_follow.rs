// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tooltip that follows a target sliding across the viewport.
//!
//! This example shows how to:
//! - describe fallback placements (below, above, then to the right),
//! - drive a `Scheduler` frame by frame against an in-memory `Scene`,
//! - watch the chosen side flip as the target nears the viewport edges.
//!
//! Run:
//! - `cargo run -p understory_demos --example pin_follow`
//! - `RUST_LOG=understory_pin=debug cargo run -p understory_demos --example pin_follow`

use kurbo::{Rect, Size, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_pin::scene::Scene;
use understory_pin::{Anchor, Host, PinOptions, Placement, Property, Scheduler};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut scene = Scene::new(Rect::new(0.0, 0.0, 640.0, 480.0));
    let root = scene.root();
    let button = scene.add_element(root, Rect::new(40.0, 40.0, 140.0, 64.0));
    let tooltip = scene.add_content(root, Size::new(160.0, 90.0));

    let gap = 6.0;
    let options = PinOptions::default()
        .with_position(
            Placement::new()
                .with_target(Anchor::percent(0.0, 100.0))
                .with_offset(Anchor::px(0.0, gap)),
        )
        .with_position(
            Placement::new()
                .with_pinned(Anchor::percent(0.0, 100.0))
                .with_offset(Anchor::px(0.0, -gap)),
        )
        .with_position(
            Placement::new()
                .with_target(Anchor::percent(100.0, 0.0))
                .with_offset(Anchor::px(gap, 0.0))
                .shrink_height(true),
        )
        .with_viewport_offset(8.0)
        .with_wrapper_class("tooltip-wrapper");

    let mut pins = Scheduler::new();
    let id = match pins.insert(&mut scene, tooltip, button, options) {
        Ok(id) => id,
        Err(err) => {
            tracing::error!(%err, "could not pin tooltip");
            return;
        }
    };

    let step = Vec2::new(23.0, 19.0);
    for frame in 0..24 {
        let rect = scene.bounding_rect(button) + step;
        scene.set_rect(button, rect);
        pins.tick(&mut scene);

        if let Some(pin) = pins.get(id) {
            let wrapper = pin.wrapper();
            let side = match pin.last_position() {
                Some(0) => "below",
                Some(1) => "above",
                Some(2) => "right",
                _ => "none",
            };
            info!(
                frame,
                target = ?rect,
                tooltip = ?scene.bounding_rect(wrapper),
                side,
                max_height = ?scene.style(wrapper, Property::MaxHeight),
                "placed"
            );
        }
    }

    if let Err(err) = pins.remove(&mut scene, id) {
        tracing::error!(%err, "could not unpin tooltip");
    }
    info!(
        restored = scene.parent(tooltip) == Some(root),
        frames = scene.frames_requested(),
        "done"
    );
}
