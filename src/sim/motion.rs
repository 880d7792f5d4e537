//! Motion integration
//!
//! Explicit Euler: position advances with the current velocity, then
//! velocity advances with acceleration. All rates are per second.

use glam::Vec2;

use super::entity::{Body, EntityKind};
use super::registry::Registry;
use crate::config::Viewport;

/// Advance one body by `dt` seconds. Inactive bodies are left untouched.
pub fn integrate(body: &mut Body, dt: f32) {
    if !body.active {
        return;
    }
    body.pos += body.vel * dt;
    if let Some(accel) = body.accel {
        body.vel += accel * dt;
    }
    body.rotation += body.spin * dt;
}

/// Advance every active pooled entity
pub fn integrate_registry(registry: &mut Registry, dt: f32) {
    for kind in EntityKind::POOLED {
        registry.for_each_active_mut(kind, |entity| integrate(&mut entity.body, dt));
    }
}

/// Keep a body fully inside the viewport (the player's world bounds)
pub fn clamp_to_viewport(body: &mut Body, viewport: &Viewport) {
    let r = body.radius.min(viewport.width / 2.0).min(viewport.height / 2.0).max(0.0);
    let min = Vec2::splat(r);
    let max = Vec2::new(viewport.width - r, viewport.height - r).max(min);
    body.pos = body.pos.clamp(min, max);
}
