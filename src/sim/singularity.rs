//! The black hole
//!
//! A single long-lived body that wanders the playfield on eased legs and
//! pulls hostiles and hazards toward itself every tick. Anything that gets
//! inside the kill radius is consumed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId, EntityKind};
use super::registry::Registry;
use crate::config::{SingularityConfig, Viewport};
use crate::consts::REFERENCE_HZ;
use crate::{angle_between, direction, distance_between, frame_scale, sample_range};

/// Smallest denominator allowed in the force law
const MIN_FORCE_DENOMINATOR: f32 = 1e-3;

/// Outcome of pulling one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pull {
    /// Inside the kill radius
    Consumed,
    /// Velocity change applied this tick
    Impulse(Vec2),
}

/// Magnitude of the per-frame pull at `distance`
pub fn gravity_force(distance: f32, config: &SingularityConfig) -> f32 {
    let denom = (distance * config.distance_factor)
        .max(config.distance_floor)
        .max(MIN_FORCE_DENOMINATOR);
    config.gravity_strength / denom
}

/// Sine in-out easing on `t` in [0, 1]
fn ease_in_out_sine(t: f32) -> f32 {
    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
}

/// One eased movement leg toward a random destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wander {
    pub from: Vec2,
    pub to: Vec2,
    /// Seconds into the current leg
    pub elapsed: f32,
    /// Total leg length in seconds
    pub duration: f32,
}

impl Wander {
    fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn position(&self) -> Vec2 {
        self.from.lerp(self.to, ease_in_out_sine(self.progress()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Singularity {
    pub body: Body,
    pub wander: Wander,
    /// Completed wander legs
    pub legs: u32,
}

impl Singularity {
    /// Place the singularity at `pos` and choose its first destination
    pub fn new<R: Rng>(
        pos: Vec2,
        config: &SingularityConfig,
        viewport: &Viewport,
        rng: &mut R,
    ) -> Self {
        let mut body = Body::new(pos, config.radius);
        body.spin = config.spin * REFERENCE_HZ;
        let mut singularity = Self {
            body,
            wander: Wander {
                from: pos,
                to: pos,
                elapsed: 0.0,
                duration: 0.0,
            },
            legs: 0,
        };
        singularity.start_leg(config, viewport, rng);
        singularity
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    fn start_leg<R: Rng>(&mut self, config: &SingularityConfig, viewport: &Viewport, rng: &mut R) {
        let inset = config.move_inset;
        let min = Vec2::splat(inset);
        let max = Vec2::new(viewport.width - inset, viewport.height - inset);

        let to = if viewport.is_valid() && max.x >= min.x && max.y >= min.y {
            Vec2::new(
                sample_range(rng, min.x, max.x),
                sample_range(rng, min.y, max.y),
            )
        } else {
            // Nowhere to wander; hold position
            self.body.pos
        };

        self.wander = Wander {
            from: self.body.pos,
            to,
            elapsed: 0.0,
            duration: sample_range(rng, config.wander_min, config.wander_max).max(0.0),
        };
    }

    /// Advance the wander leg and the visual spin
    pub fn update<R: Rng>(
        &mut self,
        config: &SingularityConfig,
        viewport: &Viewport,
        rng: &mut R,
        dt: f32,
    ) {
        self.body.rotation += config.spin * frame_scale(dt);

        self.wander.elapsed += dt;
        self.body.pos = self.wander.position();

        if self.wander.progress() >= 1.0 {
            self.body.pos = self.wander.to;
            self.legs += 1;
            self.start_leg(config, viewport, rng);
        }
    }

    /// Pull one body toward the singularity.
    ///
    /// Inside the kill radius the body is deactivated and its velocity is
    /// left as it was. Otherwise the per-frame impulse, scaled by
    /// `frame_scale`, is added to the current velocity.
    pub fn attract(&self, body: &mut Body, config: &SingularityConfig, frame_scale: f32) -> Pull {
        let distance = distance_between(body.pos, self.body.pos);
        if distance < config.kill_radius {
            body.active = false;
            return Pull::Consumed;
        }

        let angle = angle_between(body.pos, self.body.pos);
        let impulse = direction(angle) * gravity_force(distance, config) * frame_scale;
        body.vel += impulse;
        Pull::Impulse(impulse)
    }

    /// Run the gravity pass over every active entity of `kinds`.
    /// Returns the entities consumed this tick.
    pub fn apply(
        &self,
        registry: &mut Registry,
        kinds: &[EntityKind],
        config: &SingularityConfig,
        frame_scale: f32,
    ) -> Vec<EntityId> {
        let mut consumed = Vec::new();
        for &kind in kinds {
            registry.for_each_active_mut(kind, |entity| {
                if self.attract(&mut entity.body, config, frame_scale) == Pull::Consumed {
                    consumed.push(entity.id);
                }
            });
        }
        consumed
    }
}
