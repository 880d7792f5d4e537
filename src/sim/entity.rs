//! Entity data model
//!
//! Every moving thing shares a [`Body`] (the kinematic record). Pooled
//! entities add a [`Variant`] carrying kind-specific fields; the player and
//! the singularity are session-scoped singletons with their own structs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kind tag used for dispatch in collision and gravity passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Projectile,
    Hostile,
    Hazard,
    Singularity,
}

impl EntityKind {
    /// Kinds owned by the registry (everything except the singletons)
    pub const POOLED: [EntityKind; 3] = [
        EntityKind::Projectile,
        EntityKind::Hostile,
        EntityKind::Hazard,
    ];

    pub fn is_pooled(self) -> bool {
        matches!(
            self,
            EntityKind::Projectile | EntityKind::Hostile | EntityKind::Hazard
        )
    }
}

/// Stable handle to a pooled entity. Serials are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub serial: u32,
}

/// Shared kinematic record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    /// Acceleration (px/s²), if any
    pub accel: Option<Vec2>,
    /// Collision circle radius
    pub radius: f32,
    /// Orientation (radians), visual only
    pub rotation: f32,
    /// Angular velocity (radians/s), visual only
    pub spin: f32,
    pub active: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            accel: None,
            radius,
            rotation: 0.0,
            spin: 0.0,
            active: true,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_accel(mut self, accel: Vec2) -> Self {
        self.accel = Some(accel);
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }
}

/// Kind-specific state of a pooled entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    /// Seconds left before the shot expires
    Projectile { ttl: f32 },
    Hostile { scale: f32 },
    Hazard { scale: f32 },
}

impl Variant {
    pub fn kind(&self) -> EntityKind {
        match self {
            Variant::Projectile { .. } => EntityKind::Projectile,
            Variant::Hostile { .. } => EntityKind::Hostile,
            Variant::Hazard { .. } => EntityKind::Hazard,
        }
    }
}

/// A registry-owned entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub variant: Variant,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.id.kind
    }

    pub fn is_active(&self) -> bool {
        self.body.active
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Bank angle for rendering (degrees)
    pub tilt: f32,
    /// Session time before which firing is blocked
    pub next_fire_at: f64,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            body: Body::new(pos, radius),
            tilt: 0.0,
            next_fire_at: 0.0,
        }
    }
}
