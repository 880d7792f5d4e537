//! Simulation tuning
//!
//! Every gameplay constant lives here so hosts can rebalance without
//! touching the simulation. Partial JSON files are accepted: missing
//! fields keep their defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False for zero, negative or non-finite dimensions
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True when `pos` is farther than `margin` outside the viewport
    pub fn is_far_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.y < -margin
            || pos.x > self.width + margin
            || pos.y > self.height + margin
    }
}

/// Player craft handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed while left/right is held (px/s)
    pub speed_x: f32,
    /// Vertical speed while up/down is held (px/s)
    pub speed_y: f32,
    pub radius: f32,
    /// Spawn distance above the bottom edge
    pub start_offset: f32,
    /// Visual bank angle while strafing (degrees)
    pub tilt_degrees: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed_x: 300.0,
            speed_y: 250.0,
            radius: 20.0,
            start_offset: 100.0,
            tilt_degrees: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Upward speed (px/s)
    pub speed: f32,
    pub radius: f32,
    /// Seconds before an unspent projectile expires
    pub lifetime: f32,
    /// Minimum seconds between shots
    pub fire_cooldown: f32,
    /// Spawn distance above the player center
    pub muzzle_offset: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 400.0,
            radius: 4.0,
            lifetime: 2.0,
            fire_cooldown: 0.25,
            muzzle_offset: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileConfig {
    /// Fixed downward speed (px/s)
    pub speed: f32,
    pub scale: f32,
    /// Collision radius at scale 1.0
    pub base_radius: f32,
}

impl Default for HostileConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            scale: 0.8,
            base_radius: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub scale_min: f32,
    pub scale_max: f32,
    /// Speed toward the viewport center (px/s)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Absolute bound on spin (degrees/s)
    pub spin_max: f32,
    /// Absolute bound on each acceleration component (px/s²)
    pub accel_max: f32,
    /// Sprite width at scale 1.0
    pub visual_width: f32,
    /// Fraction of the half-width used as collision radius
    pub radius_factor: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.2,
            scale_max: 0.7,
            speed_min: 250.0,
            speed_max: 550.0,
            spin_max: 200.0,
            accel_max: 30.0,
            visual_width: 128.0,
            radius_factor: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SingularityConfig {
    /// Numerator of the inverse-distance pull
    pub gravity_strength: f32,
    /// Entities closer than this are consumed
    pub kill_radius: f32,
    /// Lower bound on the scaled distance in the force denominator
    pub distance_floor: f32,
    /// Multiplier applied to distance before flooring
    pub distance_factor: f32,
    /// Overlap radius against the player, hostiles and hazards
    pub radius: f32,
    /// Inset of the wander rectangle from every viewport edge
    pub move_inset: f32,
    /// Wander leg duration range (seconds)
    pub wander_min: f32,
    pub wander_max: f32,
    /// Rotation per reference frame (radians)
    pub spin: f32,
}

impl Default for SingularityConfig {
    fn default() -> Self {
        Self {
            gravity_strength: 450.0,
            kill_radius: 20.0,
            distance_floor: 10.0,
            distance_factor: 0.5,
            radius: 40.0,
            move_inset: 100.0,
            wander_min: 7.0,
            wander_max: 15.0,
            spin: 0.005,
        }
    }
}

/// Spawn cadence and edge placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Seconds between hostile spawns (0 disables)
    pub hostile_interval: f32,
    /// Seconds between hazard spawns (0 disables)
    pub hazard_interval: f32,
    /// Seconds between session clock ticks
    pub clock_interval: f32,
    /// Keep spawn points this far from the viewport corners
    pub edge_inset: f32,
    /// How far outside the edge new entities appear
    pub offscreen_bias: f32,
    /// Entities beyond this distance outside the viewport are culled
    pub despawn_margin: f32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            hostile_interval: 1.0,
            hazard_interval: 2.0,
            clock_interval: 1.0,
            edge_inset: 50.0,
            offscreen_bias: 50.0,
            despawn_margin: 400.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub viewport: Viewport,
    pub player: PlayerConfig,
    pub projectile: ProjectileConfig,
    pub hostile: HostileConfig,
    pub hazard: HazardConfig,
    pub singularity: SingularityConfig,
    pub timers: TimerConfig,
}

impl SimConfig {
    /// Default tuning with a custom viewport
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file, falling back to defaults if it is missing or malformed
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read config {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
