//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity serial)
//! - No rendering, audio or network dependencies

pub mod collision;
pub mod entity;
pub mod motion;
pub mod registry;
pub mod singularity;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionRule, Contact, DEFAULT_RULES, Effect, circles_overlap};
pub use entity::{Body, Entity, EntityId, EntityKind, Player, Variant};
pub use registry::Registry;
pub use singularity::{Pull, Singularity, gravity_force};
pub use spawner::{Scheduler, SpawnEdge, TimerAction, spawn_hazard, spawn_hostile};
pub use state::{
    DestroyCause, FinalReport, GameEvent, GamePhase, GameState, Hud, Session, format_clock,
};
pub use tick::{TickInput, tick};
