//! Fixed timestep simulation tick
//!
//! One call advances every component in a fixed order:
//! timers → player control → motion → gravity → collisions → session,
//! then compacts the registry. Nothing re-enters mid-tick.

use glam::Vec2;

use super::collision::{self, Contact, DEFAULT_RULES, Singletons};
use super::entity::{Body, EntityKind, Variant};
use super::motion;
use super::spawner::{self, TimerAction};
use super::state::{DestroyCause, GameEvent, GameState};
use crate::frame_scale;

/// Groups the singularity pulls on
pub const GRAVITY_KINDS: [EntityKind; 2] = [EntityKind::Hostile, EntityKind::Hazard];

/// Input for a single tick (held directions and fire)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    /// Let the built-in pilot fly (headless runs, attract mode)
    pub autopilot: bool,
}

/// Advance the game state by one timestep of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !state.is_running() || !dt.is_finite() || dt <= 0.0 {
        return;
    }
    state.time_ticks += 1;

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    // 1. Timers
    for action in state.scheduler.step(dt) {
        run_timer_action(state, action);
    }

    // 2. Player control and firing
    steer_player(state, &input);
    if input.fire {
        try_fire(state);
    }

    // 3. Motion
    motion::integrate(&mut state.player.body, dt);
    motion::clamp_to_viewport(&mut state.player.body, &state.config.viewport);
    motion::integrate_registry(&mut state.registry, dt);
    state
        .singularity
        .update(&state.config.singularity, &state.config.viewport, &mut state.rng, dt);
    retire_stale(state, dt);

    // 4. Gravity
    let consumed = state.singularity.apply(
        &mut state.registry,
        &GRAVITY_KINDS,
        &state.config.singularity,
        frame_scale(dt),
    );
    for id in consumed {
        state.push_event(GameEvent::Destroyed {
            id,
            cause: DestroyCause::Consumed,
        });
    }

    // 5. Collisions and session
    let contacts = {
        let singletons = Singletons {
            player: &state.player.body,
            singularity: &state.singularity.body,
        };
        collision::resolve(&mut state.registry, &singletons, &DEFAULT_RULES)
    };
    for contact in contacts {
        match contact {
            Contact::Scored { a, b } => {
                state.push_event(GameEvent::Destroyed {
                    id: a,
                    cause: DestroyCause::Contact(b.kind),
                });
                state.push_event(GameEvent::Destroyed {
                    id: b,
                    cause: DestroyCause::Contact(a.kind),
                });
                state.score_point();
            }
            Contact::Destroyed { id, by } => {
                state.push_event(GameEvent::Destroyed {
                    id,
                    cause: DestroyCause::Contact(by),
                });
            }
            Contact::GameOver { cause } => state.end_session(cause),
        }
    }

    state.registry.compact();
}

fn run_timer_action(state: &mut GameState, action: TimerAction) {
    let config = &state.config;
    let spawned = match action {
        TimerAction::SpawnHostile => spawner::spawn_hostile(
            &mut state.registry,
            &config.viewport,
            &config.timers,
            &config.hostile,
            &mut state.rng,
        ),
        TimerAction::SpawnHazard => spawner::spawn_hazard(
            &mut state.registry,
            &config.viewport,
            &config.timers,
            &config.hazard,
            &mut state.rng,
        ),
        TimerAction::ClockTick => {
            state.session.tick_clock();
            None
        }
    };

    if let Some(id) = spawned {
        let pos = state
            .registry
            .get(id)
            .map(|e| e.body.pos)
            .unwrap_or_default();
        state.push_event(GameEvent::Spawned { id, pos });
    }
}

/// Set the player's velocity and bank from held directions
fn steer_player(state: &mut GameState, input: &TickInput) {
    let cfg = &state.config.player;
    let player = &mut state.player;

    if input.left {
        player.body.vel.x = -cfg.speed_x;
        player.tilt = -cfg.tilt_degrees;
    } else if input.right {
        player.body.vel.x = cfg.speed_x;
        player.tilt = cfg.tilt_degrees;
    } else {
        player.body.vel.x = 0.0;
        player.tilt = 0.0;
    }

    player.body.vel.y = if input.up {
        -cfg.speed_y
    } else if input.down {
        cfg.speed_y
    } else {
        0.0
    };
}

/// Spawn a projectile above the player unless the cooldown is running
fn try_fire(state: &mut GameState) {
    let now = state.scheduler.now();
    if now < state.player.next_fire_at {
        return;
    }
    let cfg = &state.config.projectile;
    let muzzle = state.player.body.pos - Vec2::new(0.0, cfg.muzzle_offset);
    let body = Body::new(muzzle, cfg.radius).with_velocity(Vec2::new(0.0, -cfg.speed));
    let id = state.registry.spawn(
        Variant::Projectile {
            ttl: cfg.lifetime,
        },
        body,
    );
    state.player.next_fire_at = now + f64::from(cfg.fire_cooldown);
    state.push_event(GameEvent::Spawned { id, pos: muzzle });
}

/// Expire old projectiles and cull anything far off screen
fn retire_stale(state: &mut GameState, dt: f32) {
    let mut retired = Vec::new();

    state
        .registry
        .for_each_active_mut(EntityKind::Projectile, |entity| {
            if let Variant::Projectile { ttl } = &mut entity.variant {
                *ttl -= dt;
                if *ttl <= 0.0 {
                    entity.body.active = false;
                    retired.push((entity.id, DestroyCause::Expired));
                }
            }
        });

    let viewport = state.config.viewport;
    let margin = state.config.timers.despawn_margin;
    if viewport.is_valid() {
        for kind in EntityKind::POOLED {
            state.registry.for_each_active_mut(kind, |entity| {
                if viewport.is_far_outside(entity.body.pos, margin) {
                    entity.body.active = false;
                    retired.push((entity.id, DestroyCause::OffScreen));
                }
            });
        }
    }

    for (id, cause) in retired {
        state.push_event(GameEvent::Destroyed { id, cause });
    }
}

/// Simple pilot: dodge nearby hazards and the singularity, otherwise line
/// up under the nearest hostile and keep firing
fn autopilot(state: &GameState) -> TickInput {
    let pos = state.player.body.pos;
    let viewport = &state.config.viewport;
    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };

    // Sum of repulsions from everything dangerous nearby
    let mut push = Vec2::ZERO;
    let danger_range = 160.0;
    for hazard in state.registry.iter_active(EntityKind::Hazard) {
        // Look a little ahead along the hazard's path
        let future = hazard.body.pos + hazard.body.vel * 0.25;
        let away = pos - future;
        let dist = away.length() - hazard.body.radius;
        if dist < danger_range {
            push += away.normalize_or_zero() * (danger_range - dist.max(0.0));
        }
    }
    let hole = state.singularity.pos();
    let hole_range = state.singularity.body.radius + danger_range;
    let away = pos - hole;
    if away.length() < hole_range {
        push += away.normalize_or_zero() * (hole_range - away.length()) * 2.0;
    }

    if push.length_squared() > 1.0 {
        input.left = push.x < -0.5;
        input.right = push.x > 0.5;
        input.up = push.y < -0.5;
        input.down = push.y > 0.5;
        return input;
    }

    if let Some(target) = state
        .registry
        .iter_active(EntityKind::Hostile)
        .filter(|h| h.body.pos.y < pos.y)
        .min_by(|a, b| {
            (a.body.pos.x - pos.x)
                .abs()
                .total_cmp(&(b.body.pos.x - pos.x).abs())
        })
    {
        let dx = target.body.pos.x - pos.x;
        input.left = dx < -8.0;
        input.right = dx > 8.0;
    }

    // Drift back toward the home row
    let home_y = viewport.height - state.config.player.start_offset;
    input.down = pos.y < home_y - 10.0;
    input.up = pos.y > home_y + 10.0;
    input
}
