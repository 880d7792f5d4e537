//! Timed spawning
//!
//! Timers are plain data (interval, next fire time, action) stepped once per
//! tick by the [`Scheduler`]. The actions they produce are executed by the
//! tick against the registry, so no timer ever holds a reference into the
//! game state.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId, Variant};
use super::registry::Registry;
use crate::config::{HazardConfig, HostileConfig, TimerConfig, Viewport};
use crate::{angle_between, direction, sample_range};

/// Maximum times one timer may fire in a single step when catching up
pub const MAX_CATCH_UP: u32 = 8;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    SpawnHostile,
    SpawnHazard,
    /// Advance the session clock by one second
    ClockTick,
}

/// A repeating timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    pub action: TimerAction,
    /// Seconds between firings
    pub interval: f32,
    /// Scheduler time of the next firing
    pub next_fire: f64,
}

/// Steps all repeating timers against a shared clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    timers: Vec<Timer>,
    /// Seconds since the scheduler started
    now: f64,
    stopped: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hostile, hazard and clock timers from configuration
    pub fn from_config(config: &TimerConfig) -> Self {
        let mut scheduler = Self::new();
        scheduler.add(TimerAction::SpawnHostile, config.hostile_interval);
        scheduler.add(TimerAction::SpawnHazard, config.hazard_interval);
        scheduler.add(TimerAction::ClockTick, config.clock_interval);
        scheduler
    }

    /// Register a repeating timer. The first firing is one interval from now.
    /// Non-positive or non-finite intervals are rejected.
    pub fn add(&mut self, action: TimerAction, interval: f32) -> bool {
        if !interval.is_finite() || interval <= 0.0 {
            log::warn!("Timer {:?} disabled: invalid interval {}", action, interval);
            return false;
        }
        self.timers.push(Timer {
            action,
            interval,
            next_fire: self.now + f64::from(interval),
        });
        true
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    /// Stop every timer; later steps fire nothing
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance the clock by `dt` and return the actions that came due, in
    /// firing-time order.
    pub fn step(&mut self, dt: f32) -> Vec<TimerAction> {
        if self.stopped || !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }
        self.now += f64::from(dt);

        let mut due: Vec<(f64, usize, TimerAction)> = Vec::new();
        for (index, timer) in self.timers.iter_mut().enumerate() {
            let mut fired = 0;
            while timer.next_fire <= self.now && fired < MAX_CATCH_UP {
                due.push((timer.next_fire, index, timer.action));
                timer.next_fire += f64::from(timer.interval);
                fired += 1;
            }
            if timer.next_fire <= self.now {
                // Drop the backlog rather than bursting next step
                log::debug!("Timer {:?} skipped backlog", timer.action);
                timer.next_fire = self.now + f64::from(timer.interval);
            }
        }

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, action)| action).collect()
    }
}

/// Edge a hazard enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 3] = [SpawnEdge::Top, SpawnEdge::Left, SpawnEdge::Right];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Off-screen point just outside `edge`
pub fn edge_spawn_point<R: Rng>(
    edge: SpawnEdge,
    viewport: &Viewport,
    timers: &TimerConfig,
    rng: &mut R,
) -> Vec2 {
    let inset = timers.edge_inset;
    let bias = timers.offscreen_bias;
    match edge {
        SpawnEdge::Top => Vec2::new(
            sample_range(rng, inset, viewport.width - inset),
            -bias,
        ),
        SpawnEdge::Left => Vec2::new(
            -bias,
            sample_range(rng, inset, viewport.height - inset),
        ),
        SpawnEdge::Right => Vec2::new(
            viewport.width + bias,
            sample_range(rng, inset, viewport.height - inset),
        ),
    }
}

/// Drop a hostile in from the top edge, falling straight down
pub fn spawn_hostile<R: Rng>(
    registry: &mut Registry,
    viewport: &Viewport,
    timers: &TimerConfig,
    config: &HostileConfig,
    rng: &mut R,
) -> Option<EntityId> {
    if !viewport.is_valid() {
        log::debug!("Hostile spawn skipped: degenerate viewport {:?}", viewport);
        return None;
    }

    let pos = edge_spawn_point(SpawnEdge::Top, viewport, timers, rng);
    let body = Body::new(pos, config.base_radius * config.scale)
        .with_velocity(Vec2::new(0.0, config.speed));
    Some(registry.spawn(Variant::Hostile { scale: config.scale }, body))
}

/// Launch a hazard from a random edge toward the viewport center, with a
/// little spin and a curving drift
pub fn spawn_hazard<R: Rng>(
    registry: &mut Registry,
    viewport: &Viewport,
    timers: &TimerConfig,
    config: &HazardConfig,
    rng: &mut R,
) -> Option<EntityId> {
    if !viewport.is_valid() {
        log::debug!("Hazard spawn skipped: degenerate viewport {:?}", viewport);
        return None;
    }

    let edge = SpawnEdge::random(rng);
    let pos = edge_spawn_point(edge, viewport, timers, rng);

    let scale = sample_range(rng, config.scale_min, config.scale_max);
    let speed = sample_range(rng, config.speed_min, config.speed_max);
    let heading = angle_between(pos, viewport.center());

    let spin = sample_range(rng, -config.spin_max, config.spin_max).to_radians();
    let accel = Vec2::new(
        sample_range(rng, -config.accel_max, config.accel_max),
        sample_range(rng, -config.accel_max, config.accel_max),
    );
    let radius = config.visual_width * scale * 0.5 * config.radius_factor;

    let body = Body::new(pos, radius)
        .with_velocity(direction(heading) * speed)
        .with_accel(accel)
        .with_spin(spin);
    Some(registry.spawn(Variant::Hazard { scale }, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_scheduler_cadence() {
        let mut scheduler = Scheduler::from_config(&TimerConfig::default());
        let mut hostiles = 0;
        let mut hazards = 0;
        let mut clock = 0;
        // Ten seconds in 1/60 s steps
        for _ in 0..600 {
            for action in scheduler.step(1.0 / 60.0) {
                match action {
                    TimerAction::SpawnHostile => hostiles += 1,
                    TimerAction::SpawnHazard => hazards += 1,
                    TimerAction::ClockTick => clock += 1,
                }
            }
        }
        assert!((9..=10).contains(&hostiles), "hostiles = {}", hostiles);
        assert!((4..=5).contains(&hazards), "hazards = {}", hazards);
        assert_eq!(hostiles, clock);
    }

    #[test]
    fn test_clock_keeps_pace_for_an_hour() {
        let mut scheduler = Scheduler::from_config(&TimerConfig::default());
        let mut clock = 0;
        let mut hazards = 0;
        // One hour in 1/60 s steps
        for _ in 0..(3600 * 60) {
            for action in scheduler.step(1.0 / 60.0) {
                match action {
                    TimerAction::ClockTick => clock += 1,
                    TimerAction::SpawnHazard => hazards += 1,
                    TimerAction::SpawnHostile => {}
                }
            }
        }
        assert_eq!(clock, 3600);
        assert_eq!(hazards, 1800);
        assert!((scheduler.now() - 3600.0).abs() < 1e-2);
    }

    #[test]
    fn test_clock_advances_after_days() {
        let mut scheduler = Scheduler::new();
        scheduler.add(TimerAction::ClockTick, 1.0);
        // Six days in, where single-precision time stops advancing
        let start = 524_288.0;
        scheduler.now = start;
        scheduler.timers[0].next_fire = start + 1.0;

        let mut clock = 0;
        for _ in 0..60 {
            clock += scheduler.step(1.0 / 60.0).len();
        }
        assert!(scheduler.now() > start + 0.99);
        assert_eq!(clock, 1);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.add(TimerAction::SpawnHostile, 0.0));
        assert!(!scheduler.add(TimerAction::SpawnHazard, f32::NAN));
        assert!(scheduler.timers().is_empty());
        assert!(scheduler.step(10.0).is_empty());
    }

    #[test]
    fn test_stopped_scheduler_fires_nothing() {
        let mut scheduler = Scheduler::from_config(&TimerConfig::default());
        scheduler.stop();
        assert!(scheduler.step(5.0).is_empty());
        assert_eq!(scheduler.now(), 0.0);
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut scheduler = Scheduler::new();
        scheduler.add(TimerAction::SpawnHostile, 0.1);
        let fired = scheduler.step(100.0);
        assert_eq!(fired.len(), MAX_CATCH_UP as usize);
        // Backlog dropped: the next step only fires on schedule
        assert!(scheduler.step(0.05).is_empty());
    }

    #[test]
    fn test_hostile_spawns_from_top() {
        let mut registry = Registry::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let viewport = Viewport::new(800.0, 600.0);
        let config = HostileConfig::default();

        let timers = TimerConfig::default();

        for _ in 0..50 {
            let id = spawn_hostile(&mut registry, &viewport, &timers, &config, &mut rng).unwrap();
            let e = registry.get(id).unwrap();
            assert_eq!(e.body.pos.y, -50.0);
            assert!((50.0..=750.0).contains(&e.body.pos.x));
            assert_eq!(e.body.vel, Vec2::new(0.0, 100.0));
            assert_eq!(e.variant, Variant::Hostile { scale: 0.8 });
        }
    }

    #[test]
    fn test_degenerate_viewport_is_noop() {
        let mut registry = Registry::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let timers = TimerConfig::default();
        let hazards = HazardConfig::default();
        let hostiles = HostileConfig::default();
        for viewport in [Viewport::new(0.0, 600.0), Viewport::new(800.0, -5.0)] {
            assert!(spawn_hazard(&mut registry, &viewport, &timers, &hazards, &mut rng).is_none());
            let hostile = spawn_hostile(&mut registry, &viewport, &timers, &hostiles, &mut rng);
            assert!(hostile.is_none());
        }
        assert_eq!(registry.total_active(), 0);
    }

    #[test]
    fn test_narrow_viewport_spawns_finite_positions() {
        let mut registry = Registry::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let viewport = Viewport::new(60.0, 40.0);
        let timers = TimerConfig::default();
        let id = spawn_hazard(
            &mut registry,
            &viewport,
            &timers,
            &HazardConfig::default(),
            &mut rng,
        )
        .unwrap();
        let body = registry.get(id).unwrap().body;
        assert!(body.pos.is_finite());
        assert!(body.vel.is_finite());
    }

    #[test]
    fn test_hazard_radius_from_scale() {
        let mut registry = Registry::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let config = HazardConfig::default();
        let viewport = Viewport::new(800.0, 600.0);
        let timers = TimerConfig::default();
        let id = spawn_hazard(&mut registry, &viewport, &timers, &config, &mut rng).unwrap();
        let e = registry.get(id).unwrap();
        let Variant::Hazard { scale } = e.variant else {
            panic!("expected hazard");
        };
        assert!((0.2..=0.7).contains(&scale));
        assert!((e.body.radius - 128.0 * scale * 0.5 * 0.6).abs() < 1e-4);
        let accel = e.body.accel.unwrap();
        assert!(accel.x.abs() <= 30.0 && accel.y.abs() <= 30.0);
        assert!(e.body.spin.abs() <= 200f32.to_radians() + 1e-6);
        assert_eq!(registry.active_count(EntityKind::Hazard), 1);
    }

    proptest! {
        #[test]
        fn prop_hazard_aims_at_center(seed in any::<u64>()) {
            let mut registry = Registry::new();
            let mut rng = Pcg32::seed_from_u64(seed);
            let viewport = Viewport::new(800.0, 600.0);
            let config = HazardConfig::default();
            let timers = TimerConfig::default();
            let id = spawn_hazard(&mut registry, &viewport, &timers, &config, &mut rng).unwrap();
            let body = registry.get(id).unwrap().body;

            let expected = (300.0 - body.pos.y).atan2(400.0 - body.pos.x);
            let actual = body.vel.y.atan2(body.vel.x);
            prop_assert!((expected - actual).abs() < 1e-4);

            let speed = body.vel.length();
            prop_assert!(speed >= 250.0 - 1e-2 && speed <= 550.0 + 1e-2);

            let p = body.pos;
            let on_top = p.y == -50.0 && (50.0..=750.0).contains(&p.x);
            let on_left = p.x == -50.0 && (50.0..=550.0).contains(&p.y);
            let on_right = p.x == 850.0 && (50.0..=550.0).contains(&p.y);
            prop_assert!(on_top || on_left || on_right);
        }
    }
}
