//! Star Fighter - arcade space shooter with a wandering black hole
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, gravity, collisions, session)
//! - `config`: Data-driven game balance
//! - `persistence`: Best score storage
//! - `leaderboard`: Remote score table contract and local model

pub mod config;
pub mod leaderboard;
pub mod persistence;
pub mod sim;

pub use config::SimConfig;
pub use leaderboard::{LeaderboardService, LocalLeaderboard, ScoreEntry};
pub use persistence::{BestScoreStore, MemoryStore};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame rate the per-frame impulses (gravity, spin) are tuned for
    pub const REFERENCE_HZ: f32 = 60.0;

    /// Default viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 720.0;
}

/// Number of reference frames covered by `dt` seconds.
///
/// Per-frame impulses are multiplied by this so they stay correct when the
/// host steps at a rate other than [`consts::REFERENCE_HZ`].
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt * consts::REFERENCE_HZ
}

/// Angle (radians) of the ray from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Euclidean distance between two points
#[inline]
pub fn distance_between(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Uniform sample in `[lo, hi]`, collapsing to `lo` for empty or inverted ranges
#[inline]
pub fn sample_range<R: rand::Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_between_axes() {
        let origin = Vec2::ZERO;
        assert!((angle_between(origin, Vec2::new(1.0, 0.0))).abs() < 1e-6);
        assert!((angle_between(origin, Vec2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_between(origin, Vec2::new(-1.0, 0.0)).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_distance_between() {
        let d = distance_between(Vec2::new(400.0, 300.0), Vec2::new(500.0, 300.0));
        assert!((d - 100.0).abs() < 1e-4);
        assert_eq!(distance_between(Vec2::ONE, Vec2::ONE), 0.0);
    }

    #[test]
    fn test_sample_range_degenerate() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(sample_range(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(sample_range(&mut rng, 5.0, -3.0), 5.0);
        let v = sample_range(&mut rng, 1.0, 2.0);
        assert!((1.0..=2.0).contains(&v));
    }

    #[test]
    fn test_frame_scale() {
        assert!((frame_scale(consts::SIM_DT) - 1.0).abs() < 1e-6);
        assert!((frame_scale(consts::SIM_DT * 2.0) - 2.0).abs() < 1e-6);
    }
}
