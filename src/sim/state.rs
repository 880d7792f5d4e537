//! Game state and session bookkeeping
//!
//! One [`GameState`] is one run: it is built when a session starts and
//! dropped when the player starts another. Nothing here is process-global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityKind, Player};
use super::registry::Registry;
use super::singularity::Singularity;
use super::spawner::Scheduler;
use crate::config::SimConfig;
use crate::persistence::{self, BestScoreStore, MemoryStore};

/// Name used when the player leaves theirs blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    /// Terminal; a new run needs a new `GameState`
    Ended,
}

/// Why an entity left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    /// Overlapped a member of this group
    Contact(EntityKind),
    /// Pulled inside the singularity's kill radius
    Consumed,
    /// Projectile lifetime ran out
    Expired,
    /// Drifted too far outside the viewport
    OffScreen,
}

/// Everything the presentation layer needs once a run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub player_name: String,
    pub score: u64,
    pub best_score: u64,
    pub elapsed_secs: u32,
    /// Group the player collided with
    pub cause: EntityKind,
}

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: EntityId, pos: Vec2 },
    Destroyed { id: EntityId, cause: DestroyCause },
    ScoreChanged { score: u64, best_score: u64 },
    GameOver(FinalReport),
}

/// Score, clock and lifecycle of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub player_name: String,
    pub score: u64,
    /// Best score seen so far, including this run
    pub best_score: u64,
    /// Whole seconds survived
    pub elapsed_secs: u32,
    pub phase: GamePhase,
}

impl Session {
    pub fn new(player_name: &str, stored_best: u64) -> Self {
        let trimmed = player_name.trim();
        Self {
            player_name: if trimmed.is_empty() {
                DEFAULT_PLAYER_NAME.to_string()
            } else {
                trimmed.to_string()
            },
            score: 0,
            best_score: stored_best,
            elapsed_secs: 0,
            phase: GamePhase::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Award one point. Ignored once the session has ended.
    pub fn add_point(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.score += 1;
        self.best_score = self.best_score.max(self.score);
        true
    }

    /// One second of the session clock
    pub fn tick_clock(&mut self) {
        if self.is_running() {
            self.elapsed_secs += 1;
        }
    }

    /// Running → Ended. Returns the report only on the first call.
    pub fn end(&mut self, cause: EntityKind) -> Option<FinalReport> {
        if !self.is_running() {
            return None;
        }
        self.phase = GamePhase::Ended;
        Some(FinalReport {
            player_name: self.player_name.clone(),
            score: self.score,
            best_score: self.best_score,
            elapsed_secs: self.elapsed_secs,
            cause,
        })
    }
}

/// Format seconds as `MM:SS`
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// HUD values for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub player_name: String,
    pub score: u64,
    pub best_score: u64,
    pub elapsed_secs: u32,
    pub clock: String,
}

/// Complete state of one run
#[derive(Debug)]
pub struct GameState {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub registry: Registry,
    pub player: Player,
    pub singularity: Singularity,
    pub scheduler: Scheduler,
    pub session: Session,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    report: Option<FinalReport>,
    store: Box<dyn BestScoreStore>,
    /// Best score as last read from or written to the store
    stored_best: u64,
}

impl GameState {
    /// Start a run with an in-memory best score store
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self::with_store(config, seed, "", Box::new(MemoryStore::default()))
    }

    /// Start a run for `player_name`, reading the best score from `store`
    pub fn with_store(
        config: SimConfig,
        seed: u64,
        player_name: &str,
        store: Box<dyn BestScoreStore>,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let viewport = config.viewport;

        let player_pos = Vec2::new(
            viewport.width / 2.0,
            viewport.height - config.player.start_offset,
        );
        let player = Player::new(player_pos, config.player.radius);
        let singularity =
            Singularity::new(viewport.center(), &config.singularity, &viewport, &mut rng);
        let scheduler = Scheduler::from_config(&config.timers);

        let stored_best = persistence::load_or_zero(store.as_ref());
        let session = Session::new(player_name, stored_best);
        log::info!(
            "Session started: player={} seed={} best={}",
            session.player_name,
            seed,
            stored_best
        );

        Self {
            config,
            seed,
            rng,
            registry: Registry::new(),
            player,
            singularity,
            scheduler,
            session,
            time_ticks: 0,
            events: Vec::new(),
            report: None,
            store,
            stored_best,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Final report, once the run has ended
    pub fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    pub fn store(&self) -> &dyn BestScoreStore {
        self.store.as_ref()
    }

    pub fn hud(&self) -> Hud {
        Hud {
            player_name: self.session.player_name.clone(),
            score: self.session.score,
            best_score: self.session.best_score,
            elapsed_secs: self.session.elapsed_secs,
            clock: format_clock(self.session.elapsed_secs),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Award a point for a kill
    pub(crate) fn score_point(&mut self) {
        if self.session.add_point() {
            self.events.push(GameEvent::ScoreChanged {
                score: self.session.score,
                best_score: self.session.best_score,
            });
        }
    }

    /// Running → Ended: persist a new best, stop the timers and queue the report
    pub(crate) fn end_session(&mut self, cause: EntityKind) {
        let Some(report) = self.session.end(cause) else {
            return;
        };
        self.scheduler.stop();

        if report.score > self.stored_best {
            match self.store.save(report.best_score) {
                Ok(()) => self.stored_best = report.best_score,
                Err(e) => log::warn!("Failed to save best score: {}", e),
            }
        }

        log::info!(
            "Game over ({:?}): {} scored {} in {}",
            cause,
            report.player_name,
            report.score,
            format_clock(report.elapsed_secs)
        );
        self.events.push(GameEvent::GameOver(report.clone()));
        self.report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let session = Session::new("   ", 5);
        assert_eq!(session.player_name, DEFAULT_PLAYER_NAME);
        assert_eq!(session.best_score, 5);
        assert!(session.is_running());

        assert_eq!(Session::new(" Ada ", 0).player_name, "Ada");
    }

    #[test]
    fn test_best_score_tracks_max() {
        let mut session = Session::new("Ada", 2);
        session.add_point();
        assert_eq!(session.best_score, 2);
        session.add_point();
        session.add_point();
        assert_eq!(session.score, 3);
        assert_eq!(session.best_score, 3);
    }

    #[test]
    fn test_end_is_terminal() {
        let mut session = Session::new("Ada", 0);
        session.add_point();
        let report = session.end(EntityKind::Hazard).unwrap();
        assert_eq!(report.score, 1);
        assert_eq!(report.cause, EntityKind::Hazard);

        assert!(session.end(EntityKind::Singularity).is_none());
        assert!(!session.add_point());
        session.tick_clock();
        assert_eq!(session.score, 1);
        assert_eq!(session.elapsed_secs, 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3599), "59:59");
    }

    #[test]
    fn test_new_state_layout() {
        let state = GameState::new(SimConfig::with_viewport(800.0, 600.0), 1);
        assert_eq!(state.player.body.pos, Vec2::new(400.0, 500.0));
        assert_eq!(state.singularity.pos(), Vec2::new(400.0, 300.0));
        assert_eq!(state.scheduler.timers().len(), 3);
        assert!(state.is_running());
        assert!(state.report().is_none());
    }

    #[test]
    fn test_end_session_persists_new_best() {
        let mut state = GameState::with_store(
            SimConfig::default(),
            1,
            "Ada",
            Box::new(MemoryStore::new(1)),
        );
        state.score_point();
        state.score_point();
        state.end_session(EntityKind::Hazard);

        assert_eq!(state.store().load().unwrap(), 2);
        assert!(state.scheduler.is_stopped());
        let report = state.report().unwrap();
        assert_eq!(report.best_score, 2);
        assert_eq!(report.player_name, "Ada");

        let events = state.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::GameOver(_))));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_end_session_keeps_higher_stored_best() {
        let mut state = GameState::with_store(
            SimConfig::default(),
            1,
            "Ada",
            Box::new(MemoryStore::new(10)),
        );
        state.score_point();
        state.end_session(EntityKind::Singularity);

        assert_eq!(state.store().load().unwrap(), 10);
        assert_eq!(state.report().unwrap().best_score, 10);
    }
}
