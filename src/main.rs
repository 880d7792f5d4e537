//! Star Fighter headless runner
//!
//! Plays one session with the autopilot at the fixed timestep, persists the
//! best score and prints a summary. Rendering lives elsewhere.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use star_fighter::consts::{MAX_SUBSTEPS, SIM_DT};
    use star_fighter::persistence::JsonFileStore;
    use star_fighter::sim::{
        DestroyCause, EntityKind, GameEvent, GameState, TickInput, format_clock, tick,
    };
    use star_fighter::SimConfig;

    #[derive(Parser, Debug)]
    #[command(name = "star-fighter", about = "Run a headless Star Fighter session")]
    struct Args {
        /// JSON tuning file (missing fields keep their defaults)
        config: Option<PathBuf>,

        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Player name reported at game over
        #[arg(long, default_value = "Autopilot")]
        name: String,

        /// Stop after this many simulated seconds
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,

        /// Simulated frame length in seconds (fed through the fixed-step accumulator)
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame: f32,

        /// Where the best score is kept
        #[arg(long, default_value = "best_score.json")]
        best_score_file: PathBuf,
    }

    pub fn run() {
        env_logger::init();
        let args = Args::parse();
        log::info!("Star Fighter (headless) starting...");

        let config = args
            .config
            .as_deref()
            .map(SimConfig::load)
            .unwrap_or_default();
        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let store = Box::new(JsonFileStore::new(&args.best_score_file));
        let mut state = GameState::with_store(config, seed, &args.name, store);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let frame = frame_length(args.frame);
        let mut accumulator = 0.0;
        let mut simulated = 0.0;
        let mut kills = 0u32;
        let mut swallowed = 0u32;

        while state.is_running() && simulated < args.seconds {
            accumulator += frame;
            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut state, &input, SIM_DT);
                accumulator -= SIM_DT;
                simulated += SIM_DT;
                substeps += 1;
            }

            for event in state.drain_events() {
                match event {
                    GameEvent::ScoreChanged { .. } => kills += 1,
                    GameEvent::Destroyed {
                        cause:
                            DestroyCause::Consumed | DestroyCause::Contact(EntityKind::Singularity),
                        ..
                    } => swallowed += 1,
                    GameEvent::GameOver(report) => {
                        log::info!("Game over: {:?}", report.cause);
                    }
                    GameEvent::Destroyed { .. } | GameEvent::Spawned { .. } => {}
                }
            }
        }

        let hud = state.hud();
        println!("Player:     {}", hud.player_name);
        println!("Seed:       {}", seed);
        println!("Score:      {}", hud.score);
        println!("Best:       {}", hud.best_score);
        println!("Time:       {}", hud.clock);
        println!("Kills:      {}", kills);
        println!("Swallowed:  {}", swallowed);
        match state.report() {
            Some(report) => {
                println!("Ended by:   {:?}", report.cause);
                submit(report.clone());
            }
            None => println!(
                "Survived the {} limit",
                format_clock(args.seconds.max(0.0) as u32)
            ),
        }
    }

    /// Usable frame length: clamped to 1 ms..100 ms, or `SIM_DT` if not a number
    pub(crate) fn frame_length(frame: f32) -> f32 {
        if frame.is_finite() {
            frame.clamp(0.001, 0.1)
        } else {
            log::warn!("Frame length {} is not finite, using {}", frame, SIM_DT);
            SIM_DT
        }
    }

    #[cfg(feature = "http")]
    fn submit(report: star_fighter::sim::FinalReport) {
        use star_fighter::leaderboard::{HttpLeaderboard, submit_and_wait};

        let Ok(url) = std::env::var("STAR_FIGHTER_LEADERBOARD") else {
            return;
        };
        match HttpLeaderboard::new(&url) {
            Ok(service) => {
                // Waiting only keeps the process alive for the request
                submit_and_wait(service, report);
            }
            Err(e) => log::warn!("Leaderboard client unavailable: {}", e),
        }
    }

    #[cfg(not(feature = "http"))]
    fn submit(_report: star_fighter::sim::FinalReport) {}
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives the simulation through the library
}
