//! Tank Siege headless runner
//!
//! Loads a level set, autoplays the session for a number of ticks and logs
//! what happened. Drawing and input devices live outside the simulation.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec2;
    use tank_siege::Tuning;
    use tank_siege::sim::{GamePhase, GameSession, ProjectileKind, TickInput, parse_levels, tick};

    const BUNDLED_LEVELS: &str = include_str!("../demos/levels.json");

    /// Ticks without progress before the autopilot turns away
    const STUCK_TICKS: u32 = 2;
    /// How long the autopilot turns once stuck
    const TURN_TICKS: u32 = 30;

    #[derive(Debug, Parser)]
    #[command(name = "tank-siege", version, about = "Autoplay a Tank Siege level set headlessly")]
    pub struct Args {
        /// Level set JSON (defaults to the bundled demo levels)
        pub levels: Option<PathBuf>,
        /// Ticks to simulate (60 per second)
        #[arg(long, default_value_t = 3600)]
        pub ticks: u64,
        /// RNG seed
        #[arg(long, default_value_t = 12345)]
        pub seed: u64,
        /// Partial tuning override (JSON)
        #[arg(long)]
        pub tuning: Option<PathBuf>,
        /// Fire every N ticks while a target is alive
        #[arg(long, default_value_t = 30)]
        pub fire_every: u64,
    }

    pub fn run(args: Args) -> Result<()> {
        let levels_json = match &args.levels {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read level set {}", path.display()))?,
            None => BUNDLED_LEVELS.to_owned(),
        };
        let levels = parse_levels(&levels_json).context("failed to parse level set")?;
        let tuning = load_tuning(args.tuning.as_deref());
        let mut session = GameSession::new(levels, tuning, args.seed).context("invalid level set")?;

        let mut pilot = Autopilot::default();
        for _ in 0..args.ticks {
            let input = pilot.next_input(&session, args.fire_every.max(1));
            tick(&mut session, &input);
            for event in &session.events {
                log::debug!("[{}] {:?}", session.time_ticks, event);
            }
            pilot.observe(&session);
            if session.phase == GamePhase::GameOver {
                break;
            }
        }

        println!("{}", serde_json::to_string(&session.hud())?);
        Ok(())
    }

    /// Tuning override, falling back to defaults when it cannot be read
    fn load_tuning(path: Option<&Path>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match read_tuning(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning file {}: {:#}", path.display(), err);
                Tuning::default()
            }
        }
    }

    fn read_tuning(path: &Path) -> Result<Tuning> {
        let json = std::fs::read_to_string(path)?;
        Ok(Tuning::from_json(&json)?)
    }

    /// Drives forward, turns away when stuck, shoots at the nearest enemy
    #[derive(Debug, Default)]
    struct Autopilot {
        last_pos: Option<Vec2>,
        stuck_ticks: u32,
        turn_ticks: u32,
    }

    impl Autopilot {
        fn next_input(&mut self, session: &GameSession, fire_every: u64) -> TickInput {
            // Keys up between levels so the next one accepts input
            if session.phase != GamePhase::Playing {
                return TickInput::default();
            }

            let player = &session.player;
            let target = session
                .level
                .enemies
                .iter()
                .filter(|e| !e.destroyed)
                .min_by(|a, b| {
                    a.pos
                        .distance_squared(player.pos)
                        .total_cmp(&b.pos.distance_squared(player.pos))
                })
                .map(|e| e.pos);

            let select_kind = player.arsenal().and_then(|a| {
                (a.standard_ammo == 0 && a.rocket_ammo > 0 && a.selected != ProjectileKind::Rocket)
                    .then_some(ProjectileKind::Rocket)
            });

            let turning = self.turn_ticks > 0;
            if turning {
                self.turn_ticks -= 1;
            }

            TickInput {
                forward: !turning,
                rotate_right: turning,
                aim_at: target,
                fire: target.is_some() && session.time_ticks % fire_every == 0,
                select_kind,
                ..Default::default()
            }
        }

        fn observe(&mut self, session: &GameSession) {
            let pos = session.player.pos;
            if self.turn_ticks == 0 && self.last_pos == Some(pos) {
                self.stuck_ticks += 1;
            } else {
                self.stuck_ticks = 0;
            }
            if self.stuck_ticks >= STUCK_TICKS {
                self.turn_ticks = TURN_TICKS;
                self.stuck_ticks = 0;
            }
            self.last_pos = Some(pos);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tank Siege (headless) starting...");

    if let Err(err) = runner::run(runner::Args::parse()) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on this target; there is no runner
}
