//! Headless driver: runs any engine at a fixed 16 ms timestep with idle
//! input and reports the terminal summary. Useful for soak runs and for
//! eyeballing difficulty curves without a front end.

use std::env;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use arcade_engines::engine::{Engine, Step, Summary, FRAME_MS};
use arcade_engines::engines::*;
use arcade_engines::engines::pong::PongMode;
use arcade_engines::settings::Settings;

const SETTINGS_PATH: &str = "arcade-settings.json";
const DEFAULT_TICKS: u64 = 3_600; // about one minute of simulated play

/// Tick an engine with idle input until it ends or the budget runs out
fn run<E: Engine>(mut state: E, max_ticks: u64, speed: f32) -> Summary
where
    E::Input: Default,
{
    let input = E::Input::default();
    let mut now_ms = 0.0f64;
    for _ in 0..max_ticks {
        now_ms += FRAME_MS as f64;
        state.tick(&input, Step::new(FRAME_MS, now_ms, speed));
        if state.phase().is_terminal() {
            break;
        }
    }
    info!("run ended in phase {:?} after {:.1}s", state.phase(), now_ms / 1000.0);
    state.summary()
}

fn dispatch(game: &str, seed: u64, max_ticks: u64, speed: f32) -> Option<Summary> {
    let summary = match game {
        "snake" => run(SnakeState::new(seed, 0.0), max_ticks, speed),
        "pong" => run(PongState::new(seed, 0.0, PongMode::Classic), max_ticks, speed),
        "pong-survival" => run(PongState::new(seed, 0.0, PongMode::Survival), max_ticks, speed),
        "breakout" => run(BreakoutState::new(seed, 0.0), max_ticks, speed),
        "dodge" => run(DodgeState::new(seed, 0.0), max_ticks, speed),
        "reactor" => run(ReactorState::new(seed, 0.0), max_ticks, speed),
        "orbit" => run(OrbitState::new(seed, 0.0), max_ticks, speed),
        "pulse-dash" => run(PulseDashState::new(0.0), max_ticks, speed),
        "memory-glitch" => run(MemoryGlitchState::new(seed, 0.0), max_ticks, speed),
        "core-defense" => run(CoreDefenseState::new(seed, 0.0), max_ticks, speed),
        "shift" => run(ShiftState::new(seed, 0.0), max_ticks, speed),
        "overload" => run(OverloadState::new(seed, 0.0), max_ticks, speed),
        "phase" => run(PhaseState::new(seed, 0.0), max_ticks, speed),
        "polar" => run(PolarState::new(seed, 0.0), max_ticks, speed),
        "void" => run(VoidState::new(0.0), max_ticks, speed),
        _ => return None,
    };
    Some(summary)
}

fn main() -> io::Result<()> {
    simple_logging::log_to_file("arcade-headless.log", log::LevelFilter::Debug)?;
    info!("starting headless arcade run");

    let args: Vec<String> = env::args().collect();
    let game = args.get(1).map(String::as_str).unwrap_or("snake");
    let max_ticks = args
        .get(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    let settings = Settings::load(Path::new(SETTINGS_PATH));
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let speed = settings.effective_speed();

    match dispatch(game, seed, max_ticks, speed) {
        Some(summary) => {
            if settings.log_summaries {
                info!("{game}: {summary:?}");
            }
            println!(
                "{game}: score {} / survived {:.1}s / best combo {}",
                summary.score,
                summary.survival_ms as f64 / 1000.0,
                summary.best_combo
            );
            Ok(())
        }
        None => {
            eprintln!("unknown game '{game}'");
            eprintln!(
                "games: snake pong pong-survival breakout dodge reactor orbit \
                 pulse-dash memory-glitch core-defense shift overload phase polar void"
            );
            Err(io::Error::new(io::ErrorKind::InvalidInput, "unknown game"))
        }
    }
}
