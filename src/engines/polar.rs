//! Polar - polarity-matching variant of the impact-line family
//!
//! Same topology as `phase`: charged obstacles drift toward a fixed line
//! and are compared against the player's polarity on crossing. Polar runs a
//! tighter spawn curve and pays a streak bonus every fifth consecutive
//! match.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

const SPAWN_X: f32 = 840.0;
pub const IMPACT_LINE_X: f32 = 140.0;

const SPAWN_BASE_MS: f64 = 1250.0;
const SPAWN_STEP_MS: f64 = 90.0;
const SPAWN_MIN_MS: f64 = 480.0;
const SPEED_BASE: f32 = 3.0;
const SPEED_STEP: f32 = 0.35;
const LEVEL_INTERVAL_MS: f64 = 8_000.0;

/// Every 5th consecutive match pays a bonus
const STREAK_BONUS_EVERY: u32 = 5;
const STREAK_BONUS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Plus,
    Minus,
}

impl Polarity {
    pub fn flipped(self) -> Self {
        match self {
            Polarity::Plus => Polarity::Minus,
            Polarity::Minus => Polarity::Plus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: u32,
    pub x: f32,
    pub polarity: Polarity,
}

/// Complete Polar snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarState {
    pub phase: Phase,
    pub player_polarity: Polarity,
    pub charges: Vec<Charge>,
    pub score: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub level: u32,
    pub started_at: f64,
    pub last_spawn_at: f64,
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl PolarState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            player_polarity: Polarity::Plus,
            charges: Vec::new(),
            score: 0,
            combo: 0,
            best_combo: 0,
            level: 0,
            started_at: now_ms,
            last_spawn_at: now_ms,
            survived_ms: 0.0,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

fn spawn_interval_ms(level: u32) -> f64 {
    (SPAWN_BASE_MS - SPAWN_STEP_MS * level as f64).max(SPAWN_MIN_MS)
}

fn charge_speed(level: u32) -> f32 {
    SPEED_BASE + SPEED_STEP * level as f32
}

/// Advance charges by one frame, spawning and judging line crossings
pub fn tick(state: &mut PolarState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    if step.now_ms - state.last_spawn_at >= spawn_interval_ms(state.level) {
        let id = state.next_id;
        state.next_id += 1;
        let polarity = if state.rng.random_bool(0.5) {
            Polarity::Plus
        } else {
            Polarity::Minus
        };
        state.charges.push(Charge { id, x: SPAWN_X, polarity });
        state.last_spawn_at = step.now_ms;
    }

    let dx = charge_speed(state.level) * step.frames();
    for charge in &mut state.charges {
        charge.x -= dx;
    }

    let player = state.player_polarity;
    let mut matches = 0u32;
    let mut mismatch = false;
    state.charges.retain(|c| {
        if c.x > IMPACT_LINE_X {
            return true;
        }
        if c.polarity == player {
            matches += 1;
            false
        } else {
            mismatch = true;
            true
        }
    });

    for _ in 0..matches {
        state.score += 1;
        state.combo += 1;
        state.best_combo = state.best_combo.max(state.combo);
        if state.combo.is_multiple_of(STREAK_BONUS_EVERY) {
            state.score += STREAK_BONUS;
        }
    }

    if mismatch {
        state.phase = Phase::GameOver;
        log::debug!("polar: wrong polarity at line, score {}", state.score);
    }
}

/// Flip the player's polarity; instant, no cooldown
pub fn toggle_polarity(state: &mut PolarState) {
    if !state.phase.is_playing() {
        return;
    }
    state.player_polarity = state.player_polarity.flipped();
}

impl Engine for PolarState {
    type Input = ();

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, _input: &(), step: Step) {
        tick(self, step);
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.score as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: self.best_combo,
        }
    }
}
