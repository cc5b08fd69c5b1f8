//! CoreDefense - a rotating angular shield guarding the core
//!
//! Projectiles fall inward from random angles; a single shield arc rotates
//! under left/right input and must cover each projectile's angle when it
//! reaches the check radius. One leak ends the run. Blocked projectiles
//! leave short-lived impact markers for the renderer.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::angular_distance;
use crate::engine::{self, Engine, Phase, Step, Summary};

/// Angular width of the shield arc, radians
pub const SHIELD_ARC: f32 = 1.1;
/// Shield rotation speed in radians per frame unit
const TURN_SPEED: f32 = 0.07;
/// Projectiles spawn at this radius and are judged at the check radius
const SPAWN_RADIUS: f32 = 260.0;
pub const CHECK_RADIUS: f32 = 70.0;

const SPAWN_BASE_MS: f64 = 1300.0;
const SPAWN_STEP_MS: f64 = 80.0;
const SPAWN_MIN_MS: f64 = 450.0;
/// Inward speed in px per frame unit
const PROJ_SPEED_BASE: f32 = 2.0;
const PROJ_SPEED_STEP: f32 = 0.25;
const TIER_INTERVAL_MS: f64 = 10_000.0;
/// Impact markers linger this long
const IMPACT_FLASH_MS: f64 = 400.0;

/// Held rotation input
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreInput {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub angle: f32,
    pub radius: f32,
}

/// Blocked-hit marker, purely visual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub angle: f32,
    pub until: f64,
}

/// Complete CoreDefense snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreDefenseState {
    pub phase: Phase,
    /// Center angle of the shield arc
    pub shield_angle: f32,
    pub projectiles: Vec<Projectile>,
    pub impacts: Vec<Impact>,
    pub score: u32,
    pub streak: u32,
    pub tier: u32,
    pub started_at: f64,
    pub last_spawn_at: f64,
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl CoreDefenseState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            shield_angle: 0.0,
            projectiles: Vec::new(),
            impacts: Vec::new(),
            score: 0,
            streak: 0,
            tier: 0,
            started_at: now_ms,
            last_spawn_at: now_ms,
            survived_ms: 0.0,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

fn spawn_interval_ms(tier: u32) -> f64 {
    (SPAWN_BASE_MS - SPAWN_STEP_MS * tier as f64).max(SPAWN_MIN_MS)
}

fn projectile_speed(tier: u32) -> f32 {
    PROJ_SPEED_BASE + PROJ_SPEED_STEP * tier as f32
}

/// Advance the shield and inbound projectiles by one frame
pub fn tick(state: &mut CoreDefenseState, input: &CoreInput, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.tier = engine::difficulty_from_elapsed(elapsed, TIER_INTERVAL_MS);

    // Held rotation; opposite flags cancel out
    let turn = TURN_SPEED * step.frames();
    if input.left && !input.right {
        state.shield_angle = crate::normalize_angle(state.shield_angle + turn);
    } else if input.right && !input.left {
        state.shield_angle = crate::normalize_angle(state.shield_angle - turn);
    }

    if step.now_ms - state.last_spawn_at >= spawn_interval_ms(state.tier) {
        let id = state.next_id;
        state.next_id += 1;
        let angle = state.rng.random_range(-TAU / 2.0..TAU / 2.0);
        state.projectiles.push(Projectile { id, angle, radius: SPAWN_RADIUS });
        state.last_spawn_at = step.now_ms;
    }

    let dr = projectile_speed(state.tier) * step.frames();
    let shield_angle = state.shield_angle;
    let mut blocked: Vec<Impact> = Vec::new();
    let mut leaked = false;
    state.projectiles.retain_mut(|p| {
        p.radius -= dr;
        if p.radius > CHECK_RADIUS {
            return true;
        }
        if angular_distance(p.angle, shield_angle) <= SHIELD_ARC / 2.0 {
            blocked.push(Impact { angle: p.angle, until: step.now_ms + IMPACT_FLASH_MS });
            false
        } else {
            leaked = true;
            true
        }
    });

    for impact in blocked {
        state.streak += 1;
        state.score += 1;
        state.impacts.push(impact);
    }
    state.impacts.retain(|i| i.until > step.now_ms);

    if leaked {
        state.phase = Phase::GameOver;
        log::debug!("core_defense: core breached after {} blocks", state.score);
    }
}

impl Engine for CoreDefenseState {
    type Input = CoreInput;

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, input: &CoreInput, step: Step) {
        tick(self, input, step);
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.score as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: self.streak,
        }
    }
}
