//! Dodge - evading edge-spawned obstacles
//!
//! Obstacles spawn on random edges of a square field, aimed through the
//! center with a little angular jitter, and get faster and more frequent
//! over time. The player steers a circle with four held direction flags;
//! any overlap ends the run. Score is survival time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

pub const FIELD: f32 = 600.0;
const PLAYER_RADIUS: f32 = 12.0;
/// Player speed in px per frame unit
const PLAYER_SPEED: f32 = 3.4;
const OBSTACLE_RADIUS: f32 = 14.0;
/// Obstacles are culled this far past the field edge
const CULL_MARGIN: f32 = 40.0;

const SPAWN_BASE_MS: f64 = 900.0;
const SPAWN_STEP_MS: f64 = 60.0;
const SPAWN_MIN_MS: f64 = 300.0;
/// Obstacle speed in px per frame unit
const SPEED_BASE: f32 = 2.4;
const SPEED_STEP: f32 = 0.25;
/// Aim jitter around the center line, radians
const AIM_JITTER: f32 = 0.35;
const LEVEL_INTERVAL_MS: f64 = 10_000.0;

/// Held movement input
#[derive(Debug, Clone, Copy, Default)]
pub struct DodgeInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    /// Unit direction; scaled by the level speed each frame
    pub dir: Vec2,
    pub radius: f32,
}

/// Complete Dodge snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DodgeState {
    pub phase: Phase,
    pub player: Vec2,
    pub player_radius: f32,
    pub obstacles: Vec<Obstacle>,
    pub level: u32,
    pub started_at: f64,
    pub last_spawn_at: f64,
    /// Survival time doubles as the score
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl DodgeState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            player: Vec2::splat(FIELD / 2.0),
            player_radius: PLAYER_RADIUS,
            obstacles: Vec::new(),
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

fn obstacle_speed(level: u32) -> f32 {
    SPEED_BASE + SPEED_STEP * level as f32
}

/// Spawn one obstacle on a random edge, aimed through the center
fn spawn_obstacle(state: &mut DodgeState) {
    let along = state.rng.random_range(0.0..FIELD);
    let pos = match state.rng.random_range(0..4u8) {
        0 => Vec2::new(along, -OBSTACLE_RADIUS),
        1 => Vec2::new(along, FIELD + OBSTACLE_RADIUS),
        2 => Vec2::new(-OBSTACLE_RADIUS, along),
        _ => Vec2::new(FIELD + OBSTACLE_RADIUS, along),
    };
    let center = Vec2::splat(FIELD / 2.0);
    let aim = (center - pos).to_angle() + state.rng.random_range(-AIM_JITTER..AIM_JITTER);
    let id = state.next_id;
    state.next_id += 1;
    state.obstacles.push(Obstacle {
        id,
        pos,
        dir: Vec2::from_angle(aim),
        radius: OBSTACLE_RADIUS,
    });
}

/// Advance the player and obstacle field by one frame
pub fn tick(state: &mut DodgeState, input: &DodgeInput, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    let mut dir = Vec2::ZERO;
    if input.up {
        dir.y -= 1.0;
    }
    if input.down {
        dir.y += 1.0;
    }
    if input.left {
        dir.x -= 1.0;
    }
    if input.right {
        dir.x += 1.0;
    }
    if dir != Vec2::ZERO {
        state.player += dir.normalize() * PLAYER_SPEED * step.frames();
        let r = state.player_radius;
        state.player = state.player.clamp(Vec2::splat(r), Vec2::splat(FIELD - r));
    }

    if step.now_ms - state.last_spawn_at >= spawn_interval_ms(state.level) {
        spawn_obstacle(state);
        state.last_spawn_at = step.now_ms;
    }

    let ds = obstacle_speed(state.level) * step.frames();
    let mut hit = false;
    for obstacle in &mut state.obstacles {
        obstacle.pos += obstacle.dir * ds;
        let gap = obstacle.radius + state.player_radius;
        if obstacle.pos.distance_squared(state.player) < gap * gap {
            hit = true;
        }
    }
    state.obstacles.retain(|o| {
        o.pos.x > -CULL_MARGIN
            && o.pos.x < FIELD + CULL_MARGIN
            && o.pos.y > -CULL_MARGIN
            && o.pos.y < FIELD + CULL_MARGIN
    });

    if hit {
        state.phase = Phase::GameOver;
        log::debug!("dodge: hit after {:.0}ms", state.survived_ms);
    }
}

impl Engine for DodgeState {
    type Input = DodgeInput;

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, input: &DodgeInput, step: Step) {
        tick(self, input, step);
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.survived_ms as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: 0,
        }
    }
}
