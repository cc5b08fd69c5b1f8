//! Pong - paddle-vs-AI reflection physics
//!
//! Left paddle is the player, right paddle is a tracking AI. The ball
//! reflects off the top and bottom walls (reverse, then clamp) and leaves
//! paddles at an angle proportional to the hit offset, gaining speed each
//! rally up to a cap. Classic mode plays first-to-seven; survival mode
//! counts returns and ends on the first ball past the player.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

pub const COURT_W: f32 = 800.0;
pub const COURT_H: f32 = 500.0;
const PADDLE_HALF: f32 = 45.0;
/// Inner faces of the two paddles
const PLAYER_FACE_X: f32 = 34.0;
const AI_FACE_X: f32 = COURT_W - 34.0;
pub const BALL_RADIUS: f32 = 8.0;

/// Speeds in px per frame unit
const BALL_START_SPEED: f32 = 5.0;
const BALL_MAX_SPEED: f32 = 11.0;
/// Speed gain per paddle hit
const RALLY_ACCEL: f32 = 1.03;
const PADDLE_SPEED: f32 = 5.2;
const AI_BASE_SPEED: f32 = 4.4;
const AI_SPEED_PER_LEVEL: f32 = 0.3;
/// Reflection angle at the paddle tip: ±60°
const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
/// Serve direction jitter: ±30°
const SERVE_JITTER: f32 = std::f32::consts::FRAC_PI_6;

pub const WIN_SCORE: u32 = 7;
const LEVEL_INTERVAL_MS: f64 = 15_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongMode {
    /// First to WIN_SCORE points
    Classic,
    /// Score per return; first ball past the player ends the run
    Survival,
}

/// Held paddle input
#[derive(Debug, Clone, Copy, Default)]
pub struct PongInput {
    pub up: bool,
    pub down: bool,
}

/// Complete Pong snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongState {
    pub phase: Phase,
    pub mode: PongMode,
    /// Paddle centers
    pub player_y: f32,
    pub ai_y: f32,
    pub ball_pos: Vec2,
    /// Ball velocity in px per frame unit
    pub ball_vel: Vec2,
    pub player_score: u32,
    pub ai_score: u32,
    /// Paddle returns in the current rally
    pub rally: u32,
    pub best_rally: u32,
    pub level: u32,
    pub started_at: f64,
    pub survived_ms: f64,
    rng: Pcg32,
}

impl PongState {
    pub fn new(seed: u64, now_ms: f64, mode: PongMode) -> Self {
        let mut state = Self {
            phase: Phase::Playing,
            mode,
            player_y: COURT_H / 2.0,
            ai_y: COURT_H / 2.0,
            ball_pos: Vec2::new(COURT_W / 2.0, COURT_H / 2.0),
            ball_vel: Vec2::ZERO,
            player_score: 0,
            ai_score: 0,
            rally: 0,
            best_rally: 0,
            level: 0,
            started_at: now_ms,
            survived_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        };
        serve(&mut state, true);
        state
    }
}

/// Reset the ball to center, heading toward one side with a jittered angle
fn serve(state: &mut PongState, toward_player: bool) {
    state.ball_pos = Vec2::new(COURT_W / 2.0, COURT_H / 2.0);
    let angle = state.rng.random_range(-SERVE_JITTER..SERVE_JITTER);
    let dir_x = if toward_player { -1.0 } else { 1.0 };
    state.ball_vel =
        Vec2::new(dir_x * angle.cos(), angle.sin()) * BALL_START_SPEED;
    state.rally = 0;
}

/// Reflection off a paddle: hit offset maps to ±MAX_BOUNCE_ANGLE and the
/// ball speeds up toward the cap
fn paddle_deflect(ball_y: f32, paddle_y: f32, speed: f32, to_right: bool) -> Vec2 {
    let offset = ((ball_y - paddle_y) / PADDLE_HALF).clamp(-1.0, 1.0);
    let angle = offset * MAX_BOUNCE_ANGLE;
    let new_speed = (speed * RALLY_ACCEL).min(BALL_MAX_SPEED);
    let dir_x = if to_right { 1.0 } else { -1.0 };
    Vec2::new(dir_x * angle.cos(), angle.sin()) * new_speed
}

/// Advance paddles and ball by one frame
pub fn tick(state: &mut PongState, input: &PongInput, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    // Player paddle
    let mut dy = 0.0;
    if input.up {
        dy -= 1.0;
    }
    if input.down {
        dy += 1.0;
    }
    state.player_y = (state.player_y + dy * PADDLE_SPEED * step.frames())
        .clamp(PADDLE_HALF, COURT_H - PADDLE_HALF);

    // AI paddle tracks the ball with a capped speed
    let ai_speed = (AI_BASE_SPEED + AI_SPEED_PER_LEVEL * state.level as f32) * step.frames();
    let gap = state.ball_pos.y - state.ai_y;
    state.ai_y = (state.ai_y + gap.clamp(-ai_speed, ai_speed))
        .clamp(PADDLE_HALF, COURT_H - PADDLE_HALF);

    // Ball integration
    state.ball_pos += state.ball_vel * step.frames();

    // Walls: reflect the y component, then clamp into bounds
    if state.ball_pos.y <= BALL_RADIUS {
        state.ball_vel.y = state.ball_vel.y.abs();
        state.ball_pos.y = BALL_RADIUS;
    } else if state.ball_pos.y >= COURT_H - BALL_RADIUS {
        state.ball_vel.y = -state.ball_vel.y.abs();
        state.ball_pos.y = COURT_H - BALL_RADIUS;
    }

    // Player paddle face
    if state.ball_vel.x < 0.0
        && state.ball_pos.x - BALL_RADIUS <= PLAYER_FACE_X
        && state.ball_pos.x > PLAYER_FACE_X - BALL_RADIUS * 2.0
        && (state.ball_pos.y - state.player_y).abs() <= PADDLE_HALF + BALL_RADIUS
    {
        let speed = state.ball_vel.length();
        state.ball_vel = paddle_deflect(state.ball_pos.y, state.player_y, speed, true);
        state.ball_pos.x = PLAYER_FACE_X + BALL_RADIUS;
        state.rally += 1;
        state.best_rally = state.best_rally.max(state.rally);
        if state.mode == PongMode::Survival {
            state.player_score += 1;
        }
    }

    // AI paddle face
    if state.ball_vel.x > 0.0
        && state.ball_pos.x + BALL_RADIUS >= AI_FACE_X
        && state.ball_pos.x < AI_FACE_X + BALL_RADIUS * 2.0
        && (state.ball_pos.y - state.ai_y).abs() <= PADDLE_HALF + BALL_RADIUS
    {
        let speed = state.ball_vel.length();
        state.ball_vel = paddle_deflect(state.ball_pos.y, state.ai_y, speed, false);
        state.ball_pos.x = AI_FACE_X - BALL_RADIUS;
    }

    // Ball fully past a baseline
    if state.ball_pos.x + BALL_RADIUS < 0.0 {
        match state.mode {
            PongMode::Classic => {
                state.ai_score += 1;
                if state.ai_score >= WIN_SCORE {
                    state.phase = Phase::GameOver;
                    log::debug!("pong: lost {}-{}", state.player_score, state.ai_score);
                } else {
                    serve(state, false);
                }
            }
            PongMode::Survival => {
                state.phase = Phase::GameOver;
                log::debug!("pong: survival over after {} returns", state.player_score);
            }
        }
    } else if state.ball_pos.x - BALL_RADIUS > COURT_W {
        state.player_score += 1;
        if state.mode == PongMode::Classic && state.player_score >= WIN_SCORE {
            state.phase = Phase::LevelComplete;
            log::debug!("pong: won {}-{}", state.player_score, state.ai_score);
        } else {
            serve(state, true);
        }
    }
}

impl Engine for PongState {
    type Input = PongInput;

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, input: &PongInput, step: Step) {
        tick(self, input, step);
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.player_score as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: self.best_rally,
        }
    }
}
