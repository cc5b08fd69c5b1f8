//! Breakout - blocks, multi-ball, power-ups, and chain explosions
//!
//! The dense one: AABB block collisions resolved on the minimal
//! penetration axis, explosive blocks that chain within a radius in the
//! same tick, falling power-ups with absolute-deadline effects, multiple
//! simultaneous balls, and a lives pool. Clearing every destructible
//! block completes the level.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Phase, Step, Summary};

pub const FIELD_W: f32 = 800.0;
pub const FIELD_H: f32 = 600.0;
pub const BALL_RADIUS: f32 = 8.0;

/// Paddle geometry; the top face is what the ball bounces off
const PADDLE_Y: f32 = 560.0;
const PADDLE_THICKNESS: f32 = 14.0;
const PADDLE_HALF: f32 = 55.0;
const PADDLE_HALF_WIDE: f32 = 80.0;
const PADDLE_SPEED: f32 = 7.0;

/// Speeds in px per frame unit
const BALL_START_SPEED: f32 = 5.0;
const BALL_MAX_SPEED: f32 = 10.0;
const PADDLE_ACCEL: f32 = 1.02;
/// Reflection angle at the paddle tip, from vertical: ±60°
const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

/// Block grid
const BLOCK_COLS: usize = 10;
const BLOCK_ROWS: usize = 5;
pub const BLOCK_W: f32 = 70.0;
pub const BLOCK_H: f32 = 24.0;
const BLOCK_GAP: f32 = 4.0;
const GRID_TOP: f32 = 60.0;

/// Explosions destroy all destructible blocks within this radius
pub const EXPLOSION_RADIUS: f32 = 90.0;

/// Power-ups
const POWERUP_CHANCE: f64 = 0.12;
const POWERUP_FALL_SPEED: f32 = 2.2;
const POWERUP_RADIUS: f32 = 10.0;
const WIDE_DURATION_MS: f64 = 8_000.0;
const SLOW_DURATION_MS: f64 = 6_000.0;
/// Ball speed factor while the slow effect is live
const SLOW_FACTOR: f32 = 0.6;
const START_LIVES: u8 = 3;
const MAX_LIVES: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Normal,
    /// Takes three hits
    Tough,
    /// Destroys everything destructible within EXPLOSION_RADIUS
    Explosive,
    /// Reflects forever; doesn't count for level clear
    Indestructible,
}

impl BlockKind {
    pub fn is_destructible(self) -> bool {
        self != BlockKind::Indestructible
    }

    fn points(self) -> u32 {
        match self {
            BlockKind::Normal => 10,
            BlockKind::Tough => 30,
            BlockKind::Explosive => 20,
            BlockKind::Indestructible => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub kind: BlockKind,
    pub hp: u8,
    /// Top-left corner; all blocks share BLOCK_W x BLOCK_H
    pub pos: Vec2,
}

impl Block {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(BLOCK_W / 2.0, BLOCK_H / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in px per frame unit
    pub vel: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    WidePaddle,
    SlowBall,
    ExtraBall,
    ExtraLife,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

/// Held paddle input
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutInput {
    pub left: bool,
    pub right: bool,
}

/// Complete Breakout snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutState {
    pub phase: Phase,
    /// Paddle center x
    pub paddle_x: f32,
    pub balls: Vec<Ball>,
    pub blocks: Vec<Block>,
    pub powerups: Vec<PowerUp>,
    pub lives: u8,
    pub score: u32,
    /// Wide-paddle effect live while `now < wide_until`
    pub wide_until: f64,
    /// Slow-ball effect live while `now < slow_until`
    pub slow_until: f64,
    pub started_at: f64,
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl BreakoutState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        let mut state = Self {
            phase: Phase::Playing,
            paddle_x: FIELD_W / 2.0,
            balls: Vec::new(),
            blocks: Vec::new(),
            powerups: Vec::new(),
            lives: START_LIVES,
            score: 0,
            wide_until: 0.0,
            slow_until: 0.0,
            started_at: now_ms,
            survived_ms: 0.0,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        };
        generate_blocks(&mut state);
        spawn_ball(&mut state);
        state
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current paddle half-width, honoring the wide effect
    pub fn paddle_half(&self, now_ms: f64) -> f32 {
        if now_ms < self.wide_until { PADDLE_HALF_WIDE } else { PADDLE_HALF }
    }
}

/// Fill the grid, sprinkling special kinds by seeded rolls
fn generate_blocks(state: &mut BreakoutState) {
    let grid_w = BLOCK_COLS as f32 * (BLOCK_W + BLOCK_GAP) - BLOCK_GAP;
    let left = (FIELD_W - grid_w) / 2.0;
    for row in 0..BLOCK_ROWS {
        for col in 0..BLOCK_COLS {
            let roll: f64 = state.rng.random();
            let kind = if roll < 0.05 {
                BlockKind::Indestructible
            } else if roll < 0.13 {
                BlockKind::Explosive
            } else if roll < 0.25 {
                BlockKind::Tough
            } else {
                BlockKind::Normal
            };
            let hp = if kind == BlockKind::Tough { 3 } else { 1 };
            let id = state.next_entity_id();
            state.blocks.push(Block {
                id,
                kind,
                hp,
                pos: Vec2::new(
                    left + col as f32 * (BLOCK_W + BLOCK_GAP),
                    GRID_TOP + row as f32 * (BLOCK_H + BLOCK_GAP),
                ),
            });
        }
    }
}

/// Spawn a ball just above the paddle with a jittered upward velocity
fn spawn_ball(state: &mut BreakoutState) {
    let id = state.next_entity_id();
    let angle = state.rng.random_range(-0.4..0.4f32);
    state.balls.push(Ball {
        id,
        pos: Vec2::new(state.paddle_x, PADDLE_Y - BALL_RADIUS - 2.0),
        vel: Vec2::new(angle.sin(), -angle.cos()) * BALL_START_SPEED,
    });
}

/// Circle-vs-AABB test returning the closest point when overlapping
fn circle_block_overlap(pos: Vec2, block: &Block) -> Option<Vec2> {
    let min = block.pos;
    let max = block.pos + Vec2::new(BLOCK_W, BLOCK_H);
    let closest = pos.clamp(min, max);
    if pos.distance_squared(closest) < BALL_RADIUS * BALL_RADIUS {
        Some(closest)
    } else {
        None
    }
}

/// Reflect the velocity component with minimal penetration and push the
/// ball out of the block
fn reflect_off_block(ball: &mut Ball, closest: Vec2) {
    let delta = ball.pos - closest;
    if delta == Vec2::ZERO {
        // Center inside the block; fall back to reversing the faster axis
        if ball.vel.x.abs() > ball.vel.y.abs() {
            ball.vel.x = -ball.vel.x;
        } else {
            ball.vel.y = -ball.vel.y;
        }
        return;
    }
    if delta.x.abs() > delta.y.abs() {
        // Side hit
        ball.vel.x = delta.x.signum() * ball.vel.x.abs();
    } else {
        // Top/bottom hit
        ball.vel.y = delta.y.signum() * ball.vel.y.abs();
    }
    ball.pos = closest + delta.normalize() * BALL_RADIUS;
}

/// Destroy a block and chain explosions; returns destroyed block indices.
///
/// Scoring is summed once, here, from the final destroyed set.
fn destroy_with_chains(blocks: &[Block], first: usize) -> Vec<usize> {
    let mut destroyed = vec![first];
    let mut queue = if blocks[first].kind == BlockKind::Explosive { vec![first] } else { Vec::new() };

    while let Some(origin_idx) = queue.pop() {
        let origin = blocks[origin_idx].center();
        for (idx, block) in blocks.iter().enumerate() {
            if destroyed.contains(&idx) || !block.kind.is_destructible() {
                continue;
            }
            if block.center().distance(origin) <= EXPLOSION_RADIUS {
                destroyed.push(idx);
                if block.kind == BlockKind::Explosive {
                    queue.push(idx);
                }
            }
        }
    }
    destroyed
}

/// Advance paddle, balls, blocks, and power-ups by one frame
pub fn tick(state: &mut BreakoutState, input: &BreakoutInput, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    state.survived_ms = step.now_ms - state.started_at;
    let half = state.paddle_half(step.now_ms);

    // Paddle
    let mut dx = 0.0;
    if input.left {
        dx -= 1.0;
    }
    if input.right {
        dx += 1.0;
    }
    state.paddle_x =
        (state.paddle_x + dx * PADDLE_SPEED * step.frames()).clamp(half, FIELD_W - half);

    let slow = if step.now_ms < state.slow_until { SLOW_FACTOR } else { 1.0 };
    let mut destroyed_blocks: Vec<u32> = Vec::new();
    let mut powerup_sites: Vec<Vec2> = Vec::new();

    for ball in &mut state.balls {
        ball.pos += ball.vel * step.frames() * slow;

        // Side and top walls: reflect, then clamp
        if ball.pos.x <= BALL_RADIUS {
            ball.vel.x = ball.vel.x.abs();
            ball.pos.x = BALL_RADIUS;
        } else if ball.pos.x >= FIELD_W - BALL_RADIUS {
            ball.vel.x = -ball.vel.x.abs();
            ball.pos.x = FIELD_W - BALL_RADIUS;
        }
        if ball.pos.y <= BALL_RADIUS {
            ball.vel.y = ball.vel.y.abs();
            ball.pos.y = BALL_RADIUS;
        }

        // Paddle: offset from center maps to a reflection angle off vertical
        if ball.vel.y > 0.0
            && ball.pos.y + BALL_RADIUS >= PADDLE_Y
            && ball.pos.y < PADDLE_Y + PADDLE_THICKNESS
            && (ball.pos.x - state.paddle_x).abs() <= half + BALL_RADIUS
        {
            let offset = ((ball.pos.x - state.paddle_x) / half).clamp(-1.0, 1.0);
            let angle = offset * MAX_BOUNCE_ANGLE;
            let speed = (ball.vel.length() * PADDLE_ACCEL).min(BALL_MAX_SPEED);
            ball.vel = Vec2::new(angle.sin(), -angle.cos()) * speed;
            ball.pos.y = PADDLE_Y - BALL_RADIUS;
        }

        // Blocks: at most one collision per ball per tick
        let mut hit: Option<(usize, Vec2)> = None;
        for (idx, block) in state.blocks.iter().enumerate() {
            // A later ball can reach a block destroyed earlier this tick;
            // it is already gone, only removed after the loop
            if destroyed_blocks.contains(&block.id) {
                continue;
            }
            if let Some(closest) = circle_block_overlap(ball.pos, block) {
                hit = Some((idx, closest));
                break;
            }
        }
        if let Some((idx, closest)) = hit {
            reflect_off_block(ball, closest);
            let block = &mut state.blocks[idx];
            if block.kind.is_destructible() {
                block.hp = block.hp.saturating_sub(1);
                if block.hp == 0 {
                    for dead_idx in destroy_with_chains(&state.blocks, idx) {
                        let dead = &state.blocks[dead_idx];
                        if destroyed_blocks.contains(&dead.id) {
                            continue;
                        }
                        destroyed_blocks.push(dead.id);
                        state.score += dead.kind.points();
                        powerup_sites.push(dead.center());
                    }
                }
            }
        }
    }

    // Remove destroyed blocks and roll power-up drops at their sites
    if !destroyed_blocks.is_empty() {
        state.blocks.retain(|b| !destroyed_blocks.contains(&b.id));
        for site in powerup_sites {
            if state.rng.random_bool(POWERUP_CHANCE) {
                let kind = match state.rng.random_range(0..4u8) {
                    0 => PowerUpKind::WidePaddle,
                    1 => PowerUpKind::SlowBall,
                    2 => PowerUpKind::ExtraBall,
                    _ => PowerUpKind::ExtraLife,
                };
                let id = state.next_entity_id();
                state.powerups.push(PowerUp { id, kind, pos: site });
            }
        }
    }

    // Power-ups fall and are caught on paddle overlap
    let paddle_x = state.paddle_x;
    let mut caught: Vec<PowerUpKind> = Vec::new();
    state.powerups.retain_mut(|p| {
        p.pos.y += POWERUP_FALL_SPEED * step.frames();
        let on_paddle = p.pos.y + POWERUP_RADIUS >= PADDLE_Y
            && p.pos.y < PADDLE_Y + PADDLE_THICKNESS
            && (p.pos.x - paddle_x).abs() <= half + POWERUP_RADIUS;
        if on_paddle {
            caught.push(p.kind);
            return false;
        }
        p.pos.y < FIELD_H + POWERUP_RADIUS
    });
    for kind in caught {
        match kind {
            PowerUpKind::WidePaddle => state.wide_until = step.now_ms + WIDE_DURATION_MS,
            PowerUpKind::SlowBall => state.slow_until = step.now_ms + SLOW_DURATION_MS,
            PowerUpKind::ExtraBall => spawn_ball(state),
            PowerUpKind::ExtraLife => state.lives = (state.lives + 1).min(MAX_LIVES),
        }
    }

    // Lost balls; last one costs a life
    state.balls.retain(|b| b.pos.y - BALL_RADIUS <= FIELD_H);
    if state.balls.is_empty() {
        state.lives = state.lives.saturating_sub(1);
        if state.lives == 0 {
            state.phase = Phase::GameOver;
            log::debug!("breakout: out of lives at {}", state.score);
            return;
        }
        spawn_ball(state);
    }

    // Level clear: no destructible blocks left
    if !state.blocks.iter().any(|b| b.kind.is_destructible()) {
        state.phase = Phase::LevelComplete;
        log::debug!("breakout: cleared with score {}", state.score);
    }
}

impl Engine for BreakoutState {
    type Input = BreakoutInput;

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, input: &BreakoutInput, step: Step) {
        tick(self, input, step);
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.score as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: BreakoutInput = BreakoutInput { left: false, right: false };

    /// A state with no generated blocks and a single parked ball
    fn bare_state() -> BreakoutState {
        let mut state = BreakoutState::new(17, 0.0);
        state.blocks.clear();
        state.balls.clear();
        state.balls.push(Ball { id: 500, pos: Vec2::new(400.0, 300.0), vel: Vec2::ZERO });
        state
    }

    fn push_block(state: &mut BreakoutState, kind: BlockKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let hp = if kind == BlockKind::Tough { 3 } else { 1 };
        state.blocks.push(Block { id, kind, hp, pos });
        id
    }

    #[test]
    fn test_indestructible_reflects_one_component() {
        let mut state = bare_state();
        push_block(&mut state, BlockKind::Indestructible, Vec2::new(365.0, 200.0));
        // Ball rising straight into the block's bottom face
        state.balls[0].pos = Vec2::new(400.0, 236.0);
        state.balls[0].vel = Vec2::new(0.5, -5.0);

        let mut now = 0.0;
        while state.balls[0].vel.y < 0.0 {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert!(now < 500.0, "never hit the block");
        }
        // Exactly the y component reversed; block untouched
        assert!((state.balls[0].vel.x - 0.5).abs() < 1e-4);
        assert_eq!(state.balls[0].vel.y, 5.0);
        assert_eq!(state.blocks.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_normal_block_destroyed_and_scored_once() {
        let mut state = bare_state();
        push_block(&mut state, BlockKind::Normal, Vec2::new(365.0, 200.0));
        state.balls[0].pos = Vec2::new(400.0, 236.0);
        state.balls[0].vel = Vec2::new(0.0, -5.0);

        let mut now = 0.0;
        while !state.blocks.is_empty() {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert!(now < 500.0);
        }
        assert_eq!(state.score, 10);
        // Clearing the last destructible block completes the level
        assert_eq!(state.phase, Phase::LevelComplete);
    }

    #[test]
    fn test_tough_block_takes_three_hits() {
        let mut state = bare_state();
        let id = push_block(&mut state, BlockKind::Tough, Vec2::new(365.0, 200.0));
        for _ in 0..2 {
            state.balls[0].pos = Vec2::new(400.0, 236.0);
            state.balls[0].vel = Vec2::new(0.0, -5.0);
            let mut now = 0.0;
            let start_vel_y = state.balls[0].vel.y;
            while state.balls[0].vel.y == start_vel_y {
                now += 16.0;
                tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            }
        }
        let block = state.blocks.iter().find(|b| b.id == id).expect("gone early");
        assert_eq!(block.hp, 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_explosive_chain_reaction() {
        let mut state = bare_state();
        // Two explosives within radius of each other, plus a normal block
        // only in range of the second one
        push_block(&mut state, BlockKind::Explosive, Vec2::new(365.0, 200.0));
        push_block(&mut state, BlockKind::Explosive, Vec2::new(365.0, 260.0));
        push_block(&mut state, BlockKind::Normal, Vec2::new(365.0, 320.0));
        // Indestructible neighbor survives the blast
        let keep = push_block(&mut state, BlockKind::Indestructible, Vec2::new(290.0, 200.0));

        state.balls[0].pos = Vec2::new(400.0, 236.0);
        state.balls[0].vel = Vec2::new(0.0, -5.0);
        let mut now = 0.0;
        while state.blocks.len() > 1 {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert!(now < 500.0);
        }
        assert_eq!(state.blocks[0].id, keep);
        // 20 + 20 + 10, summed in a single pass
        assert_eq!(state.score, 50);
    }

    #[test]
    fn test_lost_ball_costs_life_then_game_over() {
        let mut state = bare_state();
        push_block(&mut state, BlockKind::Normal, Vec2::new(10.0, 60.0));
        state.balls[0].pos = Vec2::new(400.0, FIELD_H - 2.0);
        state.balls[0].vel = Vec2::new(0.0, 12.0);
        state.paddle_x = 100.0; // Out of the ball's path

        tick(&mut state, &IDLE, Step::new(16.0, 16.0, 1.0));
        assert_eq!(state.lives, START_LIVES - 1);
        assert_eq!(state.balls.len(), 1, "ball respawned");

        state.lives = 1;
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(400.0, FIELD_H - 2.0);
        ball.vel = Vec2::new(0.0, 12.0);
        tick(&mut state, &IDLE, Step::new(16.0, 32.0, 1.0));
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_powerup_caught_sets_deadline() {
        let mut state = bare_state();
        push_block(&mut state, BlockKind::Normal, Vec2::new(10.0, 60.0));
        state.powerups.push(PowerUp {
            id: 900,
            kind: PowerUpKind::WidePaddle,
            pos: Vec2::new(state.paddle_x, PADDLE_Y - 12.0),
        });

        tick(&mut state, &IDLE, Step::new(16.0, 1_000.0, 1.0));
        assert!(state.powerups.is_empty());
        assert_eq!(state.wide_until, 1_000.0 + WIDE_DURATION_MS);
        assert_eq!(state.paddle_half(2_000.0), PADDLE_HALF_WIDE);
        // Effect expires by deadline, not by countdown
        assert_eq!(state.paddle_half(1_000.0 + WIDE_DURATION_MS), PADDLE_HALF);
    }

    #[test]
    fn test_walls_never_tunnel() {
        let mut state = bare_state();
        push_block(&mut state, BlockKind::Normal, Vec2::new(10.0, 60.0));
        state.balls[0].vel = Vec2::new(9.5, -9.0);
        for i in 1..=400 {
            tick(&mut state, &IDLE, Step::new(16.0, i as f64 * 16.0, 1.0));
            let ball = &state.balls[0];
            assert!(ball.pos.x >= BALL_RADIUS - 1e-3);
            assert!(ball.pos.x <= FIELD_W - BALL_RADIUS + 1e-3);
            assert!(ball.pos.y >= BALL_RADIUS - 1e-3);
            if state.phase != Phase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_pause_is_noop() {
        let mut state = BreakoutState::new(17, 0.0);
        tick(&mut state, &IDLE, Step::new(16.0, 16.0, 1.0));
        state.toggle_pause();
        let before = state.clone();
        let held = BreakoutInput { left: true, right: false };
        tick(&mut state, &held, Step::new(16.0, 5_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = BreakoutState::new(17, 0.0);
        tick(&mut state, &IDLE, Step::new(16.0, 16.0, 1.0));
        state.phase = Phase::GameOver;
        let before = state.clone();
        let held = BreakoutInput { left: false, right: true };
        tick(&mut state, &held, Step::new(16.0, 10_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_determinism_same_seed() {
        let mut a = BreakoutState::new(41, 0.0);
        let mut b = BreakoutState::new(41, 0.0);
        assert_eq!(a.blocks, b.blocks);
        for i in 1..=600 {
            let s = Step::new(16.0, i as f64 * 16.0, 1.0);
            tick(&mut a, &IDLE, s);
            tick(&mut b, &IDLE, s);
        }
        assert_eq!(a, b);
    }
}
