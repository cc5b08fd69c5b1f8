//! Orbit - running a ring around an erupting core
//!
//! The player circles a fixed ring while projectiles burst outward from
//! the center at random angles. Held left/right input picks the running
//! direction; the only defense is being elsewhere on the ring when a
//! projectile crosses it. Every projectile that escapes past the ring
//! scores.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::engine::{self, Engine, Phase, Step, Summary};
use crate::{normalize_angle, polar_to_cartesian};

/// Radius of the ring the player runs on
pub const RING_RADIUS: f32 = 180.0;
const PLAYER_RADIUS: f32 = 12.0;
/// Angular speed in radians per frame unit
const ANGULAR_SPEED: f32 = 0.055;

const PROJECTILE_RADIUS: f32 = 10.0;
/// Projectiles appear just off the core
const SPAWN_RADIUS: f32 = 20.0;
/// Projectiles are culled (and scored) once safely past the ring
const ESCAPE_RADIUS: f32 = RING_RADIUS + 60.0;

const SPAWN_BASE_MS: f64 = 1100.0;
const SPAWN_STEP_MS: f64 = 70.0;
const SPAWN_MIN_MS: f64 = 420.0;
/// Outward speed in px per frame unit
const SPEED_BASE: f32 = 1.9;
const SPEED_STEP: f32 = 0.2;
const LEVEL_INTERVAL_MS: f64 = 8_000.0;

/// Held direction input
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitInput {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub angle: f32,
    pub radius: f32,
}

/// Complete Orbit snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub phase: Phase,
    /// Player position on the ring
    pub player_angle: f32,
    /// Running direction, +1 (counterclockwise) or -1
    pub direction: f32,
    pub projectiles: Vec<Projectile>,
    pub score: u32,
    pub level: u32,
    pub started_at: f64,
    pub last_spawn_at: f64,
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl OrbitState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            player_angle: 0.0,
            direction: 1.0,
            projectiles: Vec::new(),
            score: 0,
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

fn projectile_speed(level: u32) -> f32 {
    SPEED_BASE + SPEED_STEP * level as f32
}

/// Advance the runner and outbound projectiles by one frame
pub fn tick(state: &mut OrbitState, input: &OrbitInput, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    if input.left && !input.right {
        state.direction = 1.0;
    } else if input.right && !input.left {
        state.direction = -1.0;
    }
    state.player_angle =
        normalize_angle(state.player_angle + state.direction * ANGULAR_SPEED * step.frames());

    if step.now_ms - state.last_spawn_at >= spawn_interval_ms(state.level) {
        let id = state.next_id;
        state.next_id += 1;
        let angle = state.rng.random_range(-TAU / 2.0..TAU / 2.0);
        state.projectiles.push(Projectile { id, angle, radius: SPAWN_RADIUS });
        state.last_spawn_at = step.now_ms;
    }

    let dr = projectile_speed(state.level) * step.frames();
    let player_pos = polar_to_cartesian(RING_RADIUS, state.player_angle);
    let mut hit = false;
    let mut escaped = 0u32;
    state.projectiles.retain_mut(|p| {
        p.radius += dr;
        let pos = polar_to_cartesian(p.radius, p.angle);
        let gap = PROJECTILE_RADIUS + PLAYER_RADIUS;
        if pos.distance_squared(player_pos) < gap * gap {
            hit = true;
            return true;
        }
        if p.radius >= ESCAPE_RADIUS {
            escaped += 1;
            return false;
        }
        true
    });
    state.score += escaped;

    if hit {
        state.phase = Phase::GameOver;
        log::debug!("orbit: clipped after {} escapes", state.score);
    }
}

impl Engine for OrbitState {
    type Input = OrbitInput;

    fn phase(&self) -> Phase {
        self.phase
    }

    fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    fn tick(&mut self, input: &OrbitInput, step: Step) {
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

    const IDLE: OrbitInput = OrbitInput { left: false, right: false };

    fn push_projectile(state: &mut OrbitState, angle: f32, radius: f32) {
        let id = state.next_id;
        state.next_id += 1;
        state.projectiles.push(Projectile { id, angle, radius });
    }

    #[test]
    fn test_projectile_through_player_kills() {
        let mut state = OrbitState::new(14, 0.0);
        state.last_spawn_at = f64::MAX;
        // Freeze the runner on the projectile's path
        state.direction = 0.0;
        state.player_angle = 0.0;
        push_projectile(&mut state, 0.0, RING_RADIUS - 30.0);

        let mut now = 0.0;
        while state.phase == Phase::Playing {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert!(now < 2_000.0, "projectile never reached the ring");
        }
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_dodged_projectile_scores_on_escape() {
        let mut state = OrbitState::new(14, 0.0);
        state.last_spawn_at = f64::MAX;
        state.direction = 0.0;
        state.player_angle = 0.0;
        // Opposite side of the ring
        push_projectile(&mut state, 3.0, RING_RADIUS - 30.0);

        let mut now = 0.0;
        while !state.projectiles.is_empty() {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert_eq!(state.phase, Phase::Playing);
            assert!(now < 3_000.0, "projectile never escaped");
        }
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_near_miss_judged_by_distance_not_angle() {
        let mut state = OrbitState::new(14, 0.0);
        state.last_spawn_at = f64::MAX;
        state.direction = 0.0;
        state.player_angle = 0.0;
        // 0.15 rad off the runner: close by angle, but the closest approach
        // in cartesian space is ~27 px, outside the combined radii (22 px)
        push_projectile(&mut state, 0.15, SPAWN_RADIUS);

        let mut now = 0.0;
        while !state.projectiles.is_empty() {
            now += 16.0;
            tick(&mut state, &IDLE, Step::new(16.0, now, 1.0));
            assert_eq!(state.phase, Phase::Playing);
            assert!(now < 5_000.0, "projectile never escaped");
        }
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_direction_follows_input() {
        let mut state = OrbitState::new(14, 0.0);
        state.last_spawn_at = f64::MAX;

        let left = OrbitInput { left: true, right: false };
        tick(&mut state, &left, Step::new(16.0, 16.0, 1.0));
        assert!(state.player_angle > 0.0);

        let right = OrbitInput { left: false, right: true };
        tick(&mut state, &right, Step::new(16.0, 32.0, 1.0));
        tick(&mut state, &right, Step::new(16.0, 48.0, 1.0));
        assert!(state.player_angle < 0.055 + 1e-6);
        assert_eq!(state.direction, -1.0);
    }

    #[test]
    fn test_angle_kinematics_frame_rate_independent() {
        let mut fine = OrbitState::new(14, 0.0);
        let mut coarse = OrbitState::new(14, 0.0);
        fine.last_spawn_at = f64::MAX;
        coarse.last_spawn_at = f64::MAX;
        for i in 1..=40 {
            tick(&mut fine, &IDLE, Step::new(16.0, i as f64 * 16.0, 1.0));
        }
        for i in 1..=20 {
            tick(&mut coarse, &IDLE, Step::new(32.0, i as f64 * 32.0, 1.0));
        }
        assert!((fine.player_angle - coarse.player_angle).abs() < 1e-4);
    }

    #[test]
    fn test_pause_is_noop() {
        let mut state = OrbitState::new(14, 0.0);
        tick(&mut state, &IDLE, Step::new(16.0, 16.0, 1.0));
        state.toggle_pause();
        let before = state.clone();
        tick(&mut state, &IDLE, Step::new(16.0, 7_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = OrbitState::new(14, 0.0);
        tick(&mut state, &IDLE, Step::new(16.0, 16.0, 1.0));
        state.phase = Phase::GameOver;
        let before = state.clone();
        let held = OrbitInput { left: true, right: false };
        tick(&mut state, &held, Step::new(16.0, 10_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_determinism_same_seed() {
        let mut a = OrbitState::new(29, 0.0);
        let mut b = OrbitState::new(29, 0.0);
        for i in 1..=600 {
            let s = Step::new(16.0, i as f64 * 16.0, 1.0);
            tick(&mut a, &IDLE, s);
            tick(&mut b, &IDLE, s);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_curve_shrinks() {
        assert!(spawn_interval_ms(3) < spawn_interval_ms(0));
        assert_eq!(spawn_interval_ms(40), SPAWN_MIN_MS);
        assert!(projectile_speed(5) > projectile_speed(0));
    }
}
