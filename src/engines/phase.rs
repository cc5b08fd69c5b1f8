//! Phase - binary-kind obstacles against an instant phase toggle
//!
//! Obstacles drift left toward a fixed impact line, each carrying one of
//! two kinds. When an obstacle's center crosses the line its kind is
//! compared against the player's current phase: a match scores, a mismatch
//! ends the run. The toggle is instant and has no cooldown.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

/// Obstacles enter just past the right edge of the 800px field
const SPAWN_X: f32 = 840.0;
/// Fixed x-coordinate where obstacle kind is checked against the player
pub const IMPACT_LINE_X: f32 = 120.0;

const SPAWN_BASE_MS: f64 = 1400.0;
const SPAWN_STEP_MS: f64 = 100.0;
const SPAWN_MIN_MS: f64 = 500.0;
/// Horizontal speed in px per frame unit
const SPEED_BASE: f32 = 3.2;
const SPEED_STEP: f32 = 0.4;
/// Difficulty rises every 10 seconds
const LEVEL_INTERVAL_MS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    /// Binary kind, 0 or 1
    pub kind: u8,
}

/// Complete Phase snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseState {
    pub phase: Phase,
    /// The player's current binary phase, 0 or 1
    pub player_phase: u8,
    pub obstacles: Vec<Obstacle>,
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

impl PhaseState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            player_phase: 0,
            obstacles: Vec::new(),
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

fn obstacle_speed(level: u32) -> f32 {
    SPEED_BASE + SPEED_STEP * level as f32
}

/// Advance obstacles by one frame, spawning and judging line crossings
pub fn tick(state: &mut PhaseState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    if step.now_ms - state.last_spawn_at >= spawn_interval_ms(state.level) {
        let id = state.next_id;
        state.next_id += 1;
        let kind = state.rng.random_range(0..2u8);
        state.obstacles.push(Obstacle { id, x: SPAWN_X, kind });
        state.last_spawn_at = step.now_ms;
    }

    let dx = obstacle_speed(state.level) * step.frames();
    for obstacle in &mut state.obstacles {
        obstacle.x -= dx;
    }

    // Judge every obstacle that crossed the line this frame
    let player_phase = state.player_phase;
    let mut scored = 0u32;
    let mut mismatch = false;
    state.obstacles.retain(|o| {
        if o.x > IMPACT_LINE_X {
            return true;
        }
        if o.kind == player_phase {
            scored += 1;
            false
        } else {
            mismatch = true;
            true
        }
    });

    state.score += scored;
    state.combo += scored;
    state.best_combo = state.best_combo.max(state.combo);

    if mismatch {
        state.phase = Phase::GameOver;
        log::debug!("phase: mismatch at line, score {}", state.score);
    }
}

/// Flip the player's binary phase; instant, no cooldown
pub fn toggle_phase(state: &mut PhaseState) {
    if !state.phase.is_playing() {
        return;
    }
    state.player_phase ^= 1;
}

impl Engine for PhaseState {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_line(state: &mut PhaseState) {
        let mut now = 0.0;
        while state.phase == Phase::Playing && state.score == 0 {
            now += 16.0;
            tick(state, Step::new(16.0, now, 1.0));
            assert!(now < 30_000.0, "obstacle never reached the line");
            if state.phase == Phase::GameOver {
                return;
            }
        }
    }

    #[test]
    fn test_mismatch_at_line_is_game_over() {
        let mut state = PhaseState::new(1, 0.0);
        state.obstacles.push(Obstacle { id: 99, x: 300.0, kind: 0 });
        state.player_phase = 1;
        // Stop the spawner from injecting extra obstacles mid-test
        state.last_spawn_at = f64::MAX;

        run_until_line(&mut state);
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.score, 0);
        // The offending obstacle is kept for the result screen
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_match_at_line_scores() {
        let mut state = PhaseState::new(1, 0.0);
        state.obstacles.push(Obstacle { id: 99, x: 300.0, kind: 1 });
        state.player_phase = 0;
        state.last_spawn_at = f64::MAX;

        toggle_phase(&mut state);
        assert_eq!(state.player_phase, 1);

        run_until_line(&mut state);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.score, 1);
        assert_eq!(state.combo, 1);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_toggle_noop_when_not_playing() {
        let mut state = PhaseState::new(1, 0.0);
        state.phase = Phase::GameOver;
        let before = state.clone();
        toggle_phase(&mut state);
        tick(&mut state, Step::new(16.0, 1_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_pause_is_noop() {
        let mut state = PhaseState::new(1, 0.0);
        tick(&mut state, Step::new(16.0, 16.0, 1.0));
        state.toggle_pause();
        let before = state.clone();
        tick(&mut state, Step::new(16.0, 10_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_difficulty_monotone_and_interval_shrinks() {
        let mut state = PhaseState::new(5, 0.0);
        state.player_phase = 0;
        let mut now = 0.0;
        let mut last_level = 0;
        for _ in 0..2_000 {
            now += 16.0;
            tick(&mut state, Step::new(16.0, now, 1.0));
            assert!(state.level >= last_level);
            last_level = state.level;
            if state.phase == Phase::GameOver {
                break;
            }
        }
        assert!(spawn_interval_ms(3) < spawn_interval_ms(0));
        assert_eq!(spawn_interval_ms(20), SPAWN_MIN_MS);
    }
}
