//! PulseDash - lane runner with alternating safe/danger windows
//!
//! Time is split into alternating windows. During a danger window exactly
//! one of the three lanes is safe, rotating deterministically; standing in
//! any other lane during a danger window ends the run instantly. The dash
//! control cycles lanes on a short cooldown. Score is distance traveled.

use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

pub const LANES: u8 = 3;

const SAFE_BASE_MS: f64 = 1800.0;
const SAFE_STEP_MS: f64 = 100.0;
const SAFE_MIN_MS: f64 = 800.0;
const DANGER_MS: f64 = 700.0;

pub const DASH_COOLDOWN_MS: f64 = 250.0;

/// Base run speed in distance units per frame unit
const RUN_SPEED: f32 = 4.2;
const RUN_SPEED_PER_LEVEL: f32 = 0.1;
const LEVEL_INTERVAL_MS: f64 = 12_000.0;

/// Complete PulseDash snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseDashState {
    pub phase: Phase,
    /// Current lane, 0..LANES
    pub lane: u8,
    pub dash_ready_at: f64,
    /// Whether the current window is a danger window
    pub in_danger: bool,
    /// Safe lane for the current danger window
    pub safe_lane: u8,
    /// Number of danger windows entered so far
    pub danger_count: u32,
    /// Current window expires at this wall-clock time
    pub window_ends_at: f64,
    pub distance: f64,
    pub level: u32,
    pub started_at: f64,
    pub survived_ms: f64,
}

impl PulseDashState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            lane: 0,
            dash_ready_at: now_ms,
            in_danger: false,
            safe_lane: 0,
            danger_count: 0,
            window_ends_at: now_ms + safe_duration_ms(0),
            distance: 0.0,
            level: 0,
            started_at: now_ms,
            survived_ms: 0.0,
        }
    }
}

fn safe_duration_ms(level: u32) -> f64 {
    (SAFE_BASE_MS - SAFE_STEP_MS * level as f64).max(SAFE_MIN_MS)
}

/// Advance the runner by one frame
pub fn tick(state: &mut PulseDashState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.level = engine::difficulty_from_elapsed(elapsed, LEVEL_INTERVAL_MS);

    // Roll over expired windows; a large dt may cross more than one, so
    // each danger window judges the lane on entry rather than after the loop
    while step.now_ms >= state.window_ends_at {
        if state.in_danger {
            state.in_danger = false;
            state.window_ends_at += safe_duration_ms(state.level);
        } else {
            state.in_danger = true;
            state.danger_count += 1;
            state.safe_lane = (state.danger_count % LANES as u32) as u8;
            state.window_ends_at += DANGER_MS;
            if state.lane != state.safe_lane {
                state.phase = Phase::GameOver;
                log::debug!(
                    "pulse_dash: caught in lane {} at {:.0}m",
                    state.lane,
                    state.distance
                );
                return;
            }
        }
    }

    if state.in_danger && state.lane != state.safe_lane {
        state.phase = Phase::GameOver;
        log::debug!("pulse_dash: caught in lane {} at {:.0}m", state.lane, state.distance);
        return;
    }

    let speed = RUN_SPEED * (1.0 + RUN_SPEED_PER_LEVEL * state.level as f32);
    state.distance += (speed * step.frames()) as f64;
}

/// Cycle to the next lane, gated by a cooldown
pub fn dash(state: &mut PulseDashState, now_ms: f64) {
    if !state.phase.is_playing() || now_ms < state.dash_ready_at {
        return;
    }
    state.lane = (state.lane + 1) % LANES;
    state.dash_ready_at = now_ms + DASH_COOLDOWN_MS;
}

impl Engine for PulseDashState {
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
            score: self.distance as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: 0,
        }
    }
}
