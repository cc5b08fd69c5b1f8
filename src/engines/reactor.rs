//! Reactor - shield timing against a periodic pulse cycle
//!
//! The reactor pulses on a fixed cycle (`Idle → Warning → Active → Passed`).
//! The shield must be up while a real pulse is active; a missed real pulse
//! ends the run. A fraction of pulses are fakes rolled at cycle start:
//! pure distractors that neither kill on a miss nor count when shielded.
//! The cycle shortens every few real pulses survived.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Phase, Step, Summary};

/// Base full-cycle length and per-tier shrink
const CYCLE_BASE_MS: f64 = 2600.0;
const CYCLE_STEP_MS: f64 = 150.0;
const CYCLE_MIN_MS: f64 = 1400.0;
/// Sub-phase shares of the full cycle
const IDLE_FRAC: f64 = 0.45;
const WARNING_FRAC: f64 = 0.25;
const ACTIVE_FRAC: f64 = 0.15;
const PASSED_FRAC: f64 = 0.15;
/// Real pulses survived per difficulty tier
const PULSES_PER_TIER: u32 = 4;
/// Fraction of pulses that are fake
const FAKE_CHANCE: f64 = 0.25;

/// Where the reactor currently sits in its pulse cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulsePhase {
    Idle,
    Warning,
    Active,
    Passed,
}

/// Complete Reactor snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorState {
    pub phase: Phase,
    pub pulse_phase: PulsePhase,
    /// Current sub-phase expires at this wall-clock time
    pub pulse_ends_at: f64,
    /// Rolled at cycle start; fake pulses neither kill nor count
    pub is_fake: bool,
    pub shield_on: bool,
    /// Real pulses survived; drives the difficulty tier
    pub pulses_survived: u32,
    pub tier: u32,
    pub score: u32,
    pub started_at: f64,
    pub survived_ms: f64,
    rng: Pcg32,
}

impl ReactorState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let is_fake = rng.random_bool(FAKE_CHANCE);
        Self {
            phase: Phase::Playing,
            pulse_phase: PulsePhase::Idle,
            pulse_ends_at: now_ms + CYCLE_BASE_MS * IDLE_FRAC,
            is_fake,
            shield_on: false,
            pulses_survived: 0,
            tier: 0,
            score: 0,
            started_at: now_ms,
            survived_ms: 0.0,
            rng,
        }
    }
}

fn cycle_ms(tier: u32, speed: f32) -> f64 {
    (CYCLE_BASE_MS - CYCLE_STEP_MS * tier as f64).max(CYCLE_MIN_MS) / speed as f64
}

/// Advance the pulse cycle by one frame
pub fn tick(state: &mut ReactorState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    state.survived_ms = step.now_ms - state.started_at;

    // Roll over expired sub-phases; a large dt may cross several
    while step.now_ms >= state.pulse_ends_at {
        let cycle = cycle_ms(state.tier, step.speed);
        match state.pulse_phase {
            PulsePhase::Idle => {
                state.pulse_phase = PulsePhase::Warning;
                state.pulse_ends_at += cycle * WARNING_FRAC;
            }
            PulsePhase::Warning => {
                state.pulse_phase = PulsePhase::Active;
                state.pulse_ends_at += cycle * ACTIVE_FRAC;
            }
            PulsePhase::Active => {
                // The pulse resolves here
                if !state.is_fake {
                    if state.shield_on {
                        state.pulses_survived += 1;
                        state.score += 1;
                        state.tier = state.pulses_survived / PULSES_PER_TIER;
                    } else {
                        state.phase = Phase::GameOver;
                        log::debug!("reactor: meltdown after {} pulses", state.pulses_survived);
                        return;
                    }
                }
                state.pulse_phase = PulsePhase::Passed;
                state.pulse_ends_at += cycle * PASSED_FRAC;
            }
            PulsePhase::Passed => {
                state.pulse_phase = PulsePhase::Idle;
                state.is_fake = state.rng.random_bool(FAKE_CHANCE);
                state.pulse_ends_at += cycle * IDLE_FRAC;
            }
        }
    }
}

/// Flip the shield; instant, no cooldown
pub fn toggle_shield(state: &mut ReactorState) {
    if !state.phase.is_playing() {
        return;
    }
    state.shield_on = !state.shield_on;
}

impl Engine for ReactorState {
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
            best_combo: 0,
        }
    }
}
