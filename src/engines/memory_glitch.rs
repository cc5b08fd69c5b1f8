//! MemoryGlitch - sequence memory under shrinking timers
//!
//! Each round flashes a random button sequence, then demands it back under
//! a time limit. Both the show time and the input window shrink as rounds
//! pass, and the sequence grows every other round. One wrong press or a
//! blown deadline ends the run; a completed sequence pauses briefly on a
//! "correct" beat before the next round.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Phase, Step, Summary};

/// Number of input buttons
pub const BUTTONS: u8 = 4;

const SHOW_BASE_MS: f64 = 2200.0;
const SHOW_STEP_MS: f64 = 120.0;
const SHOW_MIN_MS: f64 = 900.0;
const INPUT_BASE_MS: f64 = 4000.0;
const INPUT_STEP_MS: f64 = 150.0;
const INPUT_MIN_MS: f64 = 1800.0;
const CORRECT_PAUSE_MS: f64 = 600.0;

/// Where the current round sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Pattern is on display, input ignored
    Show,
    /// Player reproduces the pattern against the deadline
    Input,
    /// Short confirmation beat before the next round
    Correct,
}

/// Complete MemoryGlitch snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryGlitchState {
    pub phase: Phase,
    pub round_phase: RoundPhase,
    /// Current round phase expires at this wall-clock time
    pub phase_end_at: f64,
    pub pattern: Vec<u8>,
    /// How much of the pattern has been reproduced this round
    pub progress: usize,
    pub round: u32,
    /// Completed rounds
    pub score: u32,
    /// Correct presses across the whole run
    pub total_matched: u32,
    pub started_at: f64,
    pub survived_ms: f64,
    rng: Pcg32,
}

impl MemoryGlitchState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pattern = generate_pattern(&mut rng, 0);
        Self {
            phase: Phase::Playing,
            round_phase: RoundPhase::Show,
            phase_end_at: now_ms + show_ms(0, 1.0),
            pattern,
            progress: 0,
            round: 0,
            score: 0,
            total_matched: 0,
            started_at: now_ms,
            survived_ms: 0.0,
            rng,
        }
    }
}

/// Pattern length grows every other round
pub fn pattern_len(round: u32) -> usize {
    3 + (round / 2) as usize
}

fn generate_pattern(rng: &mut Pcg32, round: u32) -> Vec<u8> {
    (0..pattern_len(round)).map(|_| rng.random_range(0..BUTTONS)).collect()
}

fn show_ms(round: u32, speed: f32) -> f64 {
    (SHOW_BASE_MS - SHOW_STEP_MS * round as f64).max(SHOW_MIN_MS) / speed as f64
}

fn input_ms(round: u32, speed: f32) -> f64 {
    (INPUT_BASE_MS - INPUT_STEP_MS * round as f64).max(INPUT_MIN_MS) / speed as f64
}

/// Advance the round timers by one frame
pub fn tick(state: &mut MemoryGlitchState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    state.survived_ms = step.now_ms - state.started_at;

    if step.now_ms < state.phase_end_at {
        return;
    }

    match state.round_phase {
        RoundPhase::Show => {
            state.round_phase = RoundPhase::Input;
            state.phase_end_at += input_ms(state.round, step.speed);
        }
        RoundPhase::Input => {
            // Deadline blown
            state.phase = Phase::GameOver;
            log::debug!("memory_glitch: timed out in round {}", state.round);
        }
        RoundPhase::Correct => {
            state.round += 1;
            state.pattern = generate_pattern(&mut state.rng, state.round);
            state.progress = 0;
            state.round_phase = RoundPhase::Show;
            state.phase_end_at += show_ms(state.round, step.speed);
        }
    }
}

/// Press button `index`; only meaningful during the input window
pub fn input_key(state: &mut MemoryGlitchState, index: u8, now_ms: f64) {
    if !state.phase.is_playing()
        || state.round_phase != RoundPhase::Input
        || now_ms >= state.phase_end_at
    {
        return;
    }

    if state.pattern.get(state.progress) == Some(&index) {
        state.progress += 1;
        state.total_matched += 1;
        if state.progress == state.pattern.len() {
            state.score += 1;
            state.round_phase = RoundPhase::Correct;
            state.phase_end_at = now_ms + CORRECT_PAUSE_MS;
        }
    } else {
        state.phase = Phase::GameOver;
        log::debug!("memory_glitch: wrong button in round {}", state.round);
    }
}

impl Engine for MemoryGlitchState {
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
            best_combo: self.total_matched,
        }
    }
}
