//! Overload - timed-release energy management
//!
//! Energy climbs continuously toward 100%. A discrete `release` pays off
//! only while the bar sits inside the current safe zone; the zone shrinks
//! and the charge rate climbs as the streak grows, and every miss leaves a
//! permanent charge-rate debuff. Letting the bar hit 100% ends the run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Phase, Step, Summary};

/// Base charge rate in energy %/second
const CHARGE_RATE_BASE: f32 = 18.0;
/// Energy drained by a successful release (full bar, clamped at 0)
const SUCCESS_DRAIN: f32 = 100.0;
/// Energy drained by a failed release
const FAIL_DRAIN: f32 = 30.0;
/// Permanent charge-rate debuff per failed release
const FAIL_SPEEDUP: f32 = 1.06;
/// Every N successes the zone shrinks and the charge rate ramps
const RAMP_EVERY: u32 = 5;
const RAMP_SPEEDUP: f32 = 1.08;

const ZONE_WIDTH_BASE: f32 = 18.0;
const ZONE_WIDTH_SHRINK: f32 = 0.88;
const ZONE_WIDTH_MIN: f32 = 6.0;
/// Zone never spawns below this energy level
const ZONE_START_MIN: f32 = 35.0;
/// Gap kept between the zone end and the 100% kill line
const ZONE_TOP_MARGIN: f32 = 5.0;

/// Complete Overload snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverloadState {
    pub phase: Phase,
    /// Current energy, 0..=100
    pub energy: f32,
    /// Current charge rate in %/s (ramps up, debuffs accumulate)
    pub charge_rate: f32,
    /// Inclusive lower edge of the safe zone
    pub safe_zone_start: f32,
    pub safe_zone_width: f32,
    pub score: u32,
    /// Current streak of successful releases
    pub perfect_combo: u32,
    pub best_combo: u32,
    pub started_at: f64,
    /// Wall-clock time survived so far
    pub survived_ms: f64,
    rng: Pcg32,
}

impl OverloadState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let safe_zone_start = roll_zone_start(&mut rng, ZONE_WIDTH_BASE);
        Self {
            phase: Phase::Playing,
            energy: 0.0,
            charge_rate: CHARGE_RATE_BASE,
            safe_zone_start,
            safe_zone_width: ZONE_WIDTH_BASE,
            score: 0,
            perfect_combo: 0,
            best_combo: 0,
            started_at: now_ms,
            survived_ms: 0.0,
            rng,
        }
    }

    /// Inclusive upper edge of the safe zone
    pub fn safe_zone_end(&self) -> f32 {
        self.safe_zone_start + self.safe_zone_width
    }
}

fn roll_zone_start(rng: &mut Pcg32, width: f32) -> f32 {
    rng.random_range(ZONE_START_MIN..(100.0 - width - ZONE_TOP_MARGIN))
}

/// Advance the energy bar by one frame
pub fn tick(state: &mut OverloadState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    state.energy += state.charge_rate * step.seconds();
    state.survived_ms = step.now_ms - state.started_at;

    if state.energy >= 100.0 {
        state.energy = 100.0;
        state.phase = Phase::GameOver;
        log::debug!("overload: bar hit 100% at score {}", state.score);
    }
}

/// Discrete release action: rewarded inside the safe zone, punished outside
pub fn release(state: &mut OverloadState) {
    if !state.phase.is_playing() {
        return;
    }

    if state.energy >= state.safe_zone_start && state.energy <= state.safe_zone_end() {
        state.energy = (state.energy - SUCCESS_DRAIN).max(0.0);
        state.score += 1;
        state.perfect_combo += 1;
        state.best_combo = state.best_combo.max(state.perfect_combo);

        if state.score.is_multiple_of(RAMP_EVERY) {
            state.safe_zone_width = (state.safe_zone_width * ZONE_WIDTH_SHRINK).max(ZONE_WIDTH_MIN);
            state.charge_rate *= RAMP_SPEEDUP;
        }
        state.safe_zone_start = roll_zone_start(&mut state.rng, state.safe_zone_width);
    } else {
        state.energy = (state.energy - FAIL_DRAIN).max(0.0);
        state.perfect_combo = 0;
        state.charge_rate *= FAIL_SPEEDUP;
    }
}

impl Engine for OverloadState {
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
