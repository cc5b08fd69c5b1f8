//! Shift - phased bands falling onto a fixed player slot
//!
//! Horizontal bands fall down a narrow column, each carrying a binary
//! phase. The player sits in a fixed vertical slot with a phase of their
//! own, toggled on a cooldown rather than instantly. A band overlapping
//! the slot while the phases *match* is solid and ends the run; opposite
//! phase bands pass through and score.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

pub const FIELD_H: f32 = 600.0;
/// The player's fixed vertical slot
pub const PLAYER_TOP: f32 = 500.0;
pub const PLAYER_BOTTOM: f32 = 540.0;
const BAND_HEIGHT: f32 = 36.0;

/// Phase toggle cooldown (the one non-instant toggle in the catalog)
pub const SHIFT_COOLDOWN_MS: f64 = 450.0;

const SPAWN_BASE_MS: f64 = 1500.0;
const SPAWN_STEP_MS: f64 = 90.0;
const SPAWN_MIN_MS: f64 = 600.0;
/// Fall speed in px per frame unit
const SPEED_BASE: f32 = 2.6;
const SPEED_STEP: f32 = 0.3;
const LEVEL_INTERVAL_MS: f64 = 9_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub id: u32,
    /// Top edge of the band
    pub y: f32,
    /// Binary phase, 0 or 1
    pub kind: u8,
    /// Whether this band has already been counted as passed
    pub scored: bool,
}

/// Complete Shift snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftState {
    pub phase: Phase,
    /// The player's current binary phase, 0 or 1
    pub player_shift: u8,
    /// Next phase toggle allowed at this wall-clock time
    pub shift_ready_at: f64,
    pub bands: Vec<Band>,
    pub score: u32,
    pub level: u32,
    pub started_at: f64,
    pub last_spawn_at: f64,
    pub survived_ms: f64,
    next_id: u32,
    rng: Pcg32,
}

impl ShiftState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            player_shift: 0,
            shift_ready_at: now_ms,
            bands: Vec::new(),
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

fn fall_speed(level: u32) -> f32 {
    SPEED_BASE + SPEED_STEP * level as f32
}

/// Advance falling bands by one frame
pub fn tick(state: &mut ShiftState, step: Step) {
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
        state.bands.push(Band { id, y: -BAND_HEIGHT, kind, scored: false });
        state.last_spawn_at = step.now_ms;
    }

    let dy = fall_speed(state.level) * step.frames();
    let mut hit = false;
    for band in &mut state.bands {
        band.y += dy;

        let overlaps_slot = band.y < PLAYER_BOTTOM && band.y + BAND_HEIGHT > PLAYER_TOP;
        if overlaps_slot && band.kind == state.player_shift {
            hit = true;
        }
        if !band.scored && band.y > PLAYER_BOTTOM {
            band.scored = true;
            state.score += 1;
        }
    }
    state.bands.retain(|b| b.y < FIELD_H);

    if hit {
        state.phase = Phase::GameOver;
        log::debug!("shift: solid band hit after {} passes", state.score);
    }
}

/// Toggle the player's phase, gated by a cooldown
pub fn shift_phase(state: &mut ShiftState, now_ms: f64) {
    if !state.phase.is_playing() || now_ms < state.shift_ready_at {
        return;
    }
    state.player_shift ^= 1;
    state.shift_ready_at = now_ms + SHIFT_COOLDOWN_MS;
}

impl Engine for ShiftState {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn push_band(state: &mut ShiftState, y: f32, kind: u8) {
        let id = state.next_id;
        state.next_id += 1;
        state.bands.push(Band { id, y, kind, scored: false });
    }

    #[test]
    fn test_matching_band_in_slot_kills() {
        let mut state = ShiftState::new(2, 0.0);
        state.last_spawn_at = f64::MAX;
        let matching = state.player_shift;
        push_band(&mut state, PLAYER_TOP - 10.0, matching);

        tick(&mut state, Step::new(16.0, 16.0, 1.0));
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_opposite_band_passes_and_scores_once() {
        let mut state = ShiftState::new(2, 0.0);
        state.last_spawn_at = f64::MAX;
        let opposite = state.player_shift ^ 1;
        push_band(&mut state, PLAYER_TOP - 10.0, opposite);

        let mut now = 0.0;
        while state.bands.first().is_some_and(|b| !b.scored) {
            now += 16.0;
            tick(&mut state, Step::new(16.0, now, 1.0));
            assert_eq!(state.phase, Phase::Playing);
        }
        assert_eq!(state.score, 1);

        // No double count while the band falls out the bottom
        while !state.bands.is_empty() {
            now += 16.0;
            tick(&mut state, Step::new(16.0, now, 1.0));
        }
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_shift_cooldown() {
        let mut state = ShiftState::new(2, 0.0);
        shift_phase(&mut state, 100.0);
        assert_eq!(state.player_shift, 1);

        // Inside the cooldown window: rejected
        shift_phase(&mut state, 100.0 + SHIFT_COOLDOWN_MS - 1.0);
        assert_eq!(state.player_shift, 1);

        // Cooldown elapsed: accepted
        shift_phase(&mut state, 100.0 + SHIFT_COOLDOWN_MS);
        assert_eq!(state.player_shift, 0);
    }

    #[test]
    fn test_shift_noop_when_not_playing() {
        let mut state = ShiftState::new(2, 0.0);
        state.phase = Phase::GameOver;
        let before = state.clone();
        shift_phase(&mut state, 10_000.0);
        tick(&mut state, Step::new(16.0, 10_016.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_pause_is_noop() {
        let mut state = ShiftState::new(2, 0.0);
        tick(&mut state, Step::new(16.0, 16.0, 1.0));
        state.toggle_pause();
        let before = state.clone();
        tick(&mut state, Step::new(16.0, 7_000.0, 1.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_spawn_interval_shrinks_to_floor() {
        assert!(spawn_interval_ms(1) < spawn_interval_ms(0));
        assert_eq!(spawn_interval_ms(50), SPAWN_MIN_MS);
        assert!(fall_speed(3) > fall_speed(0));
    }
}
