//! Void - a drifting point inside a shrinking box
//!
//! The point moves at constant velocity; the only control instantly negates
//! that velocity on both axes. The playable inset margin grows over time
//! down to a floor on the safe area, and touching any edge ends the run.
//! Fully deterministic: no RNG anywhere.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Phase, Step, Summary};

/// Square field edge length in px
pub const FIELD: f32 = 600.0;
const POINT_RADIUS: f32 = 10.0;
/// Starting velocity in px per frame unit
const START_VEL: Vec2 = Vec2::new(1.7, 1.15);
/// Inset margin growth in px/second
const MARGIN_GROWTH_PER_S: f32 = 12.0;
/// Margin cap, leaving a 160px safe square at minimum
const MARGIN_MAX: f32 = 220.0;

/// Complete Void snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidState {
    pub phase: Phase,
    pub pos: Vec2,
    /// Velocity in px per frame unit
    pub vel: Vec2,
    pub radius: f32,
    /// Current inset margin; walls sit at `margin` and `FIELD - margin`
    pub margin: f32,
    pub started_at: f64,
    /// Survival time doubles as the score
    pub survived_ms: f64,
}

impl VoidState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            phase: Phase::Playing,
            pos: Vec2::splat(FIELD / 2.0),
            vel: START_VEL,
            radius: POINT_RADIUS,
            margin: 0.0,
            started_at: now_ms,
            survived_ms: 0.0,
        }
    }
}

/// Advance the point by one frame and test the shrinking walls
pub fn tick(state: &mut VoidState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    let elapsed = step.now_ms - state.started_at;
    state.survived_ms = elapsed;
    state.margin = (elapsed as f32 / 1000.0 * MARGIN_GROWTH_PER_S).min(MARGIN_MAX);

    state.pos += state.vel * step.frames();

    let lo = state.margin + state.radius;
    let hi = FIELD - state.margin - state.radius;
    if state.pos.x <= lo || state.pos.x >= hi || state.pos.y <= lo || state.pos.y >= hi {
        // Pin the point to the wall it died on for the result screen
        state.pos = state.pos.clamp(Vec2::splat(lo), Vec2::splat(hi));
        state.phase = Phase::GameOver;
        log::debug!("void: wall touch after {:.0}ms", state.survived_ms);
    }
}

/// Instantly negate the velocity on both axes
pub fn reverse_direction(state: &mut VoidState) {
    if !state.phase.is_playing() {
        return;
    }
    state.vel = -state.vel;
}

impl Engine for VoidState {
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
            score: self.survived_ms as u64,
            survival_ms: self.survived_ms as u64,
            best_combo: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untended_point_dies_on_a_wall() {
        let mut state = VoidState::new(0.0);
        let mut now = 0.0;
        while state.phase == Phase::Playing {
            now += 16.0;
            tick(&mut state, Step::new(16.0, now, 1.0));
            assert!(now < 60_000.0, "point never reached a wall");
        }
        assert_eq!(state.phase, Phase::GameOver);
        // Post-death position is clamped inside the walls
        let lo = state.margin + state.radius;
        let hi = FIELD - state.margin - state.radius;
        assert!(state.pos.x >= lo && state.pos.x <= hi);
        assert!(state.pos.y >= lo && state.pos.y <= hi);
        assert!(state.survived_ms > 0.0);
    }

    #[test]
    fn test_reverse_extends_survival() {
        let mut baseline = VoidState::new(0.0);
        let mut tended = VoidState::new(0.0);
        let mut now = 0.0;
        let mut baseline_death = None;
        loop {
            now += 16.0;
            let step = Step::new(16.0, now, 1.0);
            tick(&mut baseline, step);
            // Bounce off the approaching wall just before contact, but only
            // while still moving toward it (avoids reversal flip-flop)
            let hi = FIELD - tended.margin - tended.radius - 8.0;
            let lo = tended.margin + tended.radius + 8.0;
            let toward_wall = (tended.pos.x > hi && tended.vel.x > 0.0)
                || (tended.pos.x < lo && tended.vel.x < 0.0)
                || (tended.pos.y > hi && tended.vel.y > 0.0)
                || (tended.pos.y < lo && tended.vel.y < 0.0);
            if toward_wall {
                reverse_direction(&mut tended);
            }
            tick(&mut tended, step);
            if baseline.phase == Phase::GameOver && baseline_death.is_none() {
                baseline_death = Some(baseline.survived_ms);
            }
            if now > 20_000.0 {
                break;
            }
        }
        let baseline_death = baseline_death.expect("untended point survived 20s");
        assert!(tended.survived_ms > baseline_death);
    }

    #[test]
    fn test_frame_rate_independence() {
        // N small steps vs N/2 double steps over the same elapsed time
        let mut fine = VoidState::new(0.0);
        let mut coarse = VoidState::new(0.0);
        for i in 1..=100 {
            tick(&mut fine, Step::new(16.0, i as f64 * 16.0, 1.0));
        }
        for i in 1..=50 {
            tick(&mut coarse, Step::new(32.0, i as f64 * 32.0, 1.0));
        }
        assert!((fine.pos - coarse.pos).length() < 0.01);
        assert_eq!(fine.survived_ms, coarse.survived_ms);
    }

    #[test]
    fn test_margin_monotone_and_capped() {
        let mut state = VoidState::new(0.0);
        let mut last = 0.0;
        for i in 1..=500 {
            // Reset position each frame so only the margin is under test
            state.pos = Vec2::splat(FIELD / 2.0);
            tick(&mut state, Step::new(100.0, i as f64 * 100.0, 1.0));
            assert!(state.margin >= last);
            last = state.margin;
        }
        assert_eq!(state.margin, MARGIN_MAX);
    }

    #[test]
    fn test_pause_and_terminal_noop() {
        let mut state = VoidState::new(0.0);
        tick(&mut state, Step::new(16.0, 16.0, 1.0));
        state.toggle_pause();
        let before = state.clone();
        tick(&mut state, Step::new(16.0, 8_000.0, 1.0));
        reverse_direction(&mut state);
        assert_eq!(state, before);
    }
}
