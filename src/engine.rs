//! Shared engine skeleton
//!
//! Every minigame repeats the same coarse state machine
//! (`Playing ⇄ Paused`, `Playing → GameOver | LevelComplete`) and the same
//! timing conventions. The per-game modules implement only their own spawn,
//! collision, and scoring rules on top of this.
//!
//! Timing conventions:
//! - `dt` is measured milliseconds between frames; movement constants are
//!   expressed in 60 fps "frame units" and scaled by `dt / FRAME_MS`.
//! - `now` is absolute wall-clock milliseconds. Timed effects are stored as
//!   absolute `*_until` / `*_ready_at` deadlines, so expiry is a comparison
//!   against `now`, never a countdown.
//! - The driving loop must not advance `now` across a pause; engines also
//!   no-op their tick while paused as a second line of defense.

use serde::{Deserialize, Serialize};

/// Nominal frame duration at 60 fps, in milliseconds
pub const FRAME_MS: f32 = 16.0;

/// Coarse gameplay phase shared by all engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Active gameplay
    Playing,
    /// Simulation frozen; tick is a no-op
    Paused,
    /// Run ended in failure (terminal)
    GameOver,
    /// Run ended in success (terminal)
    LevelComplete,
}

impl Phase {
    /// Terminal phases never transition away; a new run needs a new snapshot
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::LevelComplete)
    }

    pub fn is_playing(self) -> bool {
        self == Phase::Playing
    }
}

/// Per-frame timing context supplied by the driving loop
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Measured frame delta in milliseconds
    pub dt_ms: f32,
    /// Absolute wall-clock time in milliseconds
    pub now_ms: f64,
    /// External speed multiplier (user setting, nominally 0.75-1.25)
    pub speed: f32,
}

impl Step {
    pub fn new(dt_ms: f32, now_ms: f64, speed: f32) -> Self {
        Self { dt_ms, now_ms, speed }
    }

    /// Movement scale in 60 fps frame units, including the speed multiplier
    #[inline]
    pub fn frames(&self) -> f32 {
        self.dt_ms / FRAME_MS * self.speed
    }

    /// Frame delta in seconds, including the speed multiplier
    #[inline]
    pub fn seconds(&self) -> f32 {
        self.dt_ms / 1000.0 * self.speed
    }
}

/// Difficulty tier from elapsed wall-clock time: `floor(elapsed / interval)`
#[inline]
pub fn difficulty_from_elapsed(elapsed_ms: f64, interval_ms: f64) -> u32 {
    if elapsed_ms <= 0.0 {
        return 0;
    }
    (elapsed_ms / interval_ms) as u32
}

/// Difficulty tier from cumulative score: `floor(score / per)`
#[inline]
pub fn difficulty_from_score(score: u32, per: u32) -> u32 {
    score / per
}

/// Terminal scalars handed to the scoring collaborator when a run ends.
///
/// The engine writes these; it knows nothing about records, XP, or currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub score: u64,
    pub survival_ms: u64,
    pub best_combo: u32,
}

/// Common surface of all minigame engines.
///
/// Lets a generic driver run any game: feed timing + held input, toggle
/// pause, and read the terminal scalars once `phase` goes terminal.
pub trait Engine {
    /// Held per-frame input (direction flags etc.); `()` for engines whose
    /// only input is a discrete control function.
    type Input;

    fn phase(&self) -> Phase;
    fn phase_mut(&mut self) -> &mut Phase;

    /// Advance the simulation by one frame
    fn tick(&mut self, input: &Self::Input, step: Step);

    /// Terminal scalars for the scoring collaborator
    fn summary(&self) -> Summary;

    /// Toggle pause; no-op once terminal
    fn toggle_pause(&mut self) {
        let phase = self.phase_mut();
        *phase = match *phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            terminal => terminal,
        };
    }
}
