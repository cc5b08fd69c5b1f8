//! Snake - grid snake with score-driven speedup
//!
//! Classic rules on a 20x20 grid: timed steps, one queued turn consumed
//! per step, food grows the body, walls and self-collision kill. The step
//! interval shrinks as the score climbs. Filling the whole grid is the
//! (theoretical) win.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine, Phase, Step, Summary};

pub const GRID: i32 = 20;

const STEP_BASE_MS: f64 = 160.0;
const STEP_PER_LEVEL_MS: f64 = 8.0;
const STEP_MIN_MS: f64 = 70.0;
/// Score needed per difficulty level
const SCORE_PER_LEVEL: u32 = 5;
const START_LENGTH: usize = 3;

/// Complete Snake snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeState {
    pub phase: Phase,
    /// Body cells, head first
    pub body: Vec<IVec2>,
    pub direction: IVec2,
    /// One queued turn, consumed by the next grid step
    pub queued: Option<IVec2>,
    pub food: IVec2,
    pub score: u32,
    pub level: u32,
    pub started_at: f64,
    pub last_step_at: f64,
    pub survived_ms: f64,
    rng: Pcg32,
}

impl SnakeState {
    pub fn new(seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let head = IVec2::new(GRID / 2, GRID / 2);
        let body: Vec<IVec2> =
            (0..START_LENGTH as i32).map(|i| head - IVec2::new(i, 0)).collect();
        let food = place_food(&mut rng, &body);
        Self {
            phase: Phase::Playing,
            body,
            direction: IVec2::X,
            queued: None,
            food,
            score: 0,
            level: 0,
            started_at: now_ms,
            last_step_at: now_ms,
            survived_ms: 0.0,
            rng,
        }
    }

    /// Current step interval at 1x speed
    pub fn step_interval_ms(&self) -> f64 {
        (STEP_BASE_MS - STEP_PER_LEVEL_MS * self.level as f64).max(STEP_MIN_MS)
    }
}

/// Pick a food cell uniformly among the free cells
fn place_food(rng: &mut Pcg32, body: &[IVec2]) -> IVec2 {
    let free: Vec<IVec2> = (0..GRID * GRID)
        .map(|i| IVec2::new(i % GRID, i / GRID))
        .filter(|cell| !body.contains(cell))
        .collect();
    free[rng.random_range(0..free.len())]
}

fn in_bounds(cell: IVec2) -> bool {
    cell.x >= 0 && cell.x < GRID && cell.y >= 0 && cell.y < GRID
}

/// Advance the snake; may take several grid steps on a large dt
pub fn tick(state: &mut SnakeState, step: Step) {
    if !state.phase.is_playing() {
        return;
    }

    state.survived_ms = step.now_ms - state.started_at;

    loop {
        let interval = state.step_interval_ms() / step.speed as f64;
        if step.now_ms - state.last_step_at < interval {
            break;
        }
        state.last_step_at += interval;
        advance_one_step(state);
        if !state.phase.is_playing() {
            return;
        }
    }
}

fn advance_one_step(state: &mut SnakeState) {
    if let Some(turn) = state.queued.take() {
        state.direction = turn;
    }
    let head = state.body[0] + state.direction;

    // Tail cell is vacated this step unless the head lands on food
    let growing = head == state.food;
    let occupied = if growing { &state.body[..] } else { &state.body[..state.body.len() - 1] };

    if !in_bounds(head) || occupied.contains(&head) {
        state.phase = Phase::GameOver;
        log::debug!("snake: died at {} with score {}", head, state.score);
        return;
    }

    state.body.insert(0, head);
    if growing {
        state.score += 1;
        state.level = engine::difficulty_from_score(state.score, SCORE_PER_LEVEL);
        if state.body.len() == (GRID * GRID) as usize {
            state.phase = Phase::LevelComplete;
            return;
        }
        state.food = place_food(&mut state.rng, &state.body);
    } else {
        state.body.pop();
    }
}

/// Queue a turn for the next grid step; reversals are rejected
pub fn set_direction(state: &mut SnakeState, dir: IVec2) {
    if !state.phase.is_playing() {
        return;
    }
    let valid = matches!(dir, IVec2 { x: 0, y: 1 } | IVec2 { x: 0, y: -1 })
        || matches!(dir, IVec2 { x: 1, y: 0 } | IVec2 { x: -1, y: 0 });
    if !valid || dir == -state.direction {
        return;
    }
    state.queued = Some(dir);
}

impl Engine for SnakeState {
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
