//! Per-minigame simulation engines
//!
//! Each module is an isolated, deterministic simulation: a snapshot type,
//! a constructor, a `tick` transition, and the game's discrete control
//! functions. Rules of the house:
//! - Fixed conventions from [`crate::engine`]: measured `dt`, explicit `now`,
//!   external speed multiplier
//! - Seeded RNG only, owned by the snapshot
//! - Stable iteration order (entities sorted by spawn id)
//! - No rendering, input decoding, or persistence dependencies
//! - Control functions no-op outside their valid phase window

pub mod breakout;
pub mod core_defense;
pub mod dodge;
pub mod memory_glitch;
pub mod orbit;
pub mod overload;
pub mod phase;
pub mod polar;
pub mod pong;
pub mod pulse_dash;
pub mod reactor;
pub mod shift;
pub mod snake;
pub mod void;

pub use breakout::BreakoutState;
pub use core_defense::CoreDefenseState;
pub use dodge::DodgeState;
pub use memory_glitch::MemoryGlitchState;
pub use orbit::OrbitState;
pub use overload::OverloadState;
pub use phase::PhaseState;
pub use polar::PolarState;
pub use pong::PongState;
pub use pulse_dash::PulseDashState;
pub use reactor::ReactorState;
pub use shift::ShiftState;
pub use snake::SnakeState;
pub use void::VoidState;
