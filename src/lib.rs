//! Arcade Engines - deterministic simulation cores for a minigame catalog
//!
//! Core modules:
//! - `engine`: shared phase machine, timing context, and the `Engine` trait
//! - `engines`: one self-contained simulation module per minigame
//! - `settings`: user-facing tunables (speed multiplier etc.)
//!
//! Every engine is pure arithmetic over its own snapshot: no rendering,
//! no input decoding, no persistence. Drivers feed measured `dt`/`now`
//! values and discrete commands in, and read the snapshot back out.

pub mod engine;
pub mod engines;
pub mod settings;

pub use engine::{Engine, Phase, Step, Summary};
pub use settings::Settings;

use glam::Vec2;

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest angular distance between two angles, in [0, π]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
