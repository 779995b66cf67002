//! Tank Siege - A top-down arcade tank combat game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, ricochets, combat, levels)
//! - `tuning`: Data-driven game balance
//! - `error`: Level loading failures

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, LevelResult};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Simulation steps per second (one step per animation frame)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1200.0;
    pub const PLAYFIELD_HEIGHT: f32 = 900.0;

    /// Player tank body
    pub const PLAYER_WIDTH: f32 = 65.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const PLAYER_ROTATION_SPEED: f32 = 0.05;

    /// Enemy tank body
    pub const ENEMY_WIDTH: f32 = 40.0;
    pub const ENEMY_HEIGHT: f32 = 40.0;
    pub const ENEMY_SPEED: f32 = 1.5;
    pub const ENEMY_ROTATION_SPEED: f32 = 0.03;

    pub const TANK_HEALTH: f32 = 100.0;

    /// Starting ammo
    pub const START_STANDARD_AMMO: u32 = 10;
    pub const START_ROCKET_AMMO: u32 = 3;

    /// Shells (pixels per tick)
    pub const SHELL_RADIUS: f32 = 5.0;
    pub const STANDARD_SPEED: f32 = 5.0;
    pub const STANDARD_DAMAGE: f32 = 10.0;
    pub const STANDARD_RICOCHETS: u32 = 1;
    pub const ROCKET_SPEED: f32 = 10.0;
    pub const ROCKET_DAMAGE: f32 = 25.0;
    pub const ENEMY_SHELL_SPEED: f32 = 4.0;
    pub const ENEMY_SHELL_DAMAGE: f32 = 10.0;

    /// Enemy AI
    pub const PLAYER_INFLUENCE: f32 = 0.25;
    pub const WANDER_JITTER: f32 = std::f32::consts::FRAC_PI_4;
    pub const BACKUP_TICKS: u32 = 20;
    pub const ENEMY_FIRE_COOLDOWN_TICKS: u32 = 100;
    pub const ENEMY_LIVE_SHELL_CAP: usize = 1;
    pub const HEADING_TOLERANCE: f32 = 0.01;

    /// Obstacles
    pub const BARRIER_HEALTH: f32 = 100.0;
    pub const RUBBLE_HIT_LIMIT: u32 = 2;

    /// Pickups
    pub const AMMO_PACK_AMOUNT: u32 = 5;
    pub const AMMO_PACK_SIZE: (f32, f32) = (45.0, 35.0);
    pub const ROCKET_PACK_SIZE: (f32, f32) = (65.0, 35.0);
    pub const PICKUP_SPAWN_INTERVAL_TICKS: u32 = 10 * TICKS_PER_SECOND;
    pub const PICKUP_CAP: usize = 5;
    pub const AMMO_PACK_CHANCE: f64 = 0.55;
    pub const ROCKET_PACK_CHANCE: f64 = 0.2;

    /// Explosions
    pub const EXPLOSION_MAX_RADIUS: f32 = 30.0;
    pub const EXPLOSION_TICKS: u32 = 30;

    /// Pause between a cleared level and the next one
    pub const LEVEL_CLEAR_TICKS: u32 = TICKS_PER_SECOND;
}

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

/// Unit vector pointing along `angle`
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the ray from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}
