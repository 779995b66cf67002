//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by collection order, which follows entity ID)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod level;
pub mod movement;
pub mod projectile;
pub mod state;
pub mod tank;
pub mod tick;

pub use collision::{
    Circle, PlayfieldBounds, Rect, circle_rect_collide, circles_collide, rects_collide,
    within_bounds,
};
pub use combat::ObstacleHit;
pub use level::{LevelDescriptor, parse_levels, validate_levels};
pub use movement::DriveIntent;
pub use state::{
    AiState, Arsenal, Explosion, GameEvent, GamePhase, GameSession, HudStatus, Level, Obstacle,
    ObstacleKind, Pickup, PickupKind, Projectile, ProjectileKind, Side, Tank, TankRole,
};
pub use tank::Surroundings;
pub use tick::{TickInput, fire, select_kind, tick};
