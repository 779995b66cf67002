//! Data-driven game balance
//!
//! Every numeric rule of the simulation lives here. An override file only
//! has to name the values it changes: it is merged over the full default
//! sheet, so unnamed fields keep the default of their own slot (a rocket
//! override keeps rocket ballistics, not standard-shell ones).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::*;
use crate::sim::collision::PlayfieldBounds;
use crate::sim::state::{PickupKind, ProjectileKind};

/// Body dimensions and drive characteristics of a tank class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub width: f32,
    pub height: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Radians per tick
    pub rotation_speed: f32,
    pub max_health: f32,
}

impl TankTuning {
    pub fn player() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            rotation_speed: PLAYER_ROTATION_SPEED,
            max_health: TANK_HEALTH,
        }
    }

    pub fn enemy() -> Self {
        Self {
            width: ENEMY_WIDTH,
            height: ENEMY_HEIGHT,
            speed: ENEMY_SPEED,
            rotation_speed: ENEMY_ROTATION_SPEED,
            max_health: TANK_HEALTH,
        }
    }
}

impl Default for TankTuning {
    fn default() -> Self {
        Self::enemy()
    }
}

/// Ballistics of one projectile kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Pixels per tick
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    /// Reflections allowed before the next contact destroys the shell
    pub max_ricochets: u32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: STANDARD_SPEED,
            radius: SHELL_RADIUS,
            damage: STANDARD_DAMAGE,
            max_ricochets: STANDARD_RICOCHETS,
        }
    }
}

/// Enemy steering and fire control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyAiTuning {
    /// Blend weight of the angle toward the player (0 = pure wander)
    pub player_influence: f32,
    /// Half-width of the random heading jitter (radians)
    pub wander_jitter: f32,
    pub backup_ticks: u32,
    pub fire_cooldown_ticks: u32,
    pub live_projectile_cap: usize,
    /// Heading is considered on target within this many radians
    pub heading_tolerance: f32,
}

impl Default for EnemyAiTuning {
    fn default() -> Self {
        Self {
            player_influence: PLAYER_INFLUENCE,
            wander_jitter: WANDER_JITTER,
            backup_ticks: BACKUP_TICKS,
            fire_cooldown_ticks: ENEMY_FIRE_COOLDOWN_TICKS,
            live_projectile_cap: ENEMY_LIVE_SHELL_CAP,
            heading_tolerance: HEADING_TOLERANCE,
        }
    }
}

/// Ammo crates: footprints, payload and the periodic spawner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub ammo_amount: u32,
    pub ammo_pack_size: (f32, f32),
    pub rocket_pack_size: (f32, f32),
    pub spawn_interval_ticks: u32,
    pub cap: usize,
    pub ammo_pack_chance: f64,
    /// Rolled only when no standard pack spawned this interval
    pub rocket_pack_chance: f64,
}

impl PickupTuning {
    pub fn size_of(&self, kind: PickupKind) -> (f32, f32) {
        match kind {
            PickupKind::AmmoPack => self.ammo_pack_size,
            PickupKind::RocketAmmoPack => self.rocket_pack_size,
        }
    }
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            ammo_amount: AMMO_PACK_AMOUNT,
            ammo_pack_size: AMMO_PACK_SIZE,
            rocket_pack_size: ROCKET_PACK_SIZE,
            spawn_interval_ticks: PICKUP_SPAWN_INTERVAL_TICKS,
            cap: PICKUP_CAP,
            ammo_pack_chance: AMMO_PACK_CHANCE,
            rocket_pack_chance: ROCKET_PACK_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    pub max_radius: f32,
    pub duration_ticks: u32,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self {
            max_radius: EXPLOSION_MAX_RADIUS,
            duration_ticks: EXPLOSION_TICKS,
        }
    }
}

/// Player ammo granted on a new game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub standard_ammo: u32,
    pub rocket_ammo: u32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            standard_ammo: START_STANDARD_AMMO,
            rocket_ammo: START_ROCKET_AMMO,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: PlayfieldBounds,
    pub player: TankTuning,
    pub enemy: TankTuning,
    pub standard: ProjectileTuning,
    pub rocket: ProjectileTuning,
    pub enemy_standard: ProjectileTuning,
    pub enemy_ai: EnemyAiTuning,
    pub pickups: PickupTuning,
    pub explosion: ExplosionTuning,
    pub loadout: Loadout,
    pub barrier_health: f32,
    pub rubble_hit_limit: u32,
    pub level_clear_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield: PlayfieldBounds::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            player: TankTuning::player(),
            enemy: TankTuning::enemy(),
            standard: ProjectileTuning::default(),
            rocket: ProjectileTuning {
                speed: ROCKET_SPEED,
                radius: SHELL_RADIUS,
                damage: ROCKET_DAMAGE,
                max_ricochets: 0,
            },
            enemy_standard: ProjectileTuning {
                speed: ENEMY_SHELL_SPEED,
                radius: SHELL_RADIUS,
                damage: ENEMY_SHELL_DAMAGE,
                max_ricochets: STANDARD_RICOCHETS,
            },
            enemy_ai: EnemyAiTuning::default(),
            pickups: PickupTuning::default(),
            explosion: ExplosionTuning::default(),
            loadout: Loadout::default(),
            barrier_health: BARRIER_HEALTH,
            rubble_hit_limit: RUBBLE_HIT_LIMIT,
            level_clear_ticks: LEVEL_CLEAR_TICKS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut sheet = serde_json::to_value(Self::default())?;
        merge(&mut sheet, overrides);
        serde_json::from_value(sheet)
    }

    /// Ballistics for a projectile kind
    pub fn projectile(&self, kind: ProjectileKind) -> &ProjectileTuning {
        match kind {
            ProjectileKind::Standard => &self.standard,
            ProjectileKind::Rocket => &self.rocket,
            ProjectileKind::EnemyStandard => &self.enemy_standard,
        }
    }
}

/// Recursively overlay `overrides` onto `base`; objects merge key by key,
/// anything else replaces the base value
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, value) => *base = value,
    }
}
