//! Level descriptors and the level sequence controller
//!
//! Descriptors mirror the level editor's JSON shape (obstacle positions are
//! top-left corners, tanks and crates are centered). A whole level set is
//! validated before a session starts, so loading a level later cannot fail.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{PlayfieldBounds, Rect, rects_collide, within_bounds};
use super::state::{
    GameEvent, GamePhase, Level, Obstacle, Pickup, PickupKind, Tank, TankRole,
};
use super::GameSession;
use crate::error::{LevelError, LevelResult};
use crate::tuning::{TankTuning, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl From<SpawnPoint> for Vec2 {
    fn from(p: SpawnPoint) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub color: Option<String>,
    /// Overrides the enemy class health
    #[serde(default)]
    pub health: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleSpecKind {
    Barrier,
    Rubble,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    #[serde(rename = "type")]
    pub kind: ObstacleSpecKind,
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub color: Option<String>,
    /// Rubble hit limit
    #[serde(default)]
    pub durability: Option<u32>,
    /// Barrier health
    #[serde(default)]
    pub health: Option<f32>,
}

impl ObstacleSpec {
    pub fn rect(&self) -> Rect {
        Rect::from_corner(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSpec {
    #[serde(rename = "type")]
    pub kind: PickupKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub amount: Option<u32>,
}

/// One level as authored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
    #[serde(default, alias = "barriers")]
    pub obstacles: Vec<ObstacleSpec>,
    #[serde(default, alias = "ammoPacks")]
    pub pickups: Vec<PickupSpec>,
    #[serde(default)]
    pub player_position: Option<SpawnPoint>,
}

impl LevelDescriptor {
    /// Empty level with a player spawn point
    pub fn with_spawn(x: f32, y: f32) -> Self {
        Self {
            player_position: Some(SpawnPoint { x, y }),
            ..Default::default()
        }
    }

    pub fn enemy(mut self, x: f32, y: f32) -> Self {
        self.enemies.push(EnemySpec {
            x,
            y,
            color: None,
            health: None,
        });
        self
    }

    pub fn barrier(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.obstacles.push(ObstacleSpec {
            kind: ObstacleSpecKind::Barrier,
            x,
            y,
            width,
            height,
            color: None,
            durability: None,
            health: None,
        });
        self
    }

    pub fn rubble(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.obstacles.push(ObstacleSpec {
            kind: ObstacleSpecKind::Rubble,
            x,
            y,
            width,
            height,
            color: None,
            durability: None,
            health: None,
        });
        self
    }

    pub fn pickup(mut self, kind: PickupKind, x: f32, y: f32) -> Self {
        self.pickups.push(PickupSpec {
            kind,
            x,
            y,
            amount: None,
        });
        self
    }
}

/// Parse a JSON array of level descriptors
pub fn parse_levels(json: &str) -> LevelResult<Vec<LevelDescriptor>> {
    Ok(serde_json::from_str(json)?)
}

/// Reject a level set that could not be played to completion
pub fn validate_levels(levels: &[LevelDescriptor], tuning: &Tuning) -> LevelResult<()> {
    if levels.is_empty() {
        return Err(LevelError::NoLevels);
    }
    for (index, descriptor) in levels.iter().enumerate() {
        validate_level(index as u32 + 1, descriptor, tuning.playfield, &tuning.enemy)?;
    }
    Ok(())
}

fn validate_level(
    level: u32,
    descriptor: &LevelDescriptor,
    bounds: PlayfieldBounds,
    body: &TankTuning,
) -> LevelResult<()> {
    let spawn = descriptor
        .player_position
        .ok_or(LevelError::MissingPlayerSpawn { level })?;
    if !bounds.contains(spawn.into()) {
        return Err(LevelError::SpawnOutOfBounds {
            level,
            x: spawn.x,
            y: spawn.y,
        });
    }

    if descriptor.enemies.is_empty() {
        return Err(LevelError::NoEnemies { level });
    }
    let side = body.width.max(body.height);
    for (index, enemy) in descriptor.enemies.iter().enumerate() {
        let center = Vec2::new(enemy.x, enemy.y);
        let footprint = Rect::new(center, Vec2::new(body.width, body.height));
        let reason = if !within_bounds(&Rect::new(center, Vec2::splat(side)), bounds) {
            Some("body is not inside the playfield")
        } else if descriptor
            .obstacles
            .iter()
            .any(|o| rects_collide(&footprint, &o.rect()))
        {
            Some("body overlaps an obstacle")
        } else if enemy.health.is_some_and(|h| !(h.is_finite() && h > 0.0)) {
            Some("health must be positive")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(LevelError::InvalidEnemy {
                level,
                index,
                reason,
            });
        }
    }

    for (index, obstacle) in descriptor.obstacles.iter().enumerate() {
        let reason = if !(obstacle.x.is_finite() && obstacle.y.is_finite()) {
            Some("position is not finite")
        } else if !(obstacle.width > 0.0 && obstacle.height > 0.0) {
            Some("size must be positive")
        } else if obstacle.kind == ObstacleSpecKind::Rubble && obstacle.durability == Some(0) {
            Some("durability must be at least 1")
        } else if obstacle.kind == ObstacleSpecKind::Barrier
            && obstacle.health.is_some_and(|h| !(h.is_finite() && h > 0.0))
        {
            Some("health must be positive")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(LevelError::InvalidObstacle {
                level,
                index,
                reason,
            });
        }
    }
    Ok(())
}

impl GameSession {
    /// Build level `index` from its descriptor and put the player on its spawn
    ///
    /// Shells and explosions of the previous level are dropped, the player is
    /// healed, and the first-move grace period starts over.
    pub(crate) fn start_level(&mut self, index: usize) {
        let descriptor = self.levels[index].clone();
        let tuning = self.tuning.clone();

        let mut enemies = Vec::with_capacity(descriptor.enemies.len());
        for spec in &descriptor.enemies {
            let id = self.next_entity_id();
            let heading = self.rng.random_range(0.0..std::f32::consts::TAU);
            let health = spec.health.unwrap_or(tuning.enemy.max_health);
            let mut enemy = Tank::enemy(id, Vec2::new(spec.x, spec.y), heading, &tuning.enemy, health);
            if let TankRole::Enemy(brain) = &mut enemy.role {
                brain.fire_cooldown = tuning.enemy_ai.fire_cooldown_ticks;
            }
            enemy.color = spec.color.clone();
            enemies.push(enemy);
        }

        let mut obstacles = Vec::with_capacity(descriptor.obstacles.len());
        for spec in &descriptor.obstacles {
            let id = self.next_entity_id();
            let min = Vec2::new(spec.x, spec.y);
            let size = Vec2::new(spec.width, spec.height);
            let mut obstacle = match spec.kind {
                ObstacleSpecKind::Barrier => {
                    Obstacle::barrier(id, min, size, spec.health.unwrap_or(tuning.barrier_health))
                }
                ObstacleSpecKind::Rubble => {
                    Obstacle::rubble(id, min, size, spec.durability.unwrap_or(tuning.rubble_hit_limit))
                }
            };
            obstacle.color = spec.color.clone();
            obstacles.push(obstacle);
        }

        let mut pickups = Vec::with_capacity(descriptor.pickups.len());
        for spec in &descriptor.pickups {
            let (w, h) = tuning.pickups.size_of(spec.kind);
            pickups.push(Pickup {
                id: self.next_entity_id(),
                kind: spec.kind,
                pos: Vec2::new(spec.x, spec.y),
                size: Vec2::new(w, h),
                amount: spec.amount.unwrap_or(tuning.pickups.ammo_amount),
            });
        }

        // Validated up front
        let spawn: Vec2 = descriptor
            .player_position
            .map(Vec2::from)
            .unwrap_or(self.player.pos);

        self.level = Level {
            index,
            spawn,
            enemies,
            obstacles,
            pickups,
        };
        self.player.pos = spawn;
        self.player.health = self.player.max_health;
        self.player.moving = false;
        self.projectiles.clear();
        self.explosions.clear();
        self.player_has_moved = false;
        self.awaiting_input_release = true;
        self.pickup_timer = 0;
        self.clear_ticks = 0;
        self.phase = GamePhase::Playing;

        let ordinal = index as u32 + 1;
        self.events.push(GameEvent::LevelStarted { level: ordinal });
        log::info!(
            "Level {} loaded: {} enemies, {} obstacles, {} pickups",
            ordinal,
            self.level.enemies.len(),
            self.level.obstacles.len(),
            self.level.pickups.len()
        );
    }

    /// Leave a cleared level: next level, or a full reset after the last one
    pub(crate) fn advance_level(&mut self) {
        let next = self.level.index + 1;
        if next < self.levels.len() {
            log::info!("Advancing to level {}", next + 1);
            self.start_level(next);
        } else {
            log::info!("All {} levels complete", self.levels.len());
            self.events.push(GameEvent::AllLevelsComplete);
            self.reset();
        }
    }

    /// Back to level 1 with a fresh player (default ammo and health)
    pub fn reset(&mut self) {
        let id = self.player.id;
        self.player = Tank::player(id, Vec2::ZERO, &self.tuning.player, self.tuning.loadout);
        log::info!("Game reset");
        self.start_level(0);
    }
}
