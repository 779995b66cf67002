//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here, owned by [`GameSession`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, Rect};
use super::level::LevelDescriptor;
use crate::error::LevelResult;
use crate::tuning::{Loadout, TankTuning, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Every enemy is down; the next level loads when the pause runs out
    LevelClear,
    /// Player tank destroyed; frozen until an explicit reset
    GameOver,
}

/// Which team fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Standard,
    Rocket,
    EnemyStandard,
}

impl ProjectileKind {
    pub fn side(self) -> Side {
        match self {
            ProjectileKind::Standard | ProjectileKind::Rocket => Side::Player,
            ProjectileKind::EnemyStandard => Side::Enemy,
        }
    }
}

/// Enemy steering state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Seeking,
    /// Reversing after a blocked move
    BackingUp { ticks_left: u32 },
    /// Terminal
    Destroyed,
}

/// Per-enemy AI memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBrain {
    pub state: AiState,
    /// Heading the body is turning toward
    pub target_angle: f32,
    /// Ticks until the next shot is allowed
    pub fire_cooldown: u32,
}

/// Player ammo counters and the selected shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arsenal {
    pub standard_ammo: u32,
    pub rocket_ammo: u32,
    pub selected: ProjectileKind,
}

impl Arsenal {
    pub fn new(loadout: Loadout) -> Self {
        Self {
            standard_ammo: loadout.standard_ammo,
            rocket_ammo: loadout.rocket_ammo,
            selected: ProjectileKind::Standard,
        }
    }

    pub fn ammo(&self, kind: ProjectileKind) -> u32 {
        match kind {
            ProjectileKind::Standard => self.standard_ammo,
            ProjectileKind::Rocket => self.rocket_ammo,
            ProjectileKind::EnemyStandard => 0,
        }
    }

    /// Counter for a kind the player can carry
    pub fn ammo_mut(&mut self, kind: ProjectileKind) -> Option<&mut u32> {
        match kind {
            ProjectileKind::Standard => Some(&mut self.standard_ammo),
            ProjectileKind::Rocket => Some(&mut self.rocket_ammo),
            ProjectileKind::EnemyStandard => None,
        }
    }
}

/// Player/enemy specific data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TankRole {
    Player(Arsenal),
    Enemy(EnemyBrain),
}

/// A tank entity (player or enemy)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: u32,
    pub role: TankRole,
    /// Body center
    pub pos: Vec2,
    /// Body angle (radians)
    pub heading: f32,
    /// Turret angle, independent of the body
    pub turret: f32,
    pub width: f32,
    pub height: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Radians per tick
    pub rotation_speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub destroyed: bool,
    /// Moved during the last tick (drives start/stop audio events)
    pub moving: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl Tank {
    pub fn player(id: u32, pos: Vec2, spec: &TankTuning, loadout: Loadout) -> Self {
        Self::with_role(id, TankRole::Player(Arsenal::new(loadout)), pos, 0.0, spec, spec.max_health)
    }

    pub fn enemy(id: u32, pos: Vec2, heading: f32, spec: &TankTuning, health: f32) -> Self {
        let brain = EnemyBrain {
            state: AiState::Seeking,
            target_angle: heading,
            fire_cooldown: 0,
        };
        Self::with_role(id, TankRole::Enemy(brain), pos, heading, spec, health)
    }

    fn with_role(
        id: u32,
        role: TankRole,
        pos: Vec2,
        heading: f32,
        spec: &TankTuning,
        health: f32,
    ) -> Self {
        Self {
            id,
            role,
            pos,
            heading,
            turret: heading,
            width: spec.width,
            height: spec.height,
            speed: spec.speed,
            rotation_speed: spec.rotation_speed,
            health,
            max_health: health,
            destroyed: false,
            moving: false,
            color: None,
        }
    }

    pub fn side(&self) -> Side {
        match self.role {
            TankRole::Player(_) => Side::Player,
            TankRole::Enemy(_) => Side::Enemy,
        }
    }

    pub fn arsenal(&self) -> Option<&Arsenal> {
        match &self.role {
            TankRole::Player(arsenal) => Some(arsenal),
            TankRole::Enemy(_) => None,
        }
    }

    pub fn arsenal_mut(&mut self) -> Option<&mut Arsenal> {
        match &mut self.role {
            TankRole::Player(arsenal) => Some(arsenal),
            TankRole::Enemy(_) => None,
        }
    }

    pub fn brain(&self) -> Option<&EnemyBrain> {
        match &self.role {
            TankRole::Enemy(brain) => Some(brain),
            TankRole::Player(_) => None,
        }
    }

    pub fn is_backing_up(&self) -> bool {
        matches!(
            self.brain().map(|b| b.state),
            Some(AiState::BackingUp { .. })
        )
    }

    /// Half of the long body axis (turret tip distance, bounds margin)
    #[inline]
    pub fn half_long_axis(&self) -> f32 {
        self.width.max(self.height) * 0.5
    }

    /// Body rectangle centered at `pos`
    pub fn footprint_at(&self, pos: Vec2) -> Rect {
        Rect::new(pos, Vec2::new(self.width, self.height))
    }

    /// Square that must stay inside the playfield wherever the body points
    pub fn bounding_box_at(&self, pos: Vec2) -> Rect {
        Rect::new(pos, Vec2::splat(self.width.max(self.height)))
    }

    /// Hit circle used against shells and other tanks
    pub fn hit_circle_at(&self, pos: Vec2) -> Circle {
        Circle::new(pos, self.width * 0.5)
    }
}

/// A shell in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    /// Tank that fired it
    pub owner: u32,
    pub pos: Vec2,
    /// Direction of travel (radians)
    pub angle: f32,
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    pub ricochets: u32,
    pub max_ricochets: u32,
    /// Obstacles overlapped on the previous tick (contact registers on entry only)
    #[serde(default)]
    pub contacts: Vec<u32>,
}

impl Projectile {
    pub fn side(&self) -> Side {
        self.kind.side()
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Obstacle durability model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Reflects shells and loses health per hit
    Barrier { health: f32, max_health: f32 },
    /// Swallows every shell; gives way after `hit_limit` hits
    Rubble { hits_taken: u32, hit_limit: u32 },
}

/// A static map block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
    pub destroyed: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl Obstacle {
    pub fn barrier(id: u32, min: Vec2, size: Vec2, health: f32) -> Self {
        Self {
            id,
            kind: ObstacleKind::Barrier {
                health,
                max_health: health,
            },
            min,
            size,
            destroyed: false,
            color: None,
        }
    }

    pub fn rubble(id: u32, min: Vec2, size: Vec2, hit_limit: u32) -> Self {
        Self {
            id,
            kind: ObstacleKind::Rubble {
                hits_taken: 0,
                hit_limit,
            },
            min,
            size,
            destroyed: false,
            color: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corner(self.min, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    AmmoPack,
    RocketAmmoPack,
}

impl PickupKind {
    /// Counter credited on collection
    pub fn ammo_kind(self) -> ProjectileKind {
        match self {
            PickupKind::AmmoPack => ProjectileKind::Standard,
            PickupKind::RocketAmmoPack => ProjectileKind::Rocket,
        }
    }
}

/// An ammo crate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    /// Crate center
    pub pos: Vec2,
    pub size: Vec2,
    pub amount: u32,
}

impl Pickup {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Visual blast timer left by a rocket impact (no collision role)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub duration: u32,
    pub life: u32,
}

impl Explosion {
    pub fn is_over(&self) -> bool {
        self.life >= self.duration
    }
}

/// Semantic events for audio and presentation, drained every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TankMoved { tank: u32 },
    TankStoppedMoving { tank: u32 },
    ShotFired { tank: u32, kind: ProjectileKind },
    TankDestroyed { tank: u32, side: Side },
    ObstacleDestroyed { obstacle: u32 },
    ExplosionSpawned { x: f32, y: f32 },
    PickupCollected { kind: PickupKind, amount: u32 },
    PickupSpawned { kind: PickupKind },
    LevelStarted { level: u32 },
    LevelCleared { level: u32 },
    AllLevelsComplete,
    GameOver,
}

/// Read-only status for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudStatus {
    pub health: f32,
    pub max_health: f32,
    pub standard_ammo: u32,
    pub rocket_ammo: u32,
    pub selected: ProjectileKind,
    pub phase: GamePhase,
    /// 1-based level ordinal
    pub level: u32,
    pub level_count: u32,
}

/// The active level's entity collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// 0-based position in the level sequence
    pub index: usize,
    pub spawn: Vec2,
    pub enemies: Vec<Tank>,
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
}

impl Level {
    /// Cleared once every enemy is destroyed
    pub fn is_cleared(&self) -> bool {
        self.enemies.iter().all(|e| e.destroyed)
    }
}

/// One game from first level to reset
///
/// Exclusively owns the playfield; subsystems borrow it for a single tick.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) levels: Vec<LevelDescriptor>,
    pub level: Level,
    pub player: Tank,
    /// Live shells of both sides
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Enemies and shells stay frozen until the player first moves
    pub player_has_moved: bool,
    /// Held movement intents are ignored until released (after a level change)
    pub(crate) awaiting_input_release: bool,
    /// Ticks since the last pickup spawn roll
    pub(crate) pickup_timer: u32,
    /// Ticks left in the LevelClear pause
    pub(crate) clear_ticks: u32,
    /// Events raised during the last tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameSession {
    /// Validate the level set and start on the first level
    pub fn new(levels: Vec<LevelDescriptor>, tuning: Tuning, seed: u64) -> LevelResult<Self> {
        super::level::validate_levels(&levels, &tuning)?;

        let player = Tank::player(0, Vec2::ZERO, &tuning.player, tuning.loadout);
        let mut session = Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            level: Level {
                index: 0,
                spawn: Vec2::ZERO,
                enemies: Vec::new(),
                obstacles: Vec::new(),
                pickups: Vec::new(),
            },
            player,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            phase: GamePhase::Playing,
            time_ticks: 0,
            player_has_moved: false,
            awaiting_input_release: false,
            pickup_timer: 0,
            clear_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        };
        session.player.id = session.next_entity_id();
        session.start_level(0);
        // Nothing can be held before the first tick
        session.awaiting_input_release = false;
        log::info!(
            "Session started: {} levels, seed {}",
            session.levels.len(),
            seed
        );
        Ok(session)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Tank by id, player included
    pub fn tank(&self, id: u32) -> Option<&Tank> {
        if self.player.id == id {
            return Some(&self.player);
        }
        self.level.enemies.iter().find(|t| t.id == id)
    }

    pub fn hud(&self) -> HudStatus {
        let arsenal = self.player.arsenal();
        HudStatus {
            health: self.player.health,
            max_health: self.player.max_health,
            standard_ammo: arsenal.map_or(0, |a| a.standard_ammo),
            rocket_ammo: arsenal.map_or(0, |a| a.rocket_ammo),
            selected: arsenal.map_or(ProjectileKind::Standard, |a| a.selected),
            phase: self.phase,
            level: self.level.index as u32 + 1,
            level_count: self.levels.len() as u32,
        }
    }
}
