//! Tank operations shared by the player and enemies

use glam::Vec2;

use super::collision::{
    PlayfieldBounds, Rect, circle_rect_collide, circles_collide, rects_collide, within_bounds,
};
use super::state::{AiState, Obstacle, Projectile, ProjectileKind, Tank, TankRole};
use crate::tuning::ProjectileTuning;
use crate::{angle_to, heading_vector};

/// What a moving tank can bump into
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub bounds: PlayfieldBounds,
    /// Other tanks; the mover itself is skipped by id
    pub tanks: &'a [Tank],
    /// The player, when an enemy is moving
    pub player: Option<&'a Tank>,
    pub obstacles: &'a [Obstacle],
}

impl Surroundings<'_> {
    /// Three-part test: out of bounds, overlapping a live tank, or overlapping a live obstacle
    pub fn blocks(&self, tank: &Tank, candidate: Vec2) -> bool {
        if !within_bounds(&tank.bounding_box_at(candidate), self.bounds) {
            return true;
        }

        let body = tank.hit_circle_at(candidate);
        let hits_tank = self
            .tanks
            .iter()
            .chain(self.player)
            .filter(|other| other.id != tank.id && !other.destroyed)
            .any(|other| circles_collide(&body, &other.hit_circle_at(other.pos)));
        if hits_tank {
            return true;
        }

        let footprint = tank.footprint_at(candidate);
        self.obstacles
            .iter()
            .filter(|o| !o.destroyed)
            .any(|o| rects_collide(&footprint, &o.rect()))
    }
}

impl Tank {
    /// Attempt a relative displacement; on rejection the position is unchanged
    pub fn try_move(&mut self, delta: Vec2, around: &Surroundings) -> bool {
        if self.destroyed {
            return false;
        }
        let candidate = self.pos + delta;
        if around.blocks(self, candidate) {
            return false;
        }
        self.pos = candidate;
        true
    }

    pub fn rotate_body(&mut self, delta: f32) {
        if !self.destroyed {
            self.heading += delta;
        }
    }

    /// Snap the turret toward a point
    pub fn aim_at(&mut self, point: Vec2) {
        if !self.destroyed {
            self.turret = angle_to(self.pos, point);
        }
    }

    /// Subtract health (clamped at zero). Returns true on the hit that destroys the tank;
    /// later calls are no-ops.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.destroyed {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health > 0.0 {
            return false;
        }

        self.destroyed = true;
        self.moving = false;
        if let TankRole::Enemy(brain) = &mut self.role {
            brain.state = AiState::Destroyed;
        }
        true
    }

    /// Fire a shell from the turret tip
    ///
    /// The player spends one round of the matching kind and gets nothing when
    /// the counter is empty. Enemies only fire enemy shells and never run dry.
    pub fn shoot(&mut self, kind: ProjectileKind, id: u32, ballistics: &ProjectileTuning) -> Option<Projectile> {
        if self.destroyed {
            return None;
        }

        match &mut self.role {
            TankRole::Player(arsenal) => {
                let ammo = arsenal.ammo_mut(kind)?;
                if *ammo == 0 {
                    return None;
                }
                *ammo -= 1;
            }
            TankRole::Enemy(_) => {
                if kind != ProjectileKind::EnemyStandard {
                    return None;
                }
            }
        }

        Some(Projectile {
            id,
            kind,
            owner: self.id,
            pos: self.pos + heading_vector(self.turret) * self.half_long_axis(),
            angle: self.turret,
            speed: ballistics.speed,
            radius: ballistics.radius,
            damage: ballistics.damage,
            ricochets: 0,
            max_ricochets: ballistics.max_ricochets,
            contacts: Vec::new(),
        })
    }

    /// Whether a shell circle touches this tank's hit circle
    pub fn is_hit_by(&self, projectile: &Projectile) -> bool {
        !self.destroyed && circles_collide(&self.hit_circle_at(self.pos), &projectile.circle())
    }

    /// Whether a rectangle (crate, block) touches this tank's hit circle
    pub fn touches_rect(&self, rect: &Rect) -> bool {
        circle_rect_collide(&self.hit_circle_at(self.pos), rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Loadout, TankTuning, Tuning};
    use proptest::prelude::*;

    fn player_at(x: f32, y: f32) -> Tank {
        Tank::player(1, Vec2::new(x, y), &TankTuning::player(), Loadout::default())
    }

    fn enemy_at(id: u32, x: f32, y: f32) -> Tank {
        Tank::enemy(id, Vec2::new(x, y), 0.0, &TankTuning::enemy(), 100.0)
    }

    fn open_field<'a>(tanks: &'a [Tank], obstacles: &'a [Obstacle]) -> Surroundings<'a> {
        Surroundings {
            bounds: PlayfieldBounds::new(1200.0, 900.0),
            tanks,
            player: None,
            obstacles,
        }
    }

    #[test]
    fn test_move_accepted_in_open_field() {
        let mut tank = player_at(600.0, 450.0);
        assert!(tank.try_move(Vec2::new(2.0, 0.0), &open_field(&[], &[])));
        assert_eq!(tank.pos, Vec2::new(602.0, 450.0));
    }

    #[test]
    fn test_move_rejected_at_boundary_without_slide() {
        // Margin is half the long axis (32.5)
        let mut tank = player_at(33.0, 450.0);
        assert!(!tank.try_move(Vec2::new(-2.0, 1.0), &open_field(&[], &[])));
        assert_eq!(tank.pos, Vec2::new(33.0, 450.0));
    }

    #[test]
    fn test_move_rejected_by_live_tank_only() {
        let mut enemies = vec![enemy_at(2, 660.0, 450.0)];
        let mut tank = player_at(600.0, 450.0);
        // Radii 32.5 + 20 = 52.5; moving to 610 leaves 50 between centers
        assert!(!tank.try_move(Vec2::new(10.0, 0.0), &open_field(&enemies, &[])));

        enemies[0].destroyed = true;
        assert!(tank.try_move(Vec2::new(10.0, 0.0), &open_field(&enemies, &[])));
    }

    #[test]
    fn test_move_rejected_by_obstacle() {
        let obstacles = vec![Obstacle::barrier(9, Vec2::new(630.0, 400.0), Vec2::new(50.0, 50.0), 100.0)];
        let mut tank = player_at(600.0, 450.0);
        // Body spans x ±32.5 and y ±20: at x=600 right edge is 632.5 > 630 and y overlaps 430..470 vs 400..450
        assert!(!tank.try_move(Vec2::ZERO, &open_field(&[], &obstacles)));
        let mut clear = player_at(590.0, 490.0);
        assert!(clear.try_move(Vec2::new(0.0, 1.0), &open_field(&[], &obstacles)));
    }

    #[test]
    fn test_turret_independent_of_body() {
        let mut tank = player_at(100.0, 100.0);
        tank.rotate_body(0.5);
        tank.aim_at(Vec2::new(100.0, 0.0));
        assert!((tank.heading - 0.5).abs() < 1e-6);
        assert!((tank.turret + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_take_damage_flips_destroyed_once() {
        let mut tank = enemy_at(2, 600.0, 150.0);
        assert!(!tank.take_damage(60.0));
        assert!(tank.take_damage(60.0));
        assert_eq!(tank.health, 0.0);
        assert!(tank.destroyed);
        assert_eq!(tank.brain().map(|b| b.state), Some(AiState::Destroyed));
        assert!(!tank.take_damage(10.0));
        assert_eq!(tank.health, 0.0);
    }

    #[test]
    fn test_shoot_spends_ammo_and_spawns_at_turret_tip() {
        let tuning = Tuning::default();
        let mut tank = player_at(100.0, 100.0);
        tank.aim_at(Vec2::new(200.0, 100.0));
        let shell = tank
            .shoot(ProjectileKind::Standard, 7, &tuning.standard)
            .expect("ammo available");
        assert_eq!(shell.owner, tank.id);
        assert!((shell.pos - Vec2::new(132.5, 100.0)).length() < 1e-4);
        assert_eq!(tank.arsenal().map(|a| a.standard_ammo), Some(tuning.loadout.standard_ammo - 1));
    }

    #[test]
    fn test_shoot_with_empty_counter_is_silent() {
        let tuning = Tuning::default();
        let mut tank = Tank::player(
            1,
            Vec2::new(100.0, 100.0),
            &tuning.player,
            Loadout {
                standard_ammo: 0,
                rocket_ammo: 0,
            },
        );
        assert!(tank.shoot(ProjectileKind::Standard, 7, &tuning.standard).is_none());
        assert!(tank.shoot(ProjectileKind::Rocket, 8, &tuning.rocket).is_none());
        assert_eq!(tank.arsenal().map(|a| a.standard_ammo), Some(0));
    }

    #[test]
    fn test_enemy_fires_only_enemy_shells() {
        let tuning = Tuning::default();
        let mut enemy = enemy_at(2, 300.0, 300.0);
        assert!(enemy.shoot(ProjectileKind::Rocket, 5, &tuning.rocket).is_none());
        assert!(enemy.shoot(ProjectileKind::EnemyStandard, 5, &tuning.enemy_standard).is_some());
    }

    proptest! {
        #[test]
        fn prop_health_never_increases(hits in proptest::collection::vec(-50.0f32..80.0, 1..20)) {
            let mut tank = enemy_at(2, 600.0, 150.0);
            let mut destroyed_count = 0;
            for hit in hits {
                let before = tank.health;
                if tank.take_damage(hit) {
                    destroyed_count += 1;
                }
                prop_assert!(tank.health <= before);
                prop_assert!(tank.health >= 0.0 && tank.health <= tank.max_health);
                prop_assert_eq!(tank.destroyed, tank.health <= 0.0);
            }
            prop_assert!(destroyed_count <= 1);
        }

        #[test]
        fn prop_accepted_moves_stay_in_bounds(
            steps in proptest::collection::vec((-3.0f32..3.0, -3.0f32..3.0), 1..200)
        ) {
            let mut tank = player_at(600.0, 450.0);
            let field = open_field(&[], &[]);
            for (dx, dy) in steps {
                if tank.try_move(Vec2::new(dx * 10.0, dy * 10.0), &field) {
                    let rect = tank.footprint_at(tank.pos);
                    prop_assert!(rect.min().x >= 0.0 && rect.min().y >= 0.0);
                    prop_assert!(rect.max().x <= 1200.0 && rect.max().y <= 900.0);
                }
            }
        }
    }
}
