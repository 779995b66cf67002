//! Combat resolution: obstacle impacts, pickups and explosion timers

use glam::Vec2;
use rand::Rng;

use super::GameSession;
use super::collision::Rect;
use super::state::{Explosion, GameEvent, Obstacle, ObstacleKind, Pickup, PickupKind, Projectile};
use crate::normalize_angle;

/// What an obstacle did to the shell that struck it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleHit {
    /// Shell bounced and keeps flying
    Ricochet,
    /// Shell is used up
    Absorbed,
}

/// Apply one new contact between a shell and a live obstacle
///
/// Barriers take damage first; a surviving barrier reflects the shell when
/// its ricochet budget allows. Rubble never reflects and counts hits.
pub fn resolve_obstacle_hit(obstacle: &mut Obstacle, projectile: &mut Projectile) -> ObstacleHit {
    let rect = obstacle.rect();
    match &mut obstacle.kind {
        ObstacleKind::Barrier { health, .. } => {
            *health = (*health - projectile.damage.max(0.0)).max(0.0);
            if *health <= 0.0 {
                obstacle.destroyed = true;
                return ObstacleHit::Absorbed;
            }
            if projectile.ricochets >= projectile.max_ricochets {
                return ObstacleHit::Absorbed;
            }
            reflect_off_rect(projectile, &rect);
            projectile.ricochets += 1;
            log::trace!(
                "Shell {} ricocheted off obstacle {} ({}/{})",
                projectile.id,
                obstacle.id,
                projectile.ricochets,
                projectile.max_ricochets
            );
            ObstacleHit::Ricochet
        }
        ObstacleKind::Rubble { hits_taken, hit_limit } => {
            *hits_taken += 1;
            if *hits_taken >= *hit_limit {
                obstacle.destroyed = true;
            }
            ObstacleHit::Absorbed
        }
    }
}

/// Mirror the direction against the face that was struck
///
/// Inside the horizontal span the shell hit a top/bottom face, inside the
/// vertical span a side face; otherwise it clipped a corner and turns back.
fn reflect_off_rect(projectile: &mut Projectile, rect: &Rect) {
    let (min, max) = (rect.min(), rect.max());
    let p = projectile.pos;
    let angle = if p.x >= min.x && p.x <= max.x {
        -projectile.angle
    } else if p.y >= min.y && p.y <= max.y {
        std::f32::consts::PI - projectile.angle
    } else {
        projectile.angle + std::f32::consts::PI
    };
    projectile.angle = normalize_angle(angle);
}

/// Hand every pickup the player touches to the player's arsenal
pub fn collect_pickups(session: &mut GameSession) {
    let player = &mut session.player;
    if player.destroyed {
        return;
    }

    let mut taken = Vec::new();
    for pickup in &session.level.pickups {
        if !player.touches_rect(&pickup.rect()) {
            continue;
        }
        let Some(arsenal) = player.arsenal_mut() else {
            break;
        };
        if let Some(counter) = arsenal.ammo_mut(pickup.kind.ammo_kind()) {
            *counter += pickup.amount;
        }
        taken.push(pickup.id);
        session.events.push(GameEvent::PickupCollected {
            kind: pickup.kind,
            amount: pickup.amount,
        });
        log::debug!("Collected {:?} (+{})", pickup.kind, pickup.amount);
    }

    if !taken.is_empty() {
        session.level.pickups.retain(|p| !taken.contains(&p.id));
    }
}

/// Periodic crate drop while the level is being played
pub fn spawn_pickups(session: &mut GameSession) {
    session.pickup_timer += 1;
    if session.pickup_timer < session.tuning.pickups.spawn_interval_ticks {
        return;
    }
    session.pickup_timer = 0;

    let odds = session.tuning.pickups;
    if session.level.pickups.len() >= odds.cap {
        return;
    }

    let kind = if session.rng.random_bool(odds.ammo_pack_chance.clamp(0.0, 1.0)) {
        PickupKind::AmmoPack
    } else if session.rng.random_bool(odds.rocket_pack_chance.clamp(0.0, 1.0)) {
        PickupKind::RocketAmmoPack
    } else {
        return;
    };

    let (w, h) = odds.size_of(kind);
    let bounds = session.tuning.playfield;
    let pos = Vec2::new(
        random_coord(&mut session.rng, w * 0.5, bounds.width - w * 0.5),
        random_coord(&mut session.rng, h * 0.5, bounds.height - h * 0.5),
    );
    let id = session.next_entity_id();
    session.level.pickups.push(Pickup {
        id,
        kind,
        pos,
        size: Vec2::new(w, h),
        amount: odds.ammo_amount,
    });
    session.events.push(GameEvent::PickupSpawned { kind });
    log::debug!("Spawned {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
}

fn random_coord(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { (lo + hi) * 0.5 }
}

/// Start a rocket blast at an impact point
pub fn spawn_explosion(session: &mut GameSession, pos: Vec2) {
    let id = session.next_entity_id();
    let tuning = session.tuning.explosion;
    session.explosions.push(Explosion {
        id,
        pos,
        radius: 0.0,
        max_radius: tuning.max_radius,
        duration: tuning.duration_ticks,
        life: 0,
    });
    session.events.push(GameEvent::ExplosionSpawned { x: pos.x, y: pos.y });
    log::debug!("Explosion at ({:.0}, {:.0})", pos.x, pos.y);
}

/// Grow explosions and drop the finished ones
pub fn update_explosions(explosions: &mut Vec<Explosion>) {
    for explosion in explosions.iter_mut() {
        explosion.life += 1;
        explosion.radius = if explosion.duration > 0 {
            explosion.max_radius * (explosion.life as f32 / explosion.duration as f32).min(1.0)
        } else {
            explosion.max_radius
        };
    }
    explosions.retain(|e| !e.is_over());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelDescriptor;
    use crate::sim::state::ProjectileKind;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn shell_at(pos: Vec2, angle: f32, damage: f32, max_ricochets: u32) -> Projectile {
        Projectile {
            id: 1,
            kind: ProjectileKind::Standard,
            owner: 99,
            pos,
            angle,
            speed: 5.0,
            radius: 5.0,
            damage,
            ricochets: 0,
            max_ricochets,
            contacts: Vec::new(),
        }
    }

    fn barrier() -> Obstacle {
        Obstacle::barrier(7, Vec2::new(500.0, 150.0), Vec2::new(50.0, 50.0), 100.0)
    }

    #[test]
    fn test_barrier_side_hit_mirrors_horizontally() {
        let mut block = barrier();
        let mut shell = shell_at(Vec2::new(497.0, 175.0), 0.0, 10.0, 1);
        assert_eq!(resolve_obstacle_hit(&mut block, &mut shell), ObstacleHit::Ricochet);
        assert!((shell.angle.abs() - PI).abs() < 1e-5);
        assert_eq!(shell.ricochets, 1);
        assert!(matches!(block.kind, ObstacleKind::Barrier { health, .. } if health == 90.0));
    }

    #[test]
    fn test_barrier_top_hit_mirrors_vertically() {
        let mut block = barrier();
        let mut shell = shell_at(Vec2::new(520.0, 147.0), 1.0, 10.0, 1);
        resolve_obstacle_hit(&mut block, &mut shell);
        assert!((shell.angle + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_barrier_corner_hit_reverses() {
        let mut block = barrier();
        let mut shell = shell_at(Vec2::new(498.0, 148.0), PI / 4.0, 10.0, 1);
        resolve_obstacle_hit(&mut block, &mut shell);
        assert!((shell.angle - normalize_angle(PI / 4.0 + PI)).abs() < 1e-5);
    }

    #[test]
    fn test_barrier_absorbs_when_budget_spent() {
        let mut block = barrier();
        let mut rocket = shell_at(Vec2::new(497.0, 175.0), 0.0, 25.0, 0);
        assert_eq!(resolve_obstacle_hit(&mut block, &mut rocket), ObstacleHit::Absorbed);
        assert_eq!(rocket.angle, 0.0);
        assert!(!block.destroyed);
    }

    #[test]
    fn test_barrier_destroying_hit_does_not_reflect() {
        let mut block = Obstacle::barrier(7, Vec2::new(500.0, 150.0), Vec2::new(50.0, 50.0), 10.0);
        let mut shell = shell_at(Vec2::new(497.0, 175.0), 0.0, 10.0, 1);
        assert_eq!(resolve_obstacle_hit(&mut block, &mut shell), ObstacleHit::Absorbed);
        assert!(block.destroyed);
        assert_eq!(shell.ricochets, 0);
    }

    #[test]
    fn test_rubble_falls_on_exact_hit_limit() {
        let mut rubble = Obstacle::rubble(3, Vec2::new(300.0, 300.0), Vec2::new(50.0, 50.0), 2);
        let mut first = shell_at(Vec2::new(297.0, 325.0), 0.0, 10.0, 1);
        assert_eq!(resolve_obstacle_hit(&mut rubble, &mut first), ObstacleHit::Absorbed);
        assert!(!rubble.destroyed);
        assert_eq!(first.ricochets, 0);

        let mut second = shell_at(Vec2::new(297.0, 325.0), 0.0, 10.0, 1);
        assert_eq!(resolve_obstacle_hit(&mut rubble, &mut second), ObstacleHit::Absorbed);
        assert!(rubble.destroyed);
    }

    #[test]
    fn test_pickup_credits_matching_counter() {
        let level = LevelDescriptor::with_spawn(200.0, 200.0)
            .enemy(900.0, 700.0)
            .pickup(PickupKind::RocketAmmoPack, 220.0, 200.0)
            .pickup(PickupKind::AmmoPack, 800.0, 200.0);
        let mut session = GameSession::new(vec![level], Tuning::default(), 5).expect("valid level");
        let rockets_before = session.player.arsenal().map_or(0, |a| a.rocket_ammo);
        let standard_before = session.player.arsenal().map_or(0, |a| a.standard_ammo);

        collect_pickups(&mut session);

        let arsenal = session.player.arsenal().expect("player arsenal");
        assert_eq!(arsenal.rocket_ammo, rockets_before + 5);
        assert_eq!(arsenal.standard_ammo, standard_before);
        assert_eq!(session.level.pickups.len(), 1);
        assert_eq!(session.level.pickups[0].kind, PickupKind::AmmoPack);
    }

    #[test]
    fn test_spawner_respects_interval_and_cap() {
        let mut tuning = Tuning::default();
        tuning.pickups.spawn_interval_ticks = 2;
        tuning.pickups.ammo_pack_chance = 1.0;
        tuning.pickups.cap = 2;
        let level = LevelDescriptor::with_spawn(200.0, 200.0).enemy(900.0, 700.0);
        let mut session = GameSession::new(vec![level], tuning, 5).expect("valid level");

        spawn_pickups(&mut session);
        assert!(session.level.pickups.is_empty());
        spawn_pickups(&mut session);
        assert_eq!(session.level.pickups.len(), 1);

        for _ in 0..10 {
            spawn_pickups(&mut session);
        }
        assert_eq!(session.level.pickups.len(), 2);
        for pickup in &session.level.pickups {
            let rect = pickup.rect();
            assert!(rect.min().x >= 0.0 && rect.max().x <= 1200.0);
            assert!(rect.min().y >= 0.0 && rect.max().y <= 900.0);
        }
    }

    #[test]
    fn test_explosion_grows_then_expires() {
        let mut explosions = vec![Explosion {
            id: 1,
            pos: Vec2::new(10.0, 10.0),
            radius: 0.0,
            max_radius: 30.0,
            duration: 30,
            life: 0,
        }];
        for _ in 0..15 {
            update_explosions(&mut explosions);
        }
        assert!((explosions[0].radius - 15.0).abs() < 1e-4);
        for _ in 0..15 {
            update_explosions(&mut explosions);
        }
        assert!(explosions.is_empty());
    }

    proptest! {
        #[test]
        fn prop_barrier_health_never_increases(damages in proptest::collection::vec(0.0f32..40.0, 1..30)) {
            let mut block = barrier();
            let mut last = 100.0;
            let mut was_destroyed = false;
            for damage in damages {
                if block.destroyed {
                    break;
                }
                let mut shell = shell_at(Vec2::new(497.0, 175.0), 0.0, damage, 1);
                resolve_obstacle_hit(&mut block, &mut shell);
                let ObstacleKind::Barrier { health, .. } = block.kind else {
                    unreachable!()
                };
                prop_assert!(health <= last);
                prop_assert_eq!(block.destroyed, health <= 0.0);
                prop_assert!(!(was_destroyed && !block.destroyed));
                was_destroyed = block.destroyed;
                last = health;
            }
        }
    }
}
