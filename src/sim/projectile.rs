//! Projectile physics
//!
//! Per shell and per tick, in this order: integrate, playfield edges,
//! obstacles, tanks of the opposing side, then the out-of-field safety net.
//! A shell used up by one step skips the rest. Removals are collected and
//! applied once the pass is over.

use super::GameSession;
use super::collision::{PlayfieldBounds, circle_rect_collide};
use super::combat::{ObstacleHit, resolve_obstacle_hit, spawn_explosion};
use super::state::{GameEvent, Obstacle, Projectile, ProjectileKind, Side, Tank};
use crate::{heading_vector, normalize_angle};

/// Advance every live shell by one tick
pub fn update_projectiles(session: &mut GameSession) {
    let bounds = session.tuning.playfield;
    let mut spent = Vec::new();
    let mut blasts = Vec::new();

    for shell in session.projectiles.iter_mut() {
        shell.pos += heading_vector(shell.angle) * shell.speed;

        if !bounce_off_walls(shell, bounds) {
            spent.push(shell.id);
            continue;
        }

        if hit_obstacles(shell, &mut session.level.obstacles) == ObstacleHit::Absorbed {
            spent.push(shell.id);
            continue;
        }

        let struck = match shell.side() {
            Side::Player => strike(shell, session.level.enemies.iter_mut(), &mut session.events),
            Side::Enemy => strike(shell, std::iter::once(&mut session.player), &mut session.events),
        };
        if struck {
            if shell.kind == ProjectileKind::Rocket {
                blasts.push(shell.pos);
            }
            spent.push(shell.id);
            continue;
        }

        if !bounds.contains(shell.pos) {
            spent.push(shell.id);
        }
    }

    if !spent.is_empty() {
        session.projectiles.retain(|p| !spent.contains(&p.id));
    }
    for pos in blasts {
        spawn_explosion(session, pos);
    }

    for obstacle in session.level.obstacles.iter().filter(|o| o.destroyed) {
        session.events.push(GameEvent::ObstacleDestroyed { obstacle: obstacle.id });
        log::debug!("Obstacle {} destroyed", obstacle.id);
    }
    session.level.obstacles.retain(|o| !o.destroyed);
}

/// Reflect off the playfield edges. Returns false when the shell is used up.
///
/// An edge only counts while the shell is heading out through it, so a shell
/// still overlapping the edge after bouncing is not hit again.
fn bounce_off_walls(shell: &mut Projectile, bounds: PlayfieldBounds) -> bool {
    let dir = heading_vector(shell.angle);
    let (p, r) = (shell.pos, shell.radius);
    let hit_x = (p.x - r <= 0.0 && dir.x < 0.0) || (p.x + r >= bounds.width && dir.x > 0.0);
    let hit_y = (p.y - r <= 0.0 && dir.y < 0.0) || (p.y + r >= bounds.height && dir.y > 0.0);

    if hit_x {
        if !spend_ricochet(shell) {
            return false;
        }
        shell.angle = normalize_angle(std::f32::consts::PI - shell.angle);
    }
    if hit_y {
        if !spend_ricochet(shell) {
            return false;
        }
        shell.angle = normalize_angle(-shell.angle);
    }
    true
}

fn spend_ricochet(shell: &mut Projectile) -> bool {
    if shell.ricochets >= shell.max_ricochets {
        return false;
    }
    shell.ricochets += 1;
    log::trace!(
        "Shell {} ricocheted off the edge ({}/{})",
        shell.id,
        shell.ricochets,
        shell.max_ricochets
    );
    true
}

/// Resolve contacts with live obstacles the shell has just entered
fn hit_obstacles(shell: &mut Projectile, obstacles: &mut [Obstacle]) -> ObstacleHit {
    let mut touching = Vec::new();
    let mut outcome = ObstacleHit::Ricochet;

    for obstacle in obstacles.iter_mut().filter(|o| !o.destroyed) {
        if !circle_rect_collide(&shell.circle(), &obstacle.rect()) {
            continue;
        }
        touching.push(obstacle.id);
        if shell.contacts.contains(&obstacle.id) {
            continue;
        }
        if resolve_obstacle_hit(obstacle, shell) == ObstacleHit::Absorbed {
            outcome = ObstacleHit::Absorbed;
            break;
        }
    }

    shell.contacts = touching;
    outcome
}

/// Damage the first live target the shell overlaps
fn strike<'a>(
    shell: &Projectile,
    targets: impl Iterator<Item = &'a mut Tank>,
    events: &mut Vec<GameEvent>,
) -> bool {
    for tank in targets {
        if !tank.is_hit_by(shell) {
            continue;
        }
        if tank.take_damage(shell.damage) {
            events.push(GameEvent::TankDestroyed {
                tank: tank.id,
                side: tank.side(),
            });
            log::debug!("{:?} tank {} destroyed by shell {}", tank.side(), tank.id, shell.id);
        }
        return true;
    }
    false
}
