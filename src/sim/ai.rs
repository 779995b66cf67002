//! Enemy behaviour: seek with wander, back up when stuck, track and shoot
//!
//! Each enemy is updated on a copy and written back, so the collision check
//! can read every other tank (including the earlier-updated ones) without
//! aliasing the one being moved.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::GameSession;
use super::movement::note_motion;
use super::state::{AiState, GameEvent, ProjectileKind, Tank, TankRole};
use super::tank::Surroundings;
use crate::tuning::EnemyAiTuning;
use crate::{angle_to, heading_vector};

/// Advance every live enemy by one tick and let ready ones fire
pub fn update_enemies(session: &mut GameSession) {
    let ai = session.tuning.enemy_ai;
    let bounds = session.tuning.playfield;
    let target = session.player.pos;
    let mut shooters = Vec::new();

    for i in 0..session.level.enemies.len() {
        if session.level.enemies[i].destroyed {
            continue;
        }
        let mut enemy = session.level.enemies[i].clone();
        let around = Surroundings {
            bounds,
            tanks: &session.level.enemies,
            player: Some(&session.player),
            obstacles: &session.level.obstacles,
        };
        let moved = steer(&mut enemy, target, &around, &ai, &mut session.rng);
        note_motion(&mut enemy, moved, &mut session.events);
        enemy.aim_at(target);

        let live = session
            .projectiles
            .iter()
            .filter(|p| p.owner == enemy.id)
            .count();
        if ready_to_fire(&mut enemy, live, &ai) {
            shooters.push(i);
        }
        session.level.enemies[i] = enemy;
    }

    // Spawned after the loop so this tick's shells don't count against others
    for i in shooters {
        let id = session.next_entity_id();
        let enemy = &mut session.level.enemies[i];
        if let Some(shell) = enemy.shoot(ProjectileKind::EnemyStandard, id, &session.tuning.enemy_standard) {
            session.events.push(GameEvent::ShotFired {
                tank: enemy.id,
                kind: ProjectileKind::EnemyStandard,
            });
            session.projectiles.push(shell);
        }
    }
}

/// One step of the movement state machine. Returns true if the tank moved.
fn steer(enemy: &mut Tank, target: Vec2, around: &Surroundings, ai: &EnemyAiTuning, rng: &mut Pcg32) -> bool {
    let Some(brain) = enemy.brain() else {
        return false;
    };
    let (state, target_angle) = (brain.state, brain.target_angle);

    let (next_state, next_target, moved) = match state {
        AiState::Destroyed => return false,
        AiState::Seeking => {
            let diff = target_angle - enemy.heading;
            if diff.abs() > ai.heading_tolerance {
                // Steps by sign of the raw difference, not the shortest arc
                enemy.heading += enemy.rotation_speed * diff.signum();
            }

            let step = heading_vector(enemy.heading) * enemy.speed;
            let moved = enemy.try_move(step, around);
            let next_state = if moved {
                AiState::Seeking
            } else {
                enemy.pos = around.bounds.clamp_inside(&enemy.bounding_box_at(enemy.pos));
                AiState::BackingUp {
                    ticks_left: ai.backup_ticks,
                }
            };

            let wander = enemy.heading + jitter(rng, ai.wander_jitter);
            let toward = angle_to(enemy.pos, target);
            let blended = (1.0 - ai.player_influence) * wander + ai.player_influence * toward;
            (next_state, blended, moved)
        }
        AiState::BackingUp { ticks_left } => {
            // Unconditional reverse, but never past the playfield edge
            enemy.pos -= heading_vector(enemy.heading) * enemy.speed;
            enemy.pos = around.bounds.clamp_inside(&enemy.bounding_box_at(enemy.pos));
            let ticks_left = ticks_left.saturating_sub(1);
            if ticks_left == 0 {
                let fresh = enemy.heading + jitter(rng, std::f32::consts::FRAC_PI_4);
                (AiState::Seeking, fresh, true)
            } else {
                (AiState::BackingUp { ticks_left }, target_angle, true)
            }
        }
    };

    if let TankRole::Enemy(brain) = &mut enemy.role {
        brain.state = next_state;
        brain.target_angle = next_target;
    }
    moved
}

fn jitter(rng: &mut Pcg32, half_width: f32) -> f32 {
    if half_width > 0.0 {
        rng.random_range(-half_width..=half_width)
    } else {
        0.0
    }
}

/// Tick the fire cooldown; true when a shot is due and the live-shell cap allows it
fn ready_to_fire(enemy: &mut Tank, live_shells: usize, ai: &EnemyAiTuning) -> bool {
    let TankRole::Enemy(brain) = &mut enemy.role else {
        return false;
    };
    if brain.fire_cooldown > 0 {
        brain.fire_cooldown -= 1;
    }
    if brain.fire_cooldown > 0 || live_shells >= ai.live_projectile_cap {
        return false;
    }
    brain.fire_cooldown = ai.fire_cooldown_ticks;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::within_bounds;
    use crate::sim::level::LevelDescriptor;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn session_with(level: LevelDescriptor, tuning: Tuning) -> GameSession {
        GameSession::new(vec![level], tuning, 11).expect("valid level")
    }

    fn set_brain(enemy: &mut Tank, state: AiState, target_angle: f32) {
        if let TankRole::Enemy(brain) = &mut enemy.role {
            brain.state = state;
            brain.target_angle = target_angle;
        }
    }

    #[test]
    fn test_seeking_moves_along_heading() {
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 800.0).enemy(600.0, 450.0),
            Tuning::default(),
        );
        session.level.enemies[0].heading = 0.0;
        set_brain(&mut session.level.enemies[0], AiState::Seeking, 0.0);
        update_enemies(&mut session);
        let enemy = &session.level.enemies[0];
        assert!((enemy.pos.x - 601.5).abs() < 1e-4);
        assert_eq!(enemy.brain().map(|b| b.state), Some(AiState::Seeking));
        assert!(enemy.moving);
    }

    #[test]
    fn test_blocked_enemy_backs_up_then_reseeks() {
        // Facing the right wall with a 20px margin: one 1.5px step from 1179 crosses it
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 800.0).enemy(1179.0, 450.0),
            Tuning::default(),
        );
        session.level.enemies[0].heading = 0.0;
        set_brain(&mut session.level.enemies[0], AiState::Seeking, 0.0);

        update_enemies(&mut session);
        let enemy = &session.level.enemies[0];
        assert_eq!(enemy.pos, Vec2::new(1179.0, 450.0));
        assert!(enemy.is_backing_up());
        assert_eq!(
            enemy.brain().map(|b| b.state),
            Some(AiState::BackingUp { ticks_left: 20 })
        );

        for _ in 0..20 {
            update_enemies(&mut session);
        }
        let enemy = &session.level.enemies[0];
        assert!((enemy.pos.x - (1179.0 - 20.0 * 1.5)).abs() < 1e-3);
        let brain = enemy.brain().expect("enemy brain");
        assert_eq!(brain.state, AiState::Seeking);
        assert!((brain.target_angle - enemy.heading).abs() <= std::f32::consts::FRAC_PI_4 + 1e-6);
    }

    #[test]
    fn test_backing_up_against_wall_stays_in_playfield() {
        // Barrier just ahead, left wall just behind
        let mut session = session_with(
            LevelDescriptor::with_spawn(600.0, 800.0)
                .enemy(25.0, 450.0)
                .barrier(46.0, 400.0, 50.0, 100.0),
            Tuning::default(),
        );
        session.level.enemies[0].heading = 0.0;
        set_brain(&mut session.level.enemies[0], AiState::Seeking, 0.0);
        let bounds = session.tuning.playfield;

        update_enemies(&mut session);
        assert!(session.level.enemies[0].is_backing_up());

        for _ in 0..3000 {
            update_enemies(&mut session);
            let enemy = &session.level.enemies[0];
            assert!(
                within_bounds(&enemy.bounding_box_at(enemy.pos), bounds),
                "enemy left the playfield at {:?}",
                enemy.pos
            );
        }
    }

    #[test]
    fn test_rotation_steps_by_sign_not_shortest_arc() {
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 800.0).enemy(600.0, 450.0),
            Tuning::default(),
        );
        session.level.enemies[0].heading = 3.0;
        set_brain(&mut session.level.enemies[0], AiState::Seeking, -3.0);
        update_enemies(&mut session);
        assert!((session.level.enemies[0].heading - 2.97).abs() < 1e-5);
    }

    #[test]
    fn test_pure_pursuit_target() {
        let mut tuning = Tuning::default();
        tuning.enemy_ai.player_influence = 1.0;
        let mut session = session_with(
            LevelDescriptor::with_spawn(600.0, 800.0).enemy(600.0, 300.0),
            tuning,
        );
        session.level.enemies[0].heading = std::f32::consts::FRAC_PI_2;
        set_brain(&mut session.level.enemies[0], AiState::Seeking, std::f32::consts::FRAC_PI_2);
        update_enemies(&mut session);
        let enemy = &session.level.enemies[0];
        let brain = enemy.brain().expect("enemy brain");
        assert!((brain.target_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((enemy.turret - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_turret_tracks_player_while_backing_up() {
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 450.0).enemy(600.0, 450.0),
            Tuning::default(),
        );
        session.level.enemies[0].heading = 0.0;
        set_brain(&mut session.level.enemies[0], AiState::BackingUp { ticks_left: 5 }, 0.0);
        update_enemies(&mut session);
        let enemy = &session.level.enemies[0];
        assert!((enemy.turret.abs() - std::f32::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_fire_respects_cooldown_and_live_cap() {
        let mut tuning = Tuning::default();
        tuning.enemy_ai.fire_cooldown_ticks = 3;
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 800.0).enemy(600.0, 450.0),
            tuning,
        );

        for _ in 0..2 {
            update_enemies(&mut session);
        }
        assert!(session.projectiles.is_empty());
        update_enemies(&mut session);
        assert_eq!(session.projectiles.len(), 1);
        assert_eq!(session.projectiles[0].kind, ProjectileKind::EnemyStandard);

        // Cooldown elapses again, but one shell is still live
        for _ in 0..5 {
            update_enemies(&mut session);
        }
        assert_eq!(session.projectiles.len(), 1);

        session.projectiles.clear();
        update_enemies(&mut session);
        assert_eq!(session.projectiles.len(), 1);
    }

    #[test]
    fn test_destroyed_enemy_is_inert() {
        let mut session = session_with(
            LevelDescriptor::with_spawn(100.0, 800.0).enemy(600.0, 450.0),
            Tuning::default(),
        );
        session.level.enemies[0].take_damage(1000.0);
        let before = session.level.enemies[0].pos;
        for _ in 0..200 {
            update_enemies(&mut session);
        }
        assert_eq!(session.level.enemies[0].pos, before);
        assert!(session.projectiles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_enemies_stay_in_playfield(
            x in 25.0f32..1175.0,
            y in 25.0f32..875.0,
            heading in -std::f32::consts::PI..std::f32::consts::PI,
        ) {
            let mut session = session_with(
                LevelDescriptor::with_spawn(600.0, 450.0).enemy(x, y),
                Tuning::default(),
            );
            session.level.enemies[0].heading = heading;
            let bounds = session.tuning.playfield;
            for _ in 0..600 {
                update_enemies(&mut session);
                let enemy = &session.level.enemies[0];
                prop_assert!(within_bounds(&enemy.bounding_box_at(enemy.pos), bounds));
            }
        }
    }
}
