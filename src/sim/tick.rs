//! Fixed timestep simulation tick
//!
//! One call advances the session by one step (one animation frame). All
//! speeds and timers are expressed per tick, so there is no `dt`.

use glam::Vec2;

use super::GameSession;
use super::ai::update_enemies;
use super::combat::{collect_pickups, spawn_pickups, update_explosions};
use super::movement::{DriveIntent, drive_player};
use super::projectile::update_projectiles;
use super::state::{GameEvent, GamePhase, ProjectileKind};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drive controls (held)
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// Pointer position for the turret
    pub aim_at: Option<Vec2>,
    /// Fire the selected shell kind
    pub fire: bool,
    /// Switch the selected shell kind
    pub select_kind: Option<ProjectileKind>,
    /// Start over from level 1
    pub reset: bool,
}

impl TickInput {
    pub fn drive(&self) -> DriveIntent {
        DriveIntent {
            forward: self.forward,
            backward: self.backward,
            rotate_left: self.rotate_left,
            rotate_right: self.rotate_right,
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput) {
    session.events.clear();

    if input.reset {
        session.reset();
        return;
    }

    match session.phase {
        GamePhase::GameOver => return,
        GamePhase::LevelClear => {
            session.clear_ticks = session.clear_ticks.saturating_sub(1);
            if session.clear_ticks == 0 {
                session.advance_level();
            }
            return;
        }
        GamePhase::Playing => {}
    }

    session.time_ticks += 1;

    if let Some(kind) = input.select_kind {
        select_kind(session, kind);
    }

    // Held keys from before a level change are ignored until let go
    let mut drive = input.drive();
    if session.awaiting_input_release {
        if drive.any() {
            drive = DriveIntent::default();
        } else {
            session.awaiting_input_release = false;
        }
    }
    if drive.any() {
        session.player_has_moved = true;
    }
    drive_player(session, drive);

    if let Some(point) = input.aim_at {
        session.player.aim_at(point);
    }
    if input.fire {
        let selected = session.player.arsenal().map(|a| a.selected);
        if let Some(kind) = selected {
            fire(session, kind);
        }
    }

    if session.player_has_moved {
        update_enemies(session);
        update_projectiles(session);
    }
    update_explosions(&mut session.explosions);
    collect_pickups(session);
    spawn_pickups(session);

    check_outcome(session);
}

/// Make `kind` the shell fired by the fire command; enemy shells are not selectable
pub fn select_kind(session: &mut GameSession, kind: ProjectileKind) {
    let Some(arsenal) = session.player.arsenal_mut() else {
        return;
    };
    if arsenal.ammo_mut(kind).is_some() {
        arsenal.selected = kind;
    }
}

/// Fire one player shell of `kind`. An empty counter is a silent no-op.
pub fn fire(session: &mut GameSession, kind: ProjectileKind) -> bool {
    if session.phase != GamePhase::Playing {
        return false;
    }
    let id = session.next_entity_id();
    let ballistics = *session.tuning.projectile(kind);
    let Some(shell) = session.player.shoot(kind, id, &ballistics) else {
        return false;
    };
    session.events.push(GameEvent::ShotFired {
        tank: session.player.id,
        kind,
    });
    session.projectiles.push(shell);
    true
}

/// Loss is checked before the win so a mutual kill ends the game
fn check_outcome(session: &mut GameSession) {
    if session.player.destroyed {
        session.phase = GamePhase::GameOver;
        session.events.push(GameEvent::GameOver);
        log::info!(
            "Game over on level {} after {} ticks",
            session.level.index + 1,
            session.time_ticks
        );
        return;
    }

    if session.level.is_cleared() {
        let level = session.level.index as u32 + 1;
        session.phase = GamePhase::LevelClear;
        session.clear_ticks = session.tuning.level_clear_ticks;
        session.events.push(GameEvent::LevelCleared { level });
        log::info!("Level {} cleared", level);
    }
}
