//! Player driving and motion bookkeeping

use super::GameSession;
use super::state::{GameEvent, Tank};
use super::tank::Surroundings;
use crate::heading_vector;

/// Held drive controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveIntent {
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl DriveIntent {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.rotate_left || self.rotate_right
    }
}

/// Record whether a tank moved this tick, raising start/stop events on change
pub(crate) fn note_motion(tank: &mut Tank, moved: bool, events: &mut Vec<GameEvent>) {
    if moved && !tank.moving {
        events.push(GameEvent::TankMoved { tank: tank.id });
    } else if !moved && tank.moving {
        events.push(GameEvent::TankStoppedMoving { tank: tank.id });
    }
    tank.moving = moved;
}

/// Apply held drive controls to the player tank
///
/// Rotation is always accepted. Forward and backward are tried one after the
/// other against the collision oracle; a rejected step leaves the tank where
/// it was (no sliding along walls).
pub fn drive_player(session: &mut GameSession, intent: DriveIntent) {
    let player = &mut session.player;
    if player.destroyed {
        return;
    }

    let before = (player.pos, player.heading);
    if intent.rotate_left {
        player.rotate_body(-player.rotation_speed);
    }
    if intent.rotate_right {
        player.rotate_body(player.rotation_speed);
    }

    let around = Surroundings {
        bounds: session.tuning.playfield,
        tanks: &session.level.enemies,
        player: None,
        obstacles: &session.level.obstacles,
    };
    let step = heading_vector(player.heading) * player.speed;
    if intent.forward {
        player.try_move(step, &around);
    }
    if intent.backward {
        player.try_move(-step, &around);
    }

    let moved = (player.pos, player.heading) != before;
    note_motion(player, moved, &mut session.events);
}
