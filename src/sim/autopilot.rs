//! Demo-mode autopilot
//!
//! Plays the game through the same pointer operations a player would use:
//! dodge the bomb when it is about to land on the ship, otherwise chase the
//! lowest coin that is still above the ship.

use super::state::{GamePhase, World};

/// Extra clearance kept from the bomb when dodging (px)
const DODGE_CLEARANCE: f32 = 20.0;
/// Bombs further above the ship than this are ignored (px)
const THREAT_RANGE: f32 = 260.0;

/// Pick a target x for the ship, or `None` to hold position
pub fn steer(world: &World) -> Option<f32> {
    let ship = world.ship.pos;
    let ship_half = world.metrics.ship_size.x / 2.0;

    if let Some(bomb) = &world.bomb {
        let bomb_half = world.metrics.bomb_size.x / 2.0;
        let above = ship.y - bomb.pos.y;
        let reach = ship_half + bomb_half + DODGE_CLEARANCE;
        if (0.0..THREAT_RANGE).contains(&above) && (bomb.pos.x - ship.x).abs() < reach {
            // Step to whichever side of the bomb has more room
            let (min, max) = world.ship_bounds();
            let left = bomb.pos.x - reach;
            let right = bomb.pos.x + reach;
            let target = if left >= min && (right > max || ship.x <= bomb.pos.x) {
                left
            } else {
                right
            };
            return Some(world.clamp_ship_x(target));
        }
    }

    world
        .coins
        .iter()
        .filter(|c| c.pos.y < ship.y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|c| world.clamp_ship_x(c.pos.x))
}

/// Apply the autopilot's decision as pointer input
///
/// Keeps the pointer pressed the whole time, and presses again to restart
/// after game over.
pub fn drive(world: &mut World) {
    if world.phase == GamePhase::GameOver {
        world.pointer_down(world.ship.pos.x);
        return;
    }
    let target = steer(world).unwrap_or(world.ship.pos.x);
    if world.input.controlling {
        world.pointer_move(target);
    } else {
        world.pointer_down(target);
    }
}
