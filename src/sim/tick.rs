//! Frame loop step
//!
//! `advance` moves the whole world forward by `dt` seconds. The host calls it
//! at a fixed timestep; the function itself accepts any delta.

use glam::Vec2;
use rand::Rng;

use super::collision::Aabb;
use super::spawn::spawn_coin_or_bomb;
use super::state::{Explosion, GameEvent, GamePhase, Star, World};
use crate::consts::*;

/// Advance the world by `dt` seconds
///
/// Order matters: the ship moves last, so collisions this tick use the
/// ship's position from the previous tick.
pub fn advance(world: &mut World, dt: f32) {
    // The game over frame is static until the next press resets the session
    if world.phase == GamePhase::GameOver {
        return;
    }

    world.clock += dt as f64;

    update_stars(world, dt);
    update_coins(world, dt);
    update_bomb(world, dt);
    update_explosions(world, dt);
    update_ship(world, dt);
}

fn ship_box(world: &World) -> Aabb {
    Aabb::centered(world.ship.pos, world.metrics.ship_size)
}

/// Scroll stars, wrapping the ones that fall off the bottom back to the top
fn update_stars(world: &mut World, dt: f32) {
    if !world.input.moving {
        return;
    }
    let World {
        stars, rng, size, ..
    } = world;
    for star in stars.iter_mut() {
        star.pos.y += SCROLL_SPEED * dt;
        if star.pos.y - star.radius > size.y {
            let x = rng.random::<f32>() * size.x;
            *star = Star::random_at(rng, Vec2::ZERO);
            star.pos = Vec2::new(x, -star.radius);
        }
    }
}

fn update_coins(world: &mut World, dt: f32) {
    // Spin animation runs even while the ship is idle
    world.coin_frame_timer += dt;
    if world.coin_frame_timer > COIN_FRAME_TIME {
        world.coin_frame = (world.coin_frame + 1) % COIN_FRAME_COUNT;
        world.coin_frame_timer = 0.0;
    }

    if !world.input.moving {
        return;
    }

    for coin in &mut world.coins {
        coin.pos.y += SCROLL_SPEED * dt;
    }

    let ship = ship_box(world);
    let coin_size = world.metrics.coin_size;
    let height = world.size.y;
    let mut collected = Vec::new();
    world.coins.retain(|coin| {
        if coin.pos.y - coin_size.y / 2.0 > height {
            return false;
        }
        if Aabb::centered(coin.pos, coin_size).touches(&ship) {
            collected.push(coin.pos);
            return false;
        }
        true
    });
    for pos in collected {
        world.coins_collected += 1;
        let total = world.coins_collected;
        world.emit(GameEvent::CoinCollected { pos, total });
    }

    if world.coins.len() < MAX_COINS {
        let due = world
            .last_spawn
            .is_none_or(|last| world.clock - last > SPAWN_INTERVAL);
        if due {
            spawn_coin_or_bomb(world);
            world.last_spawn = Some(world.clock);
        }
    }
}

fn update_bomb(world: &mut World, dt: f32) {
    let moving = world.input.moving;
    let height = world.size.y;
    let bomb_size = world.metrics.bomb_size;
    let ship = ship_box(world);

    let Some(bomb) = world.bomb.as_mut() else {
        return;
    };
    bomb.angle = (bomb.angle + BOMB_SPIN * dt) % std::f32::consts::TAU;
    if !moving {
        return;
    }

    bomb.pos.y += SCROLL_SPEED * dt;
    if bomb.pos.y - bomb_size.y / 2.0 > height {
        world.bomb = None;
        return;
    }

    if Aabb::centered(bomb.pos, bomb_size).touches(&ship) {
        let pos = bomb.pos;
        handle_bomb_hit(world, pos);
    }
}

/// Bomb reached the ship: explosion, lose a life, maybe end the session
fn handle_bomb_hit(world: &mut World, pos: Vec2) {
    world.explosions.push(Explosion::new(pos));
    world.bomb = None;
    world.lives = world.lives.saturating_sub(1);
    world.emit(GameEvent::BombHit {
        pos,
        lives_left: world.lives,
    });

    if world.lives == 0 {
        if world.coins_collected > world.best {
            world.best = world.coins_collected;
            log::info!("New best: {} coins", world.best);
            world.emit(GameEvent::NewBest { best: world.best });
        }
        world.phase = GamePhase::GameOver;
        log::info!("Game over with {} coins", world.coins_collected);
        world.emit(GameEvent::GameOver {
            coins: world.coins_collected,
        });
    }
}

fn update_explosions(world: &mut World, dt: f32) {
    let moving = world.input.moving;
    for exp in &mut world.explosions {
        if exp.done {
            continue;
        }
        exp.timer += dt;
        if exp.timer > EXPLOSION_FRAME_TIME {
            exp.frame += 1;
            exp.timer = 0.0;
            if exp.frame >= EXPLOSION_FRAMES {
                exp.done = true;
            }
        }
        // Scroll with the background
        if moving {
            exp.pos.y += SCROLL_SPEED * dt;
        }
    }

    let height = world.size.y;
    let half = world.metrics.explosion_size / 2.0;
    world
        .explosions
        .retain(|exp| !exp.done && exp.pos.y - half < height);
}

fn update_ship(world: &mut World, dt: f32) {
    let (min_x, max_x) = world.ship_bounds();
    let target = world.input.target_x;
    world.ship.steer(target, dt, min_x, max_x);
}
