//! Coin and bomb placement
//!
//! New entities enter above the top edge at a random x that keeps a minimum
//! horizontal distance from every coin and the bomb. Placement gives up after
//! a fixed number of draws; the spawn is then skipped for this cycle.

use glam::Vec2;
use rand::Rng;

use super::state::{Bomb, Coin, World};
use crate::consts::*;

/// Which entity a spawn cycle produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawned {
    Coin,
    Bomb,
    /// No valid x found within the attempt budget
    Nothing,
}

/// Whether `x` is inside the side margins and far enough from every coin and
/// the bomb
pub fn is_clear(world: &World, x: f32, margin: f32) -> bool {
    if x < margin || x > world.size.x - margin {
        return false;
    }
    let min_dist = world.metrics.coin_min_dist;
    if world.coins.iter().any(|c| (c.pos.x - x).abs() < min_dist) {
        return false;
    }
    if let Some(bomb) = &world.bomb {
        if (bomb.pos.x - x).abs() < min_dist {
            return false;
        }
    }
    true
}

/// Draw up to [`SPAWN_ATTEMPTS`] candidate x positions, returning the first
/// clear one
pub fn pick_x(world: &mut World, margin: f32) -> Option<f32> {
    let span = world.size.x - 2.0 * margin;
    for _ in 0..SPAWN_ATTEMPTS {
        let x = margin + world.rng.random::<f32>() * span;
        if is_clear(world, x, margin) {
            return Some(x);
        }
    }
    None
}

/// Place a coin above the top edge
pub fn spawn_coin(world: &mut World) -> Spawned {
    if world.coins.len() >= MAX_COINS {
        return Spawned::Nothing;
    }
    let Some(x) = pick_x(world, world.metrics.coin_margin) else {
        log::debug!("Coin spawn skipped: no clear slot");
        return Spawned::Nothing;
    };
    let frame_offset = world.rng.random_range(0..COIN_FRAME_COUNT);
    world.coins.push(Coin {
        pos: Vec2::new(x, -world.metrics.coin_size.y),
        frame_offset,
    });
    Spawned::Coin
}

/// Place the bomb above the top edge (no-op while one is on screen)
pub fn spawn_bomb(world: &mut World) -> Spawned {
    if world.bomb.is_some() {
        return Spawned::Nothing;
    }
    let Some(x) = pick_x(world, world.metrics.bomb_margin) else {
        log::debug!("Bomb spawn skipped: no clear slot");
        return Spawned::Nothing;
    };
    let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
    world.bomb = Some(Bomb {
        pos: Vec2::new(x, -world.metrics.bomb_size.y),
        angle,
    });
    Spawned::Bomb
}

/// One spawn cycle: the bomb with [`BOMB_CHANCE`] when none is on screen,
/// a coin otherwise
pub fn spawn_coin_or_bomb(world: &mut World) -> Spawned {
    if world.bomb.is_none() && world.rng.random_bool(BOMB_CHANCE) {
        spawn_bomb(world)
    } else {
        spawn_coin(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(42, 1000.0, 800.0, 0)
    }

    #[test]
    fn test_is_clear_margins() {
        let w = world();
        assert!(!is_clear(&w, 10.0, 50.0));
        assert!(!is_clear(&w, 990.0, 50.0));
        assert!(is_clear(&w, 500.0, 50.0));
    }

    #[test]
    fn test_is_clear_respects_coins_and_bomb() {
        let mut w = world();
        w.coins.push(Coin {
            pos: Vec2::new(300.0, 0.0),
            frame_offset: 0,
        });
        w.bomb = Some(Bomb {
            pos: Vec2::new(700.0, 0.0),
            angle: 0.0,
        });
        assert!(!is_clear(&w, 350.0, 50.0));
        assert!(!is_clear(&w, 650.0, 50.0));
        assert!(is_clear(&w, 500.0, 50.0));
        assert!(is_clear(&w, 400.0, 50.0));
    }

    #[test]
    fn test_spawn_coin_spacing() {
        let mut w = world();
        for _ in 0..50 {
            spawn_coin(&mut w);
        }
        assert!(w.coins.len() <= MAX_COINS);
        for (i, a) in w.coins.iter().enumerate() {
            assert!(a.pos.y < 0.0);
            assert!(a.frame_offset < COIN_FRAME_COUNT);
            for b in &w.coins[i + 1..] {
                assert!((a.pos.x - b.pos.x).abs() >= w.metrics.coin_min_dist);
            }
        }
    }

    #[test]
    fn test_spawn_skipped_when_no_room() {
        // Playfield narrower than two margins: every draw is rejected
        let mut w = World::new(3, 60.0, 800.0, 0);
        assert_eq!(spawn_coin(&mut w), Spawned::Nothing);
        assert_eq!(spawn_bomb(&mut w), Spawned::Nothing);
        assert!(w.coins.is_empty());
        assert!(w.bomb.is_none());
    }

    #[test]
    fn test_spawn_coin_capacity() {
        let mut w = world();
        for i in 0..MAX_COINS {
            w.coins.push(Coin {
                pos: Vec2::new(i as f32, 0.0),
                frame_offset: 0,
            });
        }
        assert_eq!(spawn_coin(&mut w), Spawned::Nothing);
        assert_eq!(w.coins.len(), MAX_COINS);
    }

    #[test]
    fn test_only_one_bomb() {
        let mut w = world();
        assert_eq!(spawn_bomb(&mut w), Spawned::Bomb);
        let first = w.bomb.map(|b| b.pos);
        assert_eq!(spawn_bomb(&mut w), Spawned::Nothing);
        assert_eq!(w.bomb.map(|b| b.pos), first);
        // With a bomb on screen every cycle picks a coin
        for _ in 0..20 {
            assert_ne!(spawn_coin_or_bomb(&mut w), Spawned::Bomb);
        }
    }

    #[test]
    fn test_bomb_chance_roughly_a_fifth() {
        let mut w = world();
        let mut bombs = 0;
        for _ in 0..2000 {
            w.coins.clear();
            w.bomb = None;
            if spawn_coin_or_bomb(&mut w) == Spawned::Bomb {
                bombs += 1;
            }
        }
        assert!((300..500).contains(&bombs), "bombs = {}", bombs);
    }
}
