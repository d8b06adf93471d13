//! World state and entity types
//!
//! Everything the frame loop reads or writes lives in [`World`]; there is no
//! module-level state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::{Metrics, hex_color, soft_clamp};

/// Star palette
pub const STAR_COLORS: [&str; 6] = [
    "#ffffff", // white
    "#ffe9c4", // warm white
    "#d4fbff", // blueish
    "#ffd700", // yellow
    "#ffb6c1", // pink
    "#b0e0e6", // pale blue
];

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Out of lives; waiting for a pointer press to restart
    GameOver,
}

/// Things that happened during a tick, drained by the host for sound and
/// persistence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A fresh session started (initial or after game over)
    SessionStarted,
    /// Ship picked up a coin
    CoinCollected { pos: Vec2, total: u32 },
    /// Ship touched the bomb
    BombHit { pos: Vec2, lives_left: u8 },
    /// Session ended with a better result than the stored best
    NewBest { best: u32 },
    /// Out of lives
    GameOver { coins: u32 },
}

/// Background star (purely cosmetic)
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

impl Star {
    /// A star with random radius and color at the given position
    pub fn random_at(rng: &mut impl Rng, pos: Vec2) -> Self {
        let radius = STAR_MIN_RADIUS + rng.random::<f32>() * (STAR_MAX_RADIUS - STAR_MIN_RADIUS);
        let color = STAR_COLORS[rng.random_range(0..STAR_COLORS.len())];
        Self {
            pos,
            radius,
            color: hex_color(color, STAR_ALPHA),
        }
    }
}

/// A collectible coin
#[derive(Debug, Clone, Copy)]
pub struct Coin {
    pub pos: Vec2,
    /// Offset into the shared spin animation so coins don't spin in sync
    pub frame_offset: u32,
}

impl Coin {
    /// Animation frame to draw given the shared frame counter
    pub fn frame(&self, shared_frame: u32) -> u32 {
        (self.frame_offset + shared_frame) % COIN_FRAME_COUNT
    }
}

/// The hazard
#[derive(Debug, Clone, Copy)]
pub struct Bomb {
    pub pos: Vec2,
    /// Rotation (radians)
    pub angle: f32,
}

/// Explosion animation left behind by a bomb hit
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub pos: Vec2,
    pub frame: u32,
    /// Time since the last frame change (seconds)
    pub timer: f32,
    pub done: bool,
}

impl Explosion {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            frame: 0,
            timer: 0.0,
            done: false,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Copy)]
pub struct Ship {
    pub pos: Vec2,
    /// Horizontal velocity (px/s)
    pub vx: f32,
}

impl Ship {
    /// Ship centred horizontally at its fixed ride height
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(width / 2.0, height * SHIP_Y_FRACTION),
            vx: 0.0,
        }
    }

    /// Move toward `target` (or coast to a stop without one), then clamp
    /// into `[min_x, max_x]`
    pub fn steer(&mut self, target: Option<f32>, dt: f32, min_x: f32, max_x: f32) {
        match target {
            Some(target) => {
                let dx = target - self.pos.x;
                if dx.abs() > SHIP_STOP_DIST {
                    let dir = dx.signum();
                    self.vx += dir * SHIP_ACCEL * dt;
                    if self.vx.abs() > SHIP_MAX_SPEED {
                        self.vx = dir * SHIP_MAX_SPEED;
                    }
                } else {
                    // Close enough: kill velocity fast and settle on the target
                    self.vx *= SHIP_HEAVY_DAMPING;
                    if self.vx.abs() < SHIP_SNAP_SPEED {
                        self.vx = 0.0;
                        self.pos.x = target;
                    }
                }
            }
            None => {
                self.vx *= SHIP_DAMPING;
                if self.vx.abs() < SHIP_SNAP_SPEED {
                    self.vx = 0.0;
                }
            }
        }

        self.pos.x += self.vx * dt;
        self.pos.x = soft_clamp(self.pos.x, min_x, max_x);
    }
}

/// Pointer-driven control state, written by input handlers between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Pointer is held on the canvas
    pub controlling: bool,
    /// Background scrolls (and spawning/collisions run) only while moving
    pub moving: bool,
    /// Clamped target x for the ship
    pub target_x: Option<f32>,
}

/// Complete game world
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Viewport size (CSS pixels)
    pub size: Vec2,
    pub metrics: Metrics,
    /// Star density multiplier (quality setting)
    pub star_density: f32,

    pub stars: Vec<Star>,
    pub coins: Vec<Coin>,
    pub bomb: Option<Bomb>,
    pub explosions: Vec<Explosion>,
    pub ship: Ship,

    pub input: InputState,
    pub phase: GamePhase,
    pub lives: u8,
    pub coins_collected: u32,
    /// Best coins collected over all sessions
    pub best: u32,

    /// Simulation clock (seconds since the world was created)
    pub clock: f64,
    /// Clock value of the previous spawn attempt
    pub last_spawn: Option<f64>,
    /// Shared coin animation frame
    pub coin_frame: u32,
    pub(crate) coin_frame_timer: f32,

    events: Vec<GameEvent>,
}

impl World {
    /// Create a world for a `width` x `height` viewport with a stored best
    pub fn new(seed: u64, width: f32, height: f32, best: u32) -> Self {
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            size: Vec2::new(width, height),
            metrics: Metrics::for_viewport(width),
            star_density: 1.0,
            stars: Vec::new(),
            coins: Vec::new(),
            bomb: None,
            explosions: Vec::new(),
            ship: Ship::centered(width, height),
            input: InputState::default(),
            phase: GamePhase::Playing,
            lives: MAX_LIVES,
            coins_collected: 0,
            best,
            clock: 0.0,
            last_spawn: None,
            coin_frame: 0,
            coin_frame_timer: 0.0,
            events: vec![GameEvent::SessionStarted],
        };
        world.generate_stars();
        world
    }

    /// Change the star density multiplier and regenerate the field
    pub fn set_star_density(&mut self, density: f32) {
        self.star_density = density.max(0.0);
        self.generate_stars();
    }

    /// Scatter a fresh star field over the whole viewport
    pub fn generate_stars(&mut self) {
        let area = self.size.x * self.size.y;
        let count = (area * STAR_DENSITY * self.star_density).floor().max(0.0) as usize;
        let size = self.size;
        self.stars = (0..count)
            .map(|_| {
                let pos = Vec2::new(
                    self.rng.random::<f32>() * size.x,
                    self.rng.random::<f32>() * size.y,
                );
                Star::random_at(&mut self.rng, pos)
            })
            .collect();
    }

    /// Viewport changed: new star field, ship back to the centre
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.metrics = Metrics::for_viewport(width);
        self.generate_stars();
        self.ship = Ship::centered(width, height);
        log::info!("World resized to {}x{}", width, height);
    }

    /// Start a new session, keeping the star field and the best score
    pub fn reset(&mut self) {
        self.coins.clear();
        self.bomb = None;
        self.explosions.clear();
        self.ship = Ship::centered(self.size.x, self.size.y);
        self.input = InputState::default();
        self.phase = GamePhase::Playing;
        self.lives = MAX_LIVES;
        self.coins_collected = 0;
        self.last_spawn = None;
        self.events.push(GameEvent::SessionStarted);
        log::info!("New session started (best: {})", self.best);
    }

    /// Allowed ship centre range for the current viewport
    pub fn ship_bounds(&self) -> (f32, f32) {
        let half = self.metrics.ship_size.x / 2.0;
        let margin = self.metrics.ship_margin;
        (margin + half, self.size.x - margin - half)
    }

    pub fn clamp_ship_x(&self, x: f32) -> f32 {
        let (min, max) = self.ship_bounds();
        soft_clamp(x, min, max)
    }

    /// Pointer pressed at screen x
    ///
    /// After game over the press restarts the session instead of taking
    /// control.
    pub fn pointer_down(&mut self, x: f32) {
        if self.phase == GamePhase::GameOver {
            self.reset();
            return;
        }
        self.input.moving = true;
        self.input.controlling = true;
        self.input.target_x = Some(self.clamp_ship_x(x));
    }

    /// Pointer moved to screen x (only steers while pressed)
    pub fn pointer_move(&mut self, x: f32) {
        if !self.input.controlling {
            return;
        }
        self.input.target_x = Some(self.clamp_ship_x(x));
    }

    /// Pointer released, left the canvas or was cancelled
    ///
    /// The ship keeps its velocity and coasts to a stop.
    pub fn pointer_up(&mut self) {
        self.input.moving = false;
        self.input.controlling = false;
        self.input.target_x = None;
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_defaults() {
        let mut world = World::new(1, 1000.0, 800.0, 4);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.lives, MAX_LIVES);
        assert_eq!(world.coins_collected, 0);
        assert_eq!(world.best, 4);
        assert_eq!(world.ship.pos, Vec2::new(500.0, 480.0));
        // 1000 * 800 * 0.00018 = 144
        assert_eq!(world.stars.len(), 144);
        assert_eq!(world.drain_events(), vec![GameEvent::SessionStarted]);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_stars_within_viewport() {
        let world = World::new(7, 640.0, 480.0, 0);
        for star in &world.stars {
            assert!(star.pos.x >= 0.0 && star.pos.x <= 640.0);
            assert!(star.pos.y >= 0.0 && star.pos.y <= 480.0);
            assert!(star.radius >= STAR_MIN_RADIUS && star.radius <= STAR_MAX_RADIUS);
        }
    }

    #[test]
    fn test_star_density_setting() {
        let mut world = World::new(7, 1000.0, 1000.0, 0);
        assert_eq!(world.stars.len(), 180);
        world.set_star_density(0.5);
        assert_eq!(world.stars.len(), 90);
    }

    #[test]
    fn test_pointer_down_sets_clamped_target() {
        let mut world = World::new(1, 1000.0, 800.0, 0);
        world.pointer_down(5.0);
        assert!(world.input.moving);
        assert!(world.input.controlling);
        // margin 50 + half width 50
        assert_eq!(world.input.target_x, Some(100.0));

        world.pointer_move(2000.0);
        assert_eq!(world.input.target_x, Some(900.0));
    }

    #[test]
    fn test_pointer_move_ignored_when_not_controlling() {
        let mut world = World::new(1, 1000.0, 800.0, 0);
        world.pointer_move(300.0);
        assert_eq!(world.input.target_x, None);
    }

    #[test]
    fn test_pointer_up_keeps_velocity() {
        let mut world = World::new(1, 1000.0, 800.0, 0);
        world.pointer_down(800.0);
        world.ship.vx = 250.0;
        world.pointer_up();
        assert_eq!(world.input, InputState::default());
        assert_eq!(world.ship.vx, 250.0);
    }

    #[test]
    fn test_pointer_down_after_game_over_resets() {
        let mut world = World::new(1, 1000.0, 800.0, 0);
        world.phase = GamePhase::GameOver;
        world.lives = 0;
        world.coins_collected = 9;
        world.coins.push(Coin {
            pos: Vec2::new(200.0, 10.0),
            frame_offset: 0,
        });
        world.drain_events();

        world.pointer_down(300.0);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.lives, MAX_LIVES);
        assert_eq!(world.coins_collected, 0);
        assert!(world.coins.is_empty());
        // The restarting press does not take control
        assert!(!world.input.moving);
        assert_eq!(world.drain_events(), vec![GameEvent::SessionStarted]);
    }

    #[test]
    fn test_resize_recenters_ship() {
        let mut world = World::new(1, 1000.0, 800.0, 0);
        world.ship.pos.x = 120.0;
        world.resize(600.0, 400.0);
        assert_eq!(world.ship.pos, Vec2::new(300.0, 240.0));
        assert_eq!(world.stars.len(), (600.0f32 * 400.0 * STAR_DENSITY).floor() as usize);

        // Narrow viewport switches to the compact layout
        world.resize(420.0, 700.0);
        assert_eq!(world.metrics.scale, COMPACT_SCALE);
        assert_eq!(world.ship_bounds(), (35.0 + 35.0, 420.0 - 35.0 - 35.0));
    }

    #[test]
    fn test_coin_frame_wraps() {
        let coin = Coin {
            pos: Vec2::ZERO,
            frame_offset: 4,
        };
        assert_eq!(coin.frame(0), 4);
        assert_eq!(coin.frame(3), 1);
    }
}
