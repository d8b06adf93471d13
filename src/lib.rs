//! Cosmic Ride - An endless scrolling "collect the coin, avoid the bomb" game
//!
//! Core modules:
//! - `sim`: Simulation (stars, coins, bomb, explosions, ship, session state)
//! - `game`: Host-independent session glue (input, persistence, sound cues)
//! - `renderer`: Scene building and the WebGPU sprite pipeline
//! - `assets`: Asset manifest, load progress and the loaded bundle
//! - `platform`: Browser/native platform abstraction (storage)
//! - `quiz`: Flags quiz question/answer core

pub mod assets;
pub mod audio;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod quiz;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::BestScore;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (matches a 60 Hz display)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host will feed the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Viewports narrower than this use the compact layout scale
    pub const COMPACT_VIEWPORT_WIDTH: f32 = 500.0;
    pub const COMPACT_SCALE: f32 = 0.7;

    /// Scroll speed of everything that moves with the background (px/s)
    pub const SCROLL_SPEED: f32 = 300.0;

    /// Ship defaults (unscaled)
    pub const SHIP_SIZE: f32 = 100.0;
    pub const SHIP_MARGIN: f32 = 50.0;
    /// Ship rides at this fraction of the screen height
    pub const SHIP_Y_FRACTION: f32 = 0.6;
    pub const SHIP_ACCEL: f32 = 1800.0;
    pub const SHIP_MAX_SPEED: f32 = 500.0;
    pub const SHIP_STOP_DIST: f32 = 1.5;
    /// Velocity factor applied per tick once the ship is at its target
    pub const SHIP_HEAVY_DAMPING: f32 = 0.3;
    /// Velocity factor applied per tick with no target
    pub const SHIP_DAMPING: f32 = 0.85;
    /// Below this speed (px/s) the ship is considered stopped
    pub const SHIP_SNAP_SPEED: f32 = 2.0;

    /// Coin defaults (unscaled)
    pub const COIN_SIZE: f32 = 48.0;
    pub const COIN_MARGIN: f32 = 50.0;
    pub const COIN_MIN_DIST: f32 = 100.0;
    pub const COIN_FRAME_COUNT: u32 = 6;
    /// Coin animation frame duration (seconds, 10 fps)
    pub const COIN_FRAME_TIME: f32 = 0.1;

    /// Spawning
    pub const SPAWN_INTERVAL: f64 = 0.5;
    pub const MAX_COINS: usize = 5;
    pub const SPAWN_ATTEMPTS: u32 = 10;
    pub const BOMB_CHANCE: f64 = 0.2;

    /// Bomb defaults (size scaled, margin not)
    pub const BOMB_SIZE: f32 = 64.0;
    pub const BOMB_MARGIN: f32 = 50.0;
    /// One full turn per second
    pub const BOMB_SPIN: f32 = std::f32::consts::TAU;

    /// Explosion sprite sheet
    pub const EXPLOSION_FRAMES: u32 = 16;
    pub const EXPLOSION_COLS: u32 = 4;
    pub const EXPLOSION_ROWS: u32 = 4;
    pub const EXPLOSION_FRAME_TIME: f32 = 0.04;
    pub const EXPLOSION_DRAW_SIZE: f32 = 120.0;

    /// Box-proximity tests shrink the sum of half extents by this much
    pub const COLLISION_INSET: f32 = 10.0;

    pub const MAX_LIVES: u8 = 3;

    /// Stars per square pixel
    pub const STAR_DENSITY: f32 = 0.00018;
    pub const STAR_MIN_RADIUS: f32 = 0.5;
    pub const STAR_MAX_RADIUS: f32 = 2.2;
    pub const STAR_ALPHA: f32 = 0.85;

    /// Hearts HUD
    pub const HEART_WIDTH: f32 = 40.0;
    pub const HEART_HEIGHT: f32 = 35.0;
    pub const HEART_GAP: f32 = 16.0;
    pub const HEART_TOP: f32 = 24.0;
}

/// Layout sizes for a viewport
///
/// Narrow (phone) viewports shrink the ship, coins and bomb so the
/// playfield keeps room for the spawn spacing rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub scale: f32,
    pub ship_size: Vec2,
    pub ship_margin: f32,
    pub coin_size: Vec2,
    pub coin_margin: f32,
    pub coin_min_dist: f32,
    pub bomb_size: Vec2,
    pub bomb_margin: f32,
    pub explosion_size: f32,
}

impl Metrics {
    pub fn for_viewport(width: f32) -> Self {
        use consts::*;

        let scale = if width < COMPACT_VIEWPORT_WIDTH {
            COMPACT_SCALE
        } else {
            1.0
        };
        Self {
            scale,
            ship_size: Vec2::splat(SHIP_SIZE * scale),
            ship_margin: SHIP_MARGIN * scale,
            coin_size: Vec2::splat(COIN_SIZE * scale),
            coin_margin: COIN_MARGIN * scale,
            coin_min_dist: COIN_MIN_DIST * scale,
            bomb_size: Vec2::splat(BOMB_SIZE * scale),
            bomb_margin: BOMB_MARGIN,
            explosion_size: EXPLOSION_DRAW_SIZE,
        }
    }
}

/// Clamp without panicking when the range is inverted (tiny viewports)
#[inline]
pub fn soft_clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(max.min(value))
}

/// Parse a `#rrggbb` color into linear-ish RGBA floats
pub fn hex_color(hex: &str, alpha: f32) -> [f32; 4] {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map(|v| v as f32 / 255.0)
            .unwrap_or(1.0)
    };
    [channel(0), channel(2), channel(4), alpha]
}
