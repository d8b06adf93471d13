//! Simulation module
//!
//! All gameplay logic lives here. This module must stay host-independent:
//! - Elapsed time comes in as an argument, never from a clock
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, box_overlap};
pub use state::{
    Bomb, Coin, Explosion, GameEvent, GamePhase, InputState, STAR_COLORS, Ship, Star, World,
};
pub use tick::advance;
