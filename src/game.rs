//! Session glue between a host and the simulation
//!
//! [`Game`] owns the world together with its persistence: it feeds pointer
//! input to the world, advances it on a fixed timestep, writes a new best
//! through to the store the moment it happens, and reports which sounds the
//! host should play. The browser entry point and the native demo both drive
//! the game through this type.

use crate::audio::{MusicCue, SoundEffect};
use crate::consts::*;
use crate::highscores::{BestScore, MAX_COINS_KEY};
use crate::platform::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, World, advance, autopilot};

/// What the host should do after a frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// Simulation ticks run this frame
    pub ticks: u32,
    /// Events raised during those ticks, in order
    pub events: Vec<GameEvent>,
    /// Sound effects to start
    pub sounds: Vec<SoundEffect>,
    /// Background track change, if the moving state flipped
    pub music: Option<MusicCue>,
}

/// One player's game: world, best score and settings
pub struct Game<S: KeyValueStore> {
    world: World,
    store: S,
    best: BestScore,
    settings: Settings,
    accumulator: f32,
    autopilot: bool,
    music_playing: bool,
}

impl<S: KeyValueStore> Game<S> {
    /// Start a session in a `width` x `height` viewport, reading the best
    /// score and settings from `store`
    pub fn new(seed: u64, width: f32, height: f32, store: S) -> Self {
        let settings = Settings::load(&store);
        let best = BestScore::load(&store, MAX_COINS_KEY);
        let mut world = World::new(seed, width, height, best.value());
        world.set_star_density(settings.star_density());
        Self {
            world,
            store,
            best,
            settings,
            accumulator: 0.0,
            autopilot: false,
            music_playing: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for hosts and tests that stage a situation
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Best coins over all sessions, including the current one
    pub fn best(&self) -> u32 {
        self.best.value()
    }

    /// Replace the settings, persist them and apply the star density
    pub fn set_settings(&mut self, settings: Settings) {
        if (settings.star_density() - self.settings.star_density()).abs() > f32::EPSILON {
            self.world.set_star_density(settings.star_density());
        }
        self.settings = settings;
        self.settings.save(&mut self.store);
    }

    /// Flip mute and persist it; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        let mut settings = self.settings.clone();
        settings.muted = !settings.muted;
        self.set_settings(settings);
        log::info!("Audio {}", if self.settings.muted { "muted" } else { "unmuted" });
        self.settings.muted
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Flip demo mode; returns the new state
    pub fn toggle_autopilot(&mut self) -> bool {
        self.autopilot = !self.autopilot;
        if !self.autopilot {
            self.world.pointer_up();
        }
        log::info!("Autopilot {}", if self.autopilot { "on" } else { "off" });
        self.autopilot
    }

    pub fn pointer_down(&mut self, x: f32) {
        if !self.autopilot {
            self.world.pointer_down(x);
        }
    }

    pub fn pointer_move(&mut self, x: f32) {
        if !self.autopilot {
            self.world.pointer_move(x);
        }
    }

    pub fn pointer_up(&mut self) {
        if !self.autopilot {
            self.world.pointer_up();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.world.resize(width, height);
    }

    /// HUD line for the coin counter
    pub fn hud_text(&self) -> String {
        format!(
            "Coins: {}. Max coins: {}",
            self.world.coins_collected,
            self.best.value()
        )
    }

    /// Advance by a frame of `dt` seconds on the fixed timestep
    pub fn frame(&mut self, dt: f32) -> FrameOutput {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            if self.autopilot {
                autopilot::drive(&mut self.world);
            }
            advance(&mut self.world, SIM_DT);
            self.accumulator -= SIM_DT;
            ticks += 1;
        }

        let events = self.world.drain_events();
        let mut sounds = Vec::new();
        for event in &events {
            if let GameEvent::NewBest { best } = event {
                self.best.submit(*best, &mut self.store);
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                sounds.push(effect);
            }
        }

        let music = match (self.world.input.moving, self.music_playing) {
            (true, false) => Some(MusicCue::Play),
            (false, true) => Some(MusicCue::Pause),
            _ => None,
        };
        if music.is_some() {
            self.music_playing = self.world.input.moving;
        }

        FrameOutput {
            ticks,
            events,
            sounds,
            music,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::sim::{Bomb, Coin, GamePhase};
    use glam::Vec2;

    fn game() -> Game<MemoryStore> {
        Game::new(9, 1000.0, 800.0, MemoryStore::new())
    }

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut g = game();
        assert_eq!(g.frame(0.01).ticks, 0);
        assert_eq!(g.frame(0.01).ticks, 1);
        // Long frames are capped before accumulating
        assert_eq!(g.frame(5.0).ticks, 6);
    }

    #[test]
    fn test_hud_text() {
        let store = MemoryStore::with_entries([(MAX_COINS_KEY, "12")]);
        let g = Game::new(1, 1000.0, 800.0, store);
        assert_eq!(g.hud_text(), "Coins: 0. Max coins: 12");
    }

    #[test]
    fn test_star_density_from_settings() {
        let mut store = MemoryStore::new();
        Settings::from_preset(crate::QualityPreset::Low).save(&mut store);
        let g = Game::new(1, 1000.0, 800.0, store);
        assert_eq!(g.world().stars.len(), 72);
    }

    #[test]
    fn test_coin_pickup_cues_sound() {
        let mut g = game();
        let ship = g.world.ship.pos;
        g.world.coins.push(Coin {
            pos: ship,
            frame_offset: 0,
        });
        g.pointer_down(ship.x);
        let out = g.frame(SIM_DT);
        assert_eq!(out.sounds, vec![SoundEffect::Coin]);
        assert_eq!(g.world().coins_collected, 1);
    }

    #[test]
    fn test_music_follows_moving() {
        let mut g = game();
        assert_eq!(g.frame(SIM_DT).music, None);
        g.pointer_down(500.0);
        assert_eq!(g.frame(SIM_DT).music, Some(MusicCue::Play));
        assert_eq!(g.frame(SIM_DT).music, None);
        g.pointer_up();
        assert_eq!(g.frame(SIM_DT).music, Some(MusicCue::Pause));
    }

    #[test]
    fn test_new_best_written_through() {
        let store = MemoryStore::with_entries([(MAX_COINS_KEY, "5")]);
        let mut g = Game::new(3, 1000.0, 800.0, store);
        g.world.coins_collected = 7;
        g.world.lives = 1;
        let ship = g.world.ship.pos;
        g.world.bomb = Some(Bomb {
            pos: ship,
            angle: 0.0,
        });
        g.pointer_down(ship.x);
        let out = g.frame(SIM_DT);

        assert!(out.sounds.contains(&SoundEffect::Bomb));
        assert_eq!(g.world().phase, GamePhase::GameOver);
        assert_eq!(g.best(), 7);
        assert_eq!(g.store().get(MAX_COINS_KEY).as_deref(), Some("7"));
        assert_eq!(g.hud_text(), "Coins: 7. Max coins: 7");
    }

    #[test]
    fn test_toggle_mute_persists() {
        let mut g = game();
        assert!(g.toggle_mute());
        assert!(Settings::load(g.store()).muted);
        assert!(!g.toggle_mute());
    }

    #[test]
    fn test_autopilot_ignores_pointer() {
        let mut g = game();
        assert!(g.toggle_autopilot());
        g.pointer_down(100.0);
        assert_eq!(g.world().input.target_x, None);
        g.frame(SIM_DT);
        assert!(g.world().input.moving);
        assert!(!g.toggle_autopilot());
        assert!(!g.world().input.moving);
    }

    #[test]
    fn test_resize_keeps_session() {
        let mut g = game();
        g.world.coins_collected = 4;
        g.resize(400.0, 600.0);
        assert_eq!(g.world().size, Vec2::new(400.0, 600.0));
        assert_eq!(g.world().coins_collected, 4);
    }
}
