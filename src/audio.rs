//! Audio system
//!
//! Sample playback through the Web Audio API. Which sound a game event
//! triggers and how loud it plays are decided here independently of the
//! browser; the [`AudioManager`] (wasm only) turns those decisions into
//! buffer-source nodes.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Coin picked up
    Coin,
    /// Ship hit the bomb
    Bomb,
}

impl SoundEffect {
    /// Sound cue for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::BombHit { .. } => Some(SoundEffect::Bomb),
            _ => None,
        }
    }
}

/// Whether the background track should be playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Play,
    Pause,
}

/// Volume and mute state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Window lost focus while mute-on-blur is enabled
    blurred: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Mixer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            music_volume: settings.music_volume.clamp(0.0, 1.0),
            muted: settings.muted,
            blurred: false,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_blurred(&mut self, blurred: bool) {
        self.blurred = blurred;
    }

    fn silent(&self) -> bool {
        self.muted || self.blurred
    }

    /// Effective gain for sound effects
    pub fn sfx_gain(&self) -> f32 {
        if self.silent() {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective gain for the background track
    pub fn music_gain(&self) -> f32 {
        if self.silent() {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{AudioBuffer, AudioBufferSourceNode, AudioContext, GainNode};

    use super::{Mixer, MusicCue, SoundEffect};
    use crate::assets::{AssetBundle, AssetError, SoundAsset};

    /// Buffer slot for an effect
    fn slot(effect: SoundEffect) -> usize {
        match effect {
            SoundEffect::Coin => 0,
            SoundEffect::Bomb => 1,
        }
    }

    /// Looping background track and where it left off
    #[derive(Default)]
    struct Music {
        buffer: Option<AudioBuffer>,
        node: Option<AudioBufferSourceNode>,
        gain: Option<GainNode>,
        /// Context time the current playback corresponds to offset 0
        started_at: f64,
        /// Position to resume from (seconds)
        offset: f64,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        mixer: Mixer,
        effects: [Option<AudioBuffer>; 2],
        /// Last started node per effect, stopped when the effect restarts
        playing: [Option<AudioBufferSourceNode>; 2],
        music: Music,
    }

    impl AudioManager {
        pub fn new(mixer: Mixer) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                mixer,
                effects: [None, None],
                playing: [None, None],
                music: Music::default(),
            }
        }

        /// Context used to decode sample data
        pub fn context(&self) -> Option<AudioContext> {
            self.ctx.clone()
        }

        /// Take the decoded samples from the loaded bundle
        pub fn attach<I>(&mut self, bundle: &AssetBundle<I, AudioBuffer>) {
            self.effects[slot(SoundEffect::Coin)] = bundle.sound(SoundAsset::Coin).cloned();
            self.effects[slot(SoundEffect::Bomb)] = bundle.sound(SoundAsset::Bomb).cloned();
            self.music.buffer = bundle.sound(SoundAsset::Music).cloned();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        pub fn mixer(&self) -> &Mixer {
            &self.mixer
        }

        /// Change volumes/mute and apply them to the running track
        pub fn set_mixer(&mut self, mixer: Mixer) {
            self.mixer = mixer;
            if let Some(gain) = &self.music.gain {
                gain.gain().set_value(self.mixer.music_gain());
            }
        }

        fn source(
            &self,
            ctx: &AudioContext,
            buffer: &AudioBuffer,
            volume: f32,
        ) -> Option<(AudioBufferSourceNode, GainNode)> {
            let node = ctx.create_buffer_source().ok()?;
            let gain = ctx.create_gain().ok()?;
            node.set_buffer(Some(buffer));
            gain.gain().set_value(volume);
            node.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((node, gain))
        }

        /// Play a sound effect from the start
        pub fn play(&mut self, effect: SoundEffect) {
            let vol = self.mixer.sfx_gain();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };
            let Some(buffer) = self.effects[slot(effect)].clone() else {
                return;
            };
            self.resume();

            if let Some(prev) = self.playing[slot(effect)].take() {
                let _ = prev.stop();
            }
            let Some((node, _gain)) = self.source(&ctx, &buffer, vol) else {
                return;
            };
            if node.start().is_ok() {
                self.playing[slot(effect)] = Some(node);
            }
        }

        /// Start or pause the looping background track
        pub fn music(&mut self, cue: MusicCue) {
            match cue {
                MusicCue::Play => self.play_music(),
                MusicCue::Pause => self.pause_music(),
            }
        }

        fn play_music(&mut self) {
            if self.music.node.is_some() {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };
            let Some(buffer) = self.music.buffer.clone() else {
                return;
            };
            self.resume();

            let Some((node, gain)) = self.source(&ctx, &buffer, self.mixer.music_gain()) else {
                return;
            };
            node.set_loop(true);
            let duration = buffer.duration();
            let offset = if duration > 0.0 {
                self.music.offset % duration
            } else {
                0.0
            };
            if node.start_with_when_and_grain_offset(0.0, offset).is_err() {
                log::warn!("Failed to start background music");
                return;
            }
            self.music.started_at = ctx.current_time() - offset;
            self.music.node = Some(node);
            self.music.gain = Some(gain);
        }

        fn pause_music(&mut self) {
            let Some(node) = self.music.node.take() else {
                return;
            };
            let _ = node.stop();
            self.music.gain = None;
            if let Some(ctx) = &self.ctx {
                self.music.offset = ctx.current_time() - self.music.started_at;
            }
        }
    }

    /// Decode fetched sample data into an `AudioBuffer`
    pub async fn decode(
        ctx: &AudioContext,
        path: &str,
        data: &js_sys::ArrayBuffer,
    ) -> Result<AudioBuffer, AssetError> {
        let decode_err = |e: wasm_bindgen::JsValue| AssetError::Decode {
            path: path.to_string(),
            reason: format!("{:?}", e),
        };
        let promise = ctx.decode_audio_data(data).map_err(decode_err)?;
        let buffer = JsFuture::from(promise).await.map_err(decode_err)?;
        buffer.dyn_into().map_err(decode_err)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::decode;
