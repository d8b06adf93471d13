//! Game settings and preferences
//!
//! Persisted as a JSON document in the key-value store, separately from the
//! best scores.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Starfield density multiplier (1.0 = standard)
    pub fn star_density(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// All audio off
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "cosmic_ride_settings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Star density multiplier for the current preset
    pub fn star_density(&self) -> f32 {
        self.quality.star_density()
    }

    /// Load settings, falling back to defaults on missing or malformed data
    pub fn load(store: &(impl KeyValueStore + ?Sized)) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &mut (impl KeyValueStore + ?Sized)) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_defaults_when_malformed() {
        let store = MemoryStore::with_entries([(Settings::STORAGE_KEY, "{not json")]);
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.muted = true;
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let store =
            MemoryStore::with_entries([(Settings::STORAGE_KEY, r#"{"quality":"Low"}"#)]);
        let settings = Settings::load(&store);
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.music_volume, 0.7);
        assert_eq!(settings.star_density(), 0.5);
    }
}
