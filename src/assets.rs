//! Asset manifest, loading progress and the loaded bundle
//!
//! Every manifest entry is requested once at startup. Each entry resolves
//! independently, either to a handle or to an [`AssetError`]; a failed entry
//! is logged and leaves its slot empty so consumers fall back (shapes for
//! images, silence for sounds). The frame loop only starts once every entry
//! has resolved and [`AssetLoader::finish`] produced the bundle.

use crate::consts::COIN_FRAME_COUNT;

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("Failed to fetch {path}: HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Image entries of the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAsset {
    /// One frame of the coin spin (0-based)
    CoinFrame(u32),
    Ship,
    Bomb,
    /// 4x4 explosion sprite sheet
    Explosion,
    /// Two-frame heart strip (full, empty)
    Heart,
}

const IMAGE_PATHS: [&str; IMAGE_COUNT] = [
    "assets/coin/coin1.png",
    "assets/coin/coin2.png",
    "assets/coin/coin3.png",
    "assets/coin/coin4.png",
    "assets/coin/coin5.png",
    "assets/coin/coin6.png",
    "assets/spaceship.png",
    "assets/bomb/bomb100.png",
    "assets/bomb/explosion.png",
    "assets/health.png",
];

const IMAGE_COUNT: usize = COIN_FRAME_COUNT as usize + 4;

impl ImageAsset {
    /// Every image in manifest order
    pub fn all() -> impl Iterator<Item = ImageAsset> {
        (0..IMAGE_COUNT).map(Self::from_index)
    }

    fn from_index(index: usize) -> Self {
        let coins = COIN_FRAME_COUNT as usize;
        match index {
            i if i < coins => ImageAsset::CoinFrame(i as u32),
            i if i == coins => ImageAsset::Ship,
            i if i == coins + 1 => ImageAsset::Bomb,
            i if i == coins + 2 => ImageAsset::Explosion,
            _ => ImageAsset::Heart,
        }
    }

    /// Slot in manifest order
    pub fn index(&self) -> usize {
        let coins = COIN_FRAME_COUNT as usize;
        match *self {
            ImageAsset::CoinFrame(f) => (f % COIN_FRAME_COUNT) as usize,
            ImageAsset::Ship => coins,
            ImageAsset::Bomb => coins + 1,
            ImageAsset::Explosion => coins + 2,
            ImageAsset::Heart => coins + 3,
        }
    }

    /// Path relative to the page
    pub fn path(&self) -> &'static str {
        IMAGE_PATHS[self.index()]
    }
}

/// Sound entries of the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundAsset {
    Coin,
    Bomb,
    /// Looping background track
    Music,
}

impl SoundAsset {
    pub const ALL: [SoundAsset; 3] = [SoundAsset::Coin, SoundAsset::Bomb, SoundAsset::Music];

    pub fn index(&self) -> usize {
        match self {
            SoundAsset::Coin => 0,
            SoundAsset::Bomb => 1,
            SoundAsset::Music => 2,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            SoundAsset::Coin => "sounds/coin.wav",
            SoundAsset::Bomb => "sounds/bomb.wav",
            SoundAsset::Music => "sounds/background.ogg",
        }
    }
}

/// Resolved / total manifest entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// Completed fraction in 0..=1
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.loaded as f32 / self.total as f32).min(1.0)
        }
    }
}

/// Immutable result of the loading phase
///
/// Generic over the host's handle types so the scene builder and tests can
/// inspect availability without a GPU or audio device.
#[derive(Debug)]
pub struct AssetBundle<I, S> {
    images: Vec<Option<I>>,
    sounds: Vec<Option<S>>,
}

impl<I, S> AssetBundle<I, S> {
    /// Bundle with every slot empty (all fallbacks)
    pub fn empty() -> Self {
        Self {
            images: (0..IMAGE_COUNT).map(|_| None).collect(),
            sounds: SoundAsset::ALL.iter().map(|_| None).collect(),
        }
    }

    pub fn image(&self, asset: ImageAsset) -> Option<&I> {
        self.images[asset.index()].as_ref()
    }

    pub fn has_image(&self, asset: ImageAsset) -> bool {
        self.image(asset).is_some()
    }

    pub fn sound(&self, asset: SoundAsset) -> Option<&S> {
        self.sounds[asset.index()].as_ref()
    }

    /// Move every loaded image out, converting it with `f`
    pub fn map_images<J>(self, mut f: impl FnMut(ImageAsset, I) -> Option<J>) -> AssetBundle<J, S> {
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(i, img)| img.and_then(|img| f(ImageAsset::from_index(i), img)))
            .collect();
        AssetBundle {
            images,
            sounds: self.sounds,
        }
    }
}

/// One manifest slot while loading
#[derive(Debug)]
enum Slot<T> {
    Pending,
    Loaded(T),
    Failed,
}

/// Tracks the startup loading phase
#[derive(Debug)]
pub struct AssetLoader<I, S> {
    images: Vec<Slot<I>>,
    sounds: Vec<Slot<S>>,
}

impl<I, S> Default for AssetLoader<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> AssetLoader<I, S> {
    pub fn new() -> Self {
        Self {
            images: (0..IMAGE_COUNT).map(|_| Slot::Pending).collect(),
            sounds: SoundAsset::ALL.iter().map(|_| Slot::Pending).collect(),
        }
    }

    /// Record the outcome for an image; failures are logged and dropped
    pub fn resolve_image(&mut self, asset: ImageAsset, result: Result<I, AssetError>) {
        self.images[asset.index()] = match result {
            Ok(handle) => Slot::Loaded(handle),
            Err(e) => {
                log::warn!("{}", e);
                Slot::Failed
            }
        };
    }

    /// Record the outcome for a sound; failures are logged and dropped
    pub fn resolve_sound(&mut self, asset: SoundAsset, result: Result<S, AssetError>) {
        self.sounds[asset.index()] = match result {
            Ok(handle) => Slot::Loaded(handle),
            Err(e) => {
                log::warn!("{}", e);
                Slot::Failed
            }
        };
    }

    pub fn progress(&self) -> LoadProgress {
        fn resolved<T>(slots: &[Slot<T>]) -> usize {
            slots.iter().filter(|s| !matches!(s, Slot::Pending)).count()
        }
        LoadProgress {
            loaded: resolved(&self.images) + resolved(&self.sounds),
            total: self.images.len() + self.sounds.len(),
        }
    }

    /// Every entry resolved, successfully or not
    pub fn is_complete(&self) -> bool {
        let progress = self.progress();
        progress.loaded == progress.total
    }

    /// Freeze into the bundle; unresolved or failed entries become `None`
    pub fn finish(self) -> AssetBundle<I, S> {
        fn take<T>(slots: Vec<Slot<T>>) -> Vec<Option<T>> {
            slots
                .into_iter()
                .map(|s| match s {
                    Slot::Loaded(v) => Some(v),
                    Slot::Pending | Slot::Failed => None,
                })
                .collect()
        }
        let bundle = AssetBundle {
            images: take(self.images),
            sounds: take(self.sounds),
        };
        let images = bundle.images.iter().filter(|i| i.is_some()).count();
        let sounds = bundle.sounds.iter().filter(|s| s.is_some()).count();
        log::info!(
            "Assets loaded: {}/{} images, {}/{} sounds",
            images,
            IMAGE_COUNT,
            sounds,
            SoundAsset::ALL.len()
        );
        bundle
    }
}

/// Decode PNG bytes into RGBA8
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<image::RgbaImage, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|source| AssetError::Image {
        path: path.to_string(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Browser fetch helpers
#[cfg(target_arch = "wasm32")]
pub mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use super::AssetError;

    fn fetch_err(path: &str, e: wasm_bindgen::JsValue) -> AssetError {
        AssetError::Fetch {
            path: path.to_string(),
            reason: format!("{:?}", e),
        }
    }

    /// GET `path` and return the body as an `ArrayBuffer`
    pub async fn fetch_array_buffer(path: &str) -> Result<js_sys::ArrayBuffer, AssetError> {
        let window = web_sys::window().ok_or_else(|| AssetError::Fetch {
            path: path.to_string(),
            reason: "no window".to_string(),
        })?;
        let resp = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| fetch_err(path, e))?;
        let resp: web_sys::Response = resp.dyn_into().map_err(|e| fetch_err(path, e))?;
        if !resp.ok() {
            return Err(AssetError::Status {
                path: path.to_string(),
                status: resp.status(),
            });
        }
        let buf = JsFuture::from(resp.array_buffer().map_err(|e| fetch_err(path, e))?)
            .await
            .map_err(|e| fetch_err(path, e))?;
        buf.dyn_into().map_err(|e| fetch_err(path, e))
    }

    /// GET `path` and return the body bytes
    pub async fn fetch_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
        let buf = fetch_array_buffer(path).await?;
        Ok(js_sys::Uint8Array::new(&buf).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_order_and_paths() {
        let all: Vec<_> = ImageAsset::all().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].path(), "assets/coin/coin1.png");
        assert_eq!(all[5].path(), "assets/coin/coin6.png");
        assert_eq!(ImageAsset::Ship.path(), "assets/spaceship.png");
        assert_eq!(ImageAsset::Heart.path(), "assets/health.png");
        for (i, asset) in all.iter().enumerate() {
            assert_eq!(asset.index(), i);
        }
        assert_eq!(SoundAsset::Music.path(), "sounds/background.ogg");
    }

    #[test]
    fn test_progress_counts_failures() {
        let mut loader: AssetLoader<u8, u8> = AssetLoader::new();
        assert_eq!(loader.progress(), LoadProgress { loaded: 0, total: 13 });
        assert_eq!(loader.progress().fraction(), 0.0);

        loader.resolve_image(ImageAsset::Ship, Ok(1));
        loader.resolve_image(
            ImageAsset::Bomb,
            Err(AssetError::Status {
                path: ImageAsset::Bomb.path().to_string(),
                status: 404,
            }),
        );
        loader.resolve_sound(SoundAsset::Coin, Ok(2));
        assert_eq!(loader.progress().loaded, 3);
        assert!(!loader.is_complete());
    }

    #[test]
    fn test_finish_exposes_only_loaded_items() {
        let mut loader: AssetLoader<u8, u8> = AssetLoader::new();
        for asset in ImageAsset::all() {
            loader.resolve_image(asset, Ok(asset.index() as u8));
        }
        loader.resolve_image(
            ImageAsset::Heart,
            Err(AssetError::Decode {
                path: "assets/health.png".to_string(),
                reason: "truncated".to_string(),
            }),
        );
        for asset in SoundAsset::ALL {
            loader.resolve_sound(asset, Ok(0));
        }
        assert!(loader.is_complete());
        assert_eq!(loader.progress().fraction(), 1.0);

        let bundle = loader.finish();
        assert_eq!(bundle.image(ImageAsset::CoinFrame(3)), Some(&3));
        assert!(bundle.has_image(ImageAsset::Ship));
        assert!(!bundle.has_image(ImageAsset::Heart));
        assert!(bundle.sound(SoundAsset::Music).is_some());
    }

    #[test]
    fn test_map_images_keeps_slots() {
        let mut loader: AssetLoader<u8, ()> = AssetLoader::new();
        loader.resolve_image(ImageAsset::Bomb, Ok(9));
        let bundle = loader.finish().map_images(|asset, v| {
            assert_eq!(asset, ImageAsset::Bomb);
            Some(u32::from(v) * 2)
        });
        assert_eq!(bundle.image(ImageAsset::Bomb), Some(&18));
        assert!(!bundle.has_image(ImageAsset::Ship));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_image("assets/spaceship.png", b"not a png").unwrap_err();
        assert!(err.to_string().starts_with("Failed to decode image assets/spaceship.png"));
    }

    #[test]
    fn test_decode_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let img = decode_image("x.png", &png).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
    }
}
