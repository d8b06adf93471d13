//! World snapshot to draw list
//!
//! Produces the sprites for one frame in painter's order. Entities whose
//! image failed to load are drawn as simple shapes instead.

use glam::Vec2;
use std::f32::consts::PI;

use super::shapes::{self, UvRect};
use super::vertex::{Vertex, colors};
use crate::assets::{AssetBundle, ImageAsset, LoadProgress};
use crate::consts::*;
use crate::sim::{Bomb, Coin, Explosion, GamePhase, World};

/// Geometry used when a sprite has no image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rect,
    Disc,
    /// Pointing up
    Triangle,
}

/// One draw primitive in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub shape: Shape,
    pub center: Vec2,
    pub size: Vec2,
    /// Radians, clockwise on screen
    pub rotation: f32,
    /// Tint for images, fill for shapes
    pub color: [f32; 4],
    pub image: Option<ImageAsset>,
    pub uv: UvRect,
}

impl Sprite {
    pub fn image(asset: ImageAsset, center: Vec2, size: Vec2) -> Self {
        Self {
            shape: Shape::Rect,
            center,
            size,
            rotation: 0.0,
            color: colors::WHITE,
            image: Some(asset),
            uv: UvRect::FULL,
        }
    }

    pub fn shape(shape: Shape, center: Vec2, size: Vec2, color: [f32; 4]) -> Self {
        Self {
            shape,
            center,
            size,
            rotation: 0.0,
            color,
            image: None,
            uv: UvRect::FULL,
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uv(mut self, uv: UvRect) -> Self {
        self.uv = uv;
        self
    }

    /// Triangle list for this sprite
    pub fn vertices(&self) -> Vec<Vertex> {
        if self.image.is_some() {
            return shapes::quad(self.center, self.size, self.rotation, self.uv, self.color);
        }
        match self.shape {
            Shape::Rect => shapes::quad(
                self.center,
                self.size,
                self.rotation,
                UvRect::FULL,
                self.color,
            ),
            Shape::Disc => {
                let radii = self.size / 2.0;
                shapes::ellipse(
                    self.center,
                    radii,
                    self.color,
                    shapes::segments_for(radii.max_element()),
                )
            }
            Shape::Triangle => shapes::triangle(self.center, self.size, self.color),
        }
    }
}

/// Sprites for the current world state
///
/// While playing: stars, coins, bomb, explosions, ship, hearts. After game
/// over only the frozen stars and explosions remain.
pub fn build<I, S>(world: &World, assets: &AssetBundle<I, S>) -> Vec<Sprite> {
    let mut sprites = Vec::with_capacity(world.stars.len() + 16);

    for star in &world.stars {
        sprites.push(Sprite::shape(
            Shape::Disc,
            star.pos,
            Vec2::splat(star.radius * 2.0),
            star.color,
        ));
    }

    if world.phase == GamePhase::GameOver {
        push_explosions(&mut sprites, world, assets);
        return sprites;
    }

    for coin in &world.coins {
        sprites.push(coin_sprite(world, coin, assets));
    }
    if let Some(bomb) = &world.bomb {
        push_bomb(&mut sprites, world, bomb, assets);
    }
    push_explosions(&mut sprites, world, assets);

    let ship_size = world.metrics.ship_size;
    sprites.push(if assets.has_image(ImageAsset::Ship) {
        Sprite::image(ImageAsset::Ship, world.ship.pos, ship_size)
    } else {
        Sprite::shape(Shape::Triangle, world.ship.pos, ship_size, colors::SHIP)
    });

    push_hearts(&mut sprites, world, assets);
    sprites
}

fn coin_sprite<I, S>(world: &World, coin: &Coin, assets: &AssetBundle<I, S>) -> Sprite {
    let frame = coin.frame(world.coin_frame);
    let size = world.metrics.coin_size;
    let asset = ImageAsset::CoinFrame(frame);
    if assets.has_image(asset) {
        return Sprite::image(asset, coin.pos, size);
    }
    // Spin suggested by squeezing the disc horizontally
    let phase = frame as f32 / COIN_FRAME_COUNT as f32 * PI;
    let squeeze = 0.35 + 0.65 * phase.cos().abs();
    Sprite::shape(
        Shape::Disc,
        coin.pos,
        Vec2::new(size.x * squeeze, size.y),
        colors::COIN,
    )
}

fn push_bomb<I, S>(
    sprites: &mut Vec<Sprite>,
    world: &World,
    bomb: &Bomb,
    assets: &AssetBundle<I, S>,
) {
    let size = world.metrics.bomb_size;
    if assets.has_image(ImageAsset::Bomb) {
        sprites.push(Sprite::image(ImageAsset::Bomb, bomb.pos, size).rotated(bomb.angle));
        return;
    }
    let radius = size.x * 0.4;
    sprites.push(Sprite::shape(
        Shape::Disc,
        bomb.pos,
        Vec2::splat(radius * 2.0),
        colors::BOMB,
    ));
    let fuse_len = size.y * 0.25;
    let fuse_center = bomb.pos + Vec2::from_angle(bomb.angle).rotate(Vec2::new(0.0, -radius));
    sprites.push(
        Sprite::shape(
            Shape::Rect,
            fuse_center,
            Vec2::new(size.x * 0.1, fuse_len),
            colors::BOMB_FUSE,
        )
        .rotated(bomb.angle),
    );
}

fn explosion_sprite<I, S>(world: &World, exp: &Explosion, assets: &AssetBundle<I, S>) -> Sprite {
    let size = Vec2::splat(world.metrics.explosion_size);
    if assets.has_image(ImageAsset::Explosion) {
        return Sprite::image(ImageAsset::Explosion, exp.pos, size).with_uv(UvRect::grid_cell(
            EXPLOSION_COLS,
            EXPLOSION_ROWS,
            exp.frame,
        ));
    }
    let t = exp.frame as f32 / EXPLOSION_FRAMES as f32;
    let mut color = colors::EXPLOSION;
    color[3] = 1.0 - t;
    Sprite::shape(Shape::Disc, exp.pos, size * (0.3 + 0.7 * t), color)
}

fn push_explosions<I, S>(sprites: &mut Vec<Sprite>, world: &World, assets: &AssetBundle<I, S>) {
    for exp in &world.explosions {
        if exp.done || exp.frame >= EXPLOSION_FRAMES {
            continue;
        }
        sprites.push(explosion_sprite(world, exp, assets));
    }
}

/// Heart centres for the lives HUD, left to right
pub fn heart_positions(viewport_width: f32) -> Vec<Vec2> {
    let lives = MAX_LIVES as f32;
    let total = HEART_WIDTH * lives + HEART_GAP * (lives - 1.0);
    let start = viewport_width / 2.0 - total / 2.0;
    (0..MAX_LIVES)
        .map(|i| {
            Vec2::new(
                start + i as f32 * (HEART_WIDTH + HEART_GAP) + HEART_WIDTH / 2.0,
                HEART_TOP + HEART_HEIGHT / 2.0,
            )
        })
        .collect()
}

fn push_hearts<I, S>(sprites: &mut Vec<Sprite>, world: &World, assets: &AssetBundle<I, S>) {
    let textured = assets.has_image(ImageAsset::Heart);
    for (i, center) in heart_positions(world.size.x).into_iter().enumerate() {
        let full = (i as u8) < world.lives;
        sprites.push(if textured {
            Sprite::image(
                ImageAsset::Heart,
                center,
                Vec2::new(HEART_WIDTH, HEART_HEIGHT),
            )
            .with_uv(UvRect::strip(2, if full { 0 } else { 1 }))
        } else {
            let color = if full {
                colors::HEART_FULL
            } else {
                colors::HEART_EMPTY
            };
            Sprite::shape(Shape::Rect, center, Vec2::splat(HEART_HEIGHT), color)
        });
    }
}

/// Loading bar width cap (px)
pub const LOADING_BAR_MAX_WIDTH: f32 = 400.0;
pub const LOADING_BAR_HEIGHT: f32 = 18.0;

/// Progress bar below the screen centre
pub fn build_loading(viewport: Vec2, progress: LoadProgress) -> Vec<Sprite> {
    let width = (viewport.x * 0.5).min(LOADING_BAR_MAX_WIDTH);
    let left = (viewport.x - width) / 2.0;
    let center_y = viewport.y / 2.0 + 40.0 + LOADING_BAR_HEIGHT / 2.0;

    let mut sprites = vec![Sprite::shape(
        Shape::Rect,
        Vec2::new(left + width / 2.0, center_y),
        Vec2::new(width, LOADING_BAR_HEIGHT),
        colors::BAR_TRACK,
    )];
    let filled = width * progress.fraction();
    if filled > 0.0 {
        sprites.push(Sprite::shape(
            Shape::Rect,
            Vec2::new(left + filled / 2.0, center_y),
            Vec2::new(filled, LOADING_BAR_HEIGHT),
            colors::WHITE,
        ));
    }
    sprites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLoader;

    fn all_images() -> AssetBundle<(), ()> {
        let mut loader = AssetLoader::new();
        for asset in ImageAsset::all() {
            loader.resolve_image(asset, Ok(()));
        }
        loader.finish()
    }

    fn busy_world() -> World {
        let mut world = World::new(4, 1000.0, 800.0, 0);
        world.coins.push(Coin {
            pos: Vec2::new(300.0, 100.0),
            frame_offset: 2,
        });
        world.bomb = Some(Bomb {
            pos: Vec2::new(600.0, 200.0),
            angle: 1.0,
        });
        world.explosions.push(Explosion::new(Vec2::new(500.0, 400.0)));
        world
    }

    #[test]
    fn test_draw_order() {
        let world = busy_world();
        let sprites = build(&world, &all_images());
        let images: Vec<_> = sprites.iter().filter_map(|s| s.image).collect();
        assert_eq!(
            images,
            vec![
                ImageAsset::CoinFrame(2),
                ImageAsset::Bomb,
                ImageAsset::Explosion,
                ImageAsset::Ship,
                ImageAsset::Heart,
                ImageAsset::Heart,
                ImageAsset::Heart,
            ]
        );
        // Stars come first
        assert!(sprites[..world.stars.len()].iter().all(|s| s.image.is_none()));
    }

    #[test]
    fn test_game_over_shows_stars_and_explosions() {
        let mut world = busy_world();
        world.phase = GamePhase::GameOver;
        let sprites = build(&world, &all_images());
        assert_eq!(sprites.len(), world.stars.len() + 1);
        assert_eq!(sprites.last().unwrap().image, Some(ImageAsset::Explosion));
    }

    #[test]
    fn test_fallback_shapes() {
        let world = busy_world();
        let sprites = build(&world, &AssetBundle::<(), ()>::empty());
        let drawn = &sprites[world.stars.len()..];
        assert!(drawn.iter().all(|s| s.image.is_none()));
        // coin, bomb body + fuse, explosion, ship, 3 hearts
        assert_eq!(drawn.len(), 8);
        assert_eq!(drawn[0].color, colors::COIN);
        assert_eq!(drawn[1].color, colors::BOMB);
        assert_eq!(drawn[2].rotation, 1.0);
        assert_eq!(drawn[4].shape, Shape::Triangle);
        assert_eq!(drawn[4].color, colors::SHIP);
    }

    #[test]
    fn test_hearts_reflect_lives() {
        let mut world = busy_world();
        world.lives = 1;
        let sprites = build(&world, &all_images());
        let hearts: Vec<_> = sprites
            .iter()
            .filter(|s| s.image == Some(ImageAsset::Heart))
            .collect();
        assert_eq!(hearts[0].uv, UvRect::strip(2, 0));
        assert_eq!(hearts[1].uv, UvRect::strip(2, 1));
        assert_eq!(hearts[2].uv, UvRect::strip(2, 1));

        let fallback = build(&world, &AssetBundle::<(), ()>::empty());
        let n = fallback.len();
        assert_eq!(fallback[n - 3].color, colors::HEART_FULL);
        assert_eq!(fallback[n - 1].color, colors::HEART_EMPTY);
    }

    #[test]
    fn test_heart_layout() {
        let hearts = heart_positions(1000.0);
        // 3 * 40 + 2 * 16 = 152 wide, starting at 424
        assert_eq!(hearts[0], Vec2::new(444.0, 41.5));
        assert_eq!(hearts[2], Vec2::new(556.0, 41.5));
    }

    #[test]
    fn test_explosion_uses_sheet_cell() {
        let mut world = busy_world();
        world.explosions[0].frame = 6;
        let sprites = build(&world, &all_images());
        let exp = sprites
            .iter()
            .find(|s| s.image == Some(ImageAsset::Explosion))
            .unwrap();
        assert_eq!(exp.uv, UvRect::grid_cell(4, 4, 6));
        assert_eq!(exp.size, Vec2::splat(120.0));
    }

    #[test]
    fn test_loading_bar() {
        let half = LoadProgress {
            loaded: 5,
            total: 10,
        };
        let sprites = build_loading(Vec2::new(1000.0, 800.0), half);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].size, Vec2::new(400.0, 18.0));
        assert_eq!(sprites[1].size, Vec2::new(200.0, 18.0));
        assert_eq!(sprites[1].center.x, 400.0);

        let narrow = build_loading(Vec2::new(300.0, 600.0), LoadProgress { loaded: 0, total: 4 });
        assert_eq!(narrow.len(), 1);
        assert_eq!(narrow[0].size.x, 150.0);
    }
}
