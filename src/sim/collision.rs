//! Box-proximity collision checks
//!
//! Sprites are drawn centred on their position, so every entity is treated as
//! an axis-aligned box around its centre. The test is deliberately loose: the
//! sum of half extents is shrunk by a fixed inset so transparent sprite
//! corners don't count as hits.

use glam::Vec2;

use crate::consts::COLLISION_INSET;

/// Axis-aligned box given by centre and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    /// Box of `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size / 2.0,
        }
    }

    /// Box-proximity test with the standard inset
    pub fn touches(&self, other: &Aabb) -> bool {
        box_overlap(self, other, COLLISION_INSET)
    }
}

/// `|dx| < ha.x + hb.x - inset && |dy| < ha.y + hb.y - inset`
#[inline]
pub fn box_overlap(a: &Aabb, b: &Aabb, inset: f32) -> bool {
    let d = (a.center - b.center).abs();
    let reach = a.half + b.half - Vec2::splat(inset);
    d.x < reach.x && d.y < reach.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship_at(x: f32, y: f32) -> Aabb {
        Aabb::centered(Vec2::new(x, y), Vec2::splat(100.0))
    }

    fn coin_at(x: f32, y: f32) -> Aabb {
        Aabb::centered(Vec2::new(x, y), Vec2::splat(48.0))
    }

    #[test]
    fn test_same_center_overlaps() {
        assert!(ship_at(400.0, 300.0).touches(&coin_at(400.0, 300.0)));
    }

    #[test]
    fn test_inset_shrinks_reach() {
        // Half extents sum to 74, inset leaves 64
        let ship = ship_at(0.0, 0.0);
        assert!(ship.touches(&coin_at(63.9, 0.0)));
        assert!(!ship.touches(&coin_at(64.0, 0.0)));
        assert!(!ship.touches(&coin_at(0.0, -70.0)));
    }

    #[test]
    fn test_both_axes_required() {
        let ship = ship_at(0.0, 0.0);
        assert!(!ship.touches(&coin_at(10.0, 200.0)));
        assert!(!ship.touches(&coin_at(200.0, 10.0)));
    }

    #[test]
    fn test_symmetric() {
        let a = ship_at(10.0, 20.0);
        let b = coin_at(50.0, -30.0);
        assert_eq!(a.touches(&b), b.touches(&a));
    }

    #[test]
    fn test_zero_inset_is_plain_overlap() {
        let a = Aabb::centered(Vec2::ZERO, Vec2::splat(2.0));
        let b = Aabb::centered(Vec2::new(1.5, 0.0), Vec2::splat(2.0));
        assert!(box_overlap(&a, &b, 0.0));
        assert!(!box_overlap(&a, &b, 1.0));
    }
}
