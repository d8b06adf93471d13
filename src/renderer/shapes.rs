//! Shape generation for 2D primitives
//!
//! All shapes are emitted as triangle lists in screen pixels (y down).

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Texture sub-rectangle in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    /// Cell `index` of a `cols` x `rows` sheet, row-major
    pub fn grid_cell(cols: u32, rows: u32, index: u32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let col = index % cols;
        let row = (index / cols).min(rows - 1);
        let cell = Vec2::new(1.0 / cols as f32, 1.0 / rows as f32);
        let min = Vec2::new(col as f32, row as f32) * cell;
        Self {
            min,
            max: min + cell,
        }
    }

    /// Frame `index` of a horizontal strip of `frames`
    pub fn strip(frames: u32, index: u32) -> Self {
        Self::grid_cell(frames, 1, index.min(frames.saturating_sub(1)))
    }
}

/// Rectangle of `size` centred on `center`, rotated by `rotation` radians,
/// mapped to `uv`
pub fn quad(center: Vec2, size: Vec2, rotation: f32, uv: UvRect, color: [f32; 4]) -> Vec<Vertex> {
    let half = size / 2.0;
    let rot = Vec2::from_angle(rotation);
    let corner = |dx: f32, dy: f32, u: f32, v: f32| {
        let p = center + rot.rotate(Vec2::new(dx, dy));
        Vertex::textured(p.x, p.y, u, v, color)
    };
    let tl = corner(-half.x, -half.y, uv.min.x, uv.min.y);
    let tr = corner(half.x, -half.y, uv.max.x, uv.min.y);
    let bl = corner(-half.x, half.y, uv.min.x, uv.max.y);
    let br = corner(half.x, half.y, uv.max.x, uv.max.y);
    vec![tl, bl, tr, tr, bl, br]
}

/// Upward-pointing triangle filling a `size` box around `center`
pub fn triangle(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let half = size / 2.0;
    vec![
        Vertex::new(center.x, center.y - half.y, color),
        Vertex::new(center.x - half.x, center.y + half.y, color),
        Vertex::new(center.x + half.x, center.y + half.y, color),
    ]
}

/// Generate vertices for a filled ellipse
pub fn ellipse(center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Segment count that keeps small circles cheap and big ones round
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(6, 48)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cell() {
        let uv = UvRect::grid_cell(4, 4, 5);
        assert_eq!(uv.min, Vec2::new(0.25, 0.25));
        assert_eq!(uv.max, Vec2::new(0.5, 0.5));
        let last = UvRect::grid_cell(4, 4, 15);
        assert_eq!(last.max, Vec2::ONE);
    }

    #[test]
    fn test_strip() {
        assert_eq!(UvRect::strip(2, 1).min, Vec2::new(0.5, 0.0));
        assert_eq!(UvRect::strip(2, 7), UvRect::strip(2, 1));
    }

    #[test]
    fn test_quad_unrotated_corners() {
        let v = quad(
            Vec2::new(10.0, 20.0),
            Vec2::new(4.0, 2.0),
            0.0,
            UvRect::FULL,
            [1.0; 4],
        );
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [8.0, 19.0]);
        assert_eq!(v[0].uv, [0.0, 0.0]);
        assert_eq!(v[5].position, [12.0, 21.0]);
        assert_eq!(v[5].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_ellipse_vertex_count() {
        assert_eq!(ellipse(Vec2::ZERO, Vec2::new(5.0, 3.0), [1.0; 4], 12).len(), 36);
        // Degenerate segment counts still close the shape
        assert_eq!(ellipse(Vec2::ZERO, Vec2::splat(5.0), [1.0; 4], 1).len(), 9);
        assert_eq!(segments_for(0.5), 6);
        assert_eq!(segments_for(100.0), 48);
    }
}
