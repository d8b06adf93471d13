//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position, texture coordinate and tint
///
/// Untextured shapes sample the centre of a 1x1 white texture, so `color`
/// alone decides their appearance.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Texture coordinate used for untextured shapes
pub const SOLID_UV: [f32; 2] = [0.5, 0.5];

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: SOLID_UV,
            color,
        }
    }

    pub const fn textured(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    /// Fallback ship (#00eaff)
    pub const SHIP: [f32; 4] = [0.0, 0.918, 1.0, 1.0];
    pub const COIN: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const BOMB: [f32; 4] = [0.15, 0.15, 0.18, 1.0];
    pub const BOMB_FUSE: [f32; 4] = [0.9, 0.55, 0.1, 1.0];
    pub const EXPLOSION: [f32; 4] = [1.0, 0.55, 0.1, 1.0];
    pub const HEART_FULL: [f32; 4] = [0.9, 0.15, 0.2, 1.0];
    pub const HEART_EMPTY: [f32; 4] = [0.35, 0.35, 0.35, 1.0];
    /// Loading bar track (#222)
    pub const BAR_TRACK: [f32; 4] = [0.133, 0.133, 0.133, 1.0];
}
