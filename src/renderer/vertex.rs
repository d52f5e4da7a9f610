//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in screen pixels with an RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
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
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// 8-bit sRGB triple plus alpha to a float color
pub fn rgba(rgb: [u8; 3], alpha: f32) -> [f32; 4] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    ]
}

/// Scale the RGB channels, keeping alpha
pub fn shade(color: [f32; 4], factor: f32) -> [f32; 4] {
    [
        (color[0] * factor).clamp(0.0, 1.0),
        (color[1] * factor).clamp(0.0, 1.0),
        (color[2] * factor).clamp(0.0, 1.0),
        color[3],
    ]
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.09, 0.11, 0.09, 1.0];
    pub const GRID: [f32; 4] = [1.0, 1.0, 1.0, 0.05];
    pub const WORLD_BORDER: [f32; 4] = [0.8, 0.3, 0.3, 0.6];

    pub const PLAYER_HULL: [f32; 4] = [0.25, 0.55, 0.9, 1.0];
    pub const PLAYER_TURRET: [f32; 4] = [0.15, 0.35, 0.65, 1.0];
    pub const ENEMY_HULL: [f32; 4] = [0.8, 0.25, 0.2, 1.0];
    pub const ENEMY_TURRET: [f32; 4] = [0.55, 0.15, 0.12, 1.0];
    pub const TRACKS: [f32; 4] = [0.12, 0.12, 0.12, 1.0];
    pub const BARREL: [f32; 4] = [0.2, 0.2, 0.22, 1.0];

    pub const PLAYER_BULLET: [f32; 4] = [1.0, 0.95, 0.5, 1.0];
    pub const ENEMY_BULLET: [f32; 4] = [1.0, 0.45, 0.3, 1.0];

    pub const HEALTH_PACK: [f32; 4] = [0.95, 0.95, 0.95, 1.0];
    pub const HEALTH_CROSS: [f32; 4] = [0.2, 0.85, 0.35, 1.0];
    pub const HEALTH_GLOW: [f32; 4] = [0.3, 1.0, 0.45, 0.25];

    pub const BAR_BACK: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
    pub const BAR_GOOD: [f32; 4] = [0.3, 0.9, 0.35, 1.0];
    pub const BAR_WARN: [f32; 4] = [0.95, 0.8, 0.2, 1.0];
    pub const BAR_LOW: [f32; 4] = [0.95, 0.25, 0.2, 1.0];

    pub const THREAT_NEAR: [f32; 4] = [1.0, 0.2, 0.2, 0.9];
    pub const THREAT_MEDIUM: [f32; 4] = [1.0, 0.6, 0.15, 0.85];
    pub const THREAT_FAR: [f32; 4] = [1.0, 0.9, 0.25, 0.8];

    pub const OVERLAY_DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
    pub const PANEL: [f32; 4] = [0.05, 0.06, 0.08, 0.85];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT_DIM: [f32; 4] = [0.75, 0.78, 0.8, 1.0];
    pub const TEXT_ALERT: [f32; 4] = [1.0, 0.35, 0.3, 1.0];
    pub const DEBUG_TEXT: [f32; 4] = [0.6, 1.0, 0.6, 1.0];
}
