//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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

/// Colors for scene elements
pub mod colors {
    pub const BG_DESTRUCTION: [f32; 4] = [0.18, 0.03, 0.03, 1.0];
    pub const BG_SAD_RAIN: [f32; 4] = [0.12, 0.16, 0.23, 1.0];
    pub const BG_UNDERWATER: [f32; 4] = [0.03, 0.22, 0.32, 1.0];
    pub const BG_DEFAULT: [f32; 4] = [0.07, 0.07, 0.1, 1.0];

    pub const EMBER: [f32; 4] = [1.0, 0.35, 0.1, 1.0];
    pub const RAIN: [f32; 4] = [0.6, 0.7, 0.85, 1.0];
    pub const BUBBLE: [f32; 4] = [0.7, 0.95, 1.0, 1.0];

    pub const TRAIL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const TARGET_RIM: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const HAZARD_BODY: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
    pub const HAZARD_RIM: [f32; 4] = [0.94, 0.27, 0.27, 1.0];
    pub const LABEL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub const HUD_PANEL: [f32; 4] = [0.0, 0.0, 0.0, 0.45];
    pub const HUD_TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HEART: [f32; 4] = [0.94, 0.27, 0.35, 1.0];
    pub const HEART_EMPTY: [f32; 4] = [0.35, 0.35, 0.4, 0.8];
    pub const WARNING: [f32; 4] = [1.0, 0.8, 0.2, 1.0];
}
