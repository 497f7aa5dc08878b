//! Nebula: one large subdivided plane, rippled and tinted by the nebula shader.

use glam::Vec3;

use crate::color;
use crate::geometry::Geometry;

/// Nebula surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NebulaParams {
    pub width: f32,
    pub height: f32,
    pub segments: u32,
    /// Initial depth of the plane.
    pub depth: f32,
    /// Linear RGB.
    pub color_a: Vec3,
    /// Linear RGB.
    pub color_b: Vec3,
    pub opacity: f32,
}

impl Default for NebulaParams {
    fn default() -> Self {
        Self {
            width: 8000.0,
            height: 4000.0,
            segments: 100,
            depth: -1050.0,
            color_a: color::from_hex(0x0033ff),
            color_b: color::from_hex(0xff0066),
            opacity: 0.3,
        }
    }
}

/// Generated nebula surface.
#[derive(Debug, Clone)]
pub struct Nebula {
    pub params: NebulaParams,
    pub geometry: Geometry,
}

impl Nebula {
    pub fn generate(params: NebulaParams) -> Self {
        let geometry = Geometry::plane(params.width, params.height, params.segments, params.segments);
        Self { params, geometry }
    }
}
