//! CPU-side geometry shared by the surface generators.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex for generated surfaces (nebula plane, mountains, atmosphere).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SurfaceVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            uv: uv.into(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Subdivided plane in the XY plane facing +Z, centered at the origin.
    /// UV (0,0) is the bottom-left corner.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(1);
        let hs = height_segments.max(1);
        let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        let mut indices = Vec::with_capacity((ws * hs * 6) as usize);

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let y = (v - 0.5) * height;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let x = (u - 0.5) * width;
                vertices.push(SurfaceVertex::new(
                    Vec3::new(x, y, 0.0),
                    Vec3::Z,
                    Vec2::new(u, v),
                ));
            }
        }

        let row = ws + 1;
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
        }

        Self { vertices, indices }
    }

    /// UV sphere with outward normals.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let position = Vec3::new(x, y, z);
                let normal = position.normalize_or_zero();
                let uv = Vec2::new(
                    segment as f32 / segments as f32,
                    ring as f32 / rings as f32,
                );

                vertices.push(SurfaceVertex::new(position, normal, uv));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.push(current);
                indices.push(next);
                indices.push(current + 1);

                indices.push(current + 1);
                indices.push(next);
                indices.push(next + 1);
            }
        }

        Self { vertices, indices }
    }

    /// Paint every vertex with the same RGBA color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        for v in &mut self.vertices {
            v.color = color;
        }
        self
    }
}
