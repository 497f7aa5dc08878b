//! Atmosphere shell: a large sphere seen from the inside, shaded with a
//! fresnel-like rim term by the atmosphere shader.

use glam::Vec3;

use crate::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereParams {
    pub radius: f32,
    pub segments: u32,
    /// Linear RGB glow tint.
    pub tint: Vec3,
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            radius: 600.0,
            segments: 32,
            tint: Vec3::new(0.3, 0.6, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Atmosphere {
    pub params: AtmosphereParams,
    pub geometry: Geometry,
}

impl Atmosphere {
    pub fn generate(params: AtmosphereParams) -> Self {
        let geometry = Geometry::sphere(params.radius, params.segments, params.segments);
        Self { params, geometry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_point_outward() {
        let a = Atmosphere::generate(AtmosphereParams::default());
        for v in a.geometry.vertices.iter().step_by(37) {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!(p.normalize().dot(n) > 0.99);
        }
    }
}
