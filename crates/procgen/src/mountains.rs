//! Mountain silhouettes: a jittered two-frequency sine profile closed into a
//! filled polygon by two far-off base corners.

use glam::{Vec2, Vec3};
use rand::prelude::*;

use crate::geometry::{Geometry, SurfaceVertex};
use crate::layers::LayerDescriptor;

/// Segments across the profile (samples = SEGMENTS + 1).
pub const PROFILE_SEGMENTS: usize = 50;
/// Horizontal extent of the sampled profile.
pub const PROFILE_WIDTH: f32 = 1000.0;
/// Baseline offset applied to every profile sample.
pub const PROFILE_OFFSET: f32 = -100.0;
/// Y of the two base corners that close the shape.
pub const BASE_Y: f32 = -300.0;
/// |x| of the two base corners.
pub const BASE_HALF_WIDTH: f32 = 5000.0;
/// Minimum clearance between any profile sample and the base line.
const BASE_CLEARANCE: f32 = 1.0;

/// One generated mountain layer.
#[derive(Debug, Clone)]
pub struct MountainLayer {
    pub index: usize,
    pub descriptor: LayerDescriptor,
    /// Closed outline: profile samples left to right, then the right and left base corners.
    pub outline: Vec<Vec2>,
    pub geometry: Geometry,
}

impl MountainLayer {
    pub fn generate<R: Rng + ?Sized>(index: usize, descriptor: LayerDescriptor, rng: &mut R) -> Self {
        let h = descriptor.height;
        let mut outline: Vec<Vec2> = (0..=PROFILE_SEGMENTS)
            .map(|i| {
                let fi = i as f32;
                let x = (fi / PROFILE_SEGMENTS as f32 - 0.5) * PROFILE_WIDTH;
                let y = (fi * 0.1).sin() * h
                    + (fi * 0.05).sin() * h * 0.5
                    + rng.gen::<f32>() * h * 0.2
                    + PROFILE_OFFSET;
                Vec2::new(x, y.max(BASE_Y + BASE_CLEARANCE))
            })
            .collect();

        outline.push(Vec2::new(BASE_HALF_WIDTH, BASE_Y));
        outline.push(Vec2::new(-BASE_HALF_WIDTH, BASE_Y));

        let geometry = fill_outline(&outline).with_color(descriptor.rgba());

        Self {
            index,
            descriptor,
            outline,
            geometry,
        }
    }
}

/// Triangulate an outline produced by [`MountainLayer::generate`].
///
/// Each profile segment is extruded straight down to the base line as a quad;
/// the two wings out to the base corners are single triangles. This covers the
/// polygon exactly as long as every profile sample sits above the base line.
fn fill_outline(outline: &[Vec2]) -> Geometry {
    let n = outline.len() - 2;
    let profile = &outline[..n];
    let right = outline[n];
    let left = outline[n + 1];

    let mut vertices = Vec::with_capacity(n * 2 + 2);
    let vertex = |p: Vec2| {
        let uv = Vec2::new(
            (p.x + BASE_HALF_WIDTH) / (2.0 * BASE_HALF_WIDTH),
            (p.y - BASE_Y) / PROFILE_WIDTH,
        );
        SurfaceVertex::new(p.extend(0.0), Vec3::Z, uv)
    };

    // Even slots: profile top; odd slots: the same x on the base line.
    for p in profile {
        vertices.push(vertex(*p));
        vertices.push(vertex(Vec2::new(p.x, BASE_Y)));
    }
    let right_idx = vertices.len() as u32;
    vertices.push(vertex(right));
    let left_idx = vertices.len() as u32;
    vertices.push(vertex(left));

    let mut indices = Vec::with_capacity((n - 1) * 6 + 6);
    for i in 0..(n as u32 - 1) {
        let top_a = i * 2;
        let base_a = top_a + 1;
        let top_b = top_a + 2;
        let base_b = top_a + 3;
        indices.extend_from_slice(&[top_a, base_a, base_b, top_a, base_b, top_b]);
    }

    let last_top = (n as u32 - 1) * 2;
    indices.extend_from_slice(&[last_top, last_top + 1, right_idx]);
    indices.extend_from_slice(&[0, left_idx, 1]);

    Geometry { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::MOUNTAIN_LAYERS;

    fn layer(index: usize, seed: u64) -> MountainLayer {
        let mut rng = StdRng::seed_from_u64(seed);
        MountainLayer::generate(index, MOUNTAIN_LAYERS[index], &mut rng)
    }

    /// Profile samples, without the two base corners.
    fn profile(m: &MountainLayer) -> &[Vec2] {
        &m.outline[..m.outline.len() - 2]
    }

    #[test]
    fn outline_is_closed_by_base_corners() {
        for i in 0..MOUNTAIN_LAYERS.len() {
            let m = layer(i, 5);
            assert_eq!(m.outline.len(), PROFILE_SEGMENTS + 3);
            assert_eq!(m.outline[m.outline.len() - 2], Vec2::new(BASE_HALF_WIDTH, BASE_Y));
            assert_eq!(m.outline[m.outline.len() - 1], Vec2::new(-BASE_HALF_WIDTH, BASE_Y));
        }
    }

    #[test]
    fn profile_stays_above_base_even_with_extreme_amplitude() {
        let tall = LayerDescriptor { height: 10_000.0, ..MOUNTAIN_LAYERS[3] };
        let mut rng = StdRng::seed_from_u64(9);
        let m = MountainLayer::generate(3, tall, &mut rng);
        assert!(profile(&m).iter().all(|p| p.y > BASE_Y));
    }

    #[test]
    fn profile_is_sorted_left_to_right() {
        let m = layer(1, 2);
        let xs: Vec<f32> = profile(&m).iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(xs[0], -500.0);
        assert_eq!(xs[xs.len() - 1], 500.0);
    }

    #[test]
    fn fill_area_matches_polygon_area() {
        let m = layer(2, 13);
        let tri_area: f32 = m
            .geometry
            .indices
            .chunks(3)
            .map(|t| {
                let a = Vec2::from_slice(&m.geometry.vertices[t[0] as usize].position[..2]);
                let b = Vec2::from_slice(&m.geometry.vertices[t[1] as usize].position[..2]);
                let c = Vec2::from_slice(&m.geometry.vertices[t[2] as usize].position[..2]);
                ((b - a).perp_dot(c - a) * 0.5).abs()
            })
            .sum();

        // Shoelace formula over the closed outline.
        let shoelace: f32 = m
            .outline
            .iter()
            .zip(m.outline.iter().cycle().skip(1))
            .map(|(p, q)| p.perp_dot(*q))
            .sum::<f32>()
            .abs()
            * 0.5;

        assert!((tri_area - shoelace).abs() / shoelace < 1e-3, "{tri_area} vs {shoelace}");
    }

    #[test]
    fn color_carries_layer_opacity() {
        let m = layer(3, 1);
        assert!(m.geometry.vertices.iter().all(|v| v.color[3] == 0.4));
    }
}
