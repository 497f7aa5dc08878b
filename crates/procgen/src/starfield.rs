//! Star shells: points sampled uniformly over a thick spherical shell.
//!
//! Each shell is drawn as soft additive sprites and spun about the view axis
//! by the star shader; the rate comes from [`StarShellDescriptor::angular_speed`].

use glam::Vec3;
use rand::prelude::*;

use crate::color;
use crate::layers::StarShellDescriptor;

/// Default number of stars per shell.
pub const DEFAULT_STARS_PER_SHELL: usize = 5000;

/// A single star sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Linear RGB.
    pub color: Vec3,
    /// Sprite size before perspective attenuation.
    pub size: f32,
}

/// Sampling parameters shared by all shells.
#[derive(Debug, Clone, Copy)]
pub struct StarFieldParams {
    pub stars_per_shell: usize,
    pub min_radius: f32,
    pub radius_span: f32,
    pub min_size: f32,
    pub size_span: f32,
}

impl Default for StarFieldParams {
    fn default() -> Self {
        Self {
            stars_per_shell: DEFAULT_STARS_PER_SHELL,
            min_radius: 200.0,
            radius_span: 800.0,
            min_size: 0.5,
            size_span: 2.0,
        }
    }
}

/// One generated star shell.
#[derive(Debug, Clone)]
pub struct StarShell {
    pub descriptor: StarShellDescriptor,
    pub stars: Vec<Star>,
}

/// Color bucket for a uniform `choice` in [0, 1): 70% near-white, 20% warm, 10% cool.
/// `jitter` in [0, 1) varies the lightness of the white bucket.
pub fn star_color(choice: f32, jitter: f32) -> Vec3 {
    if choice < 0.7 {
        color::from_hsl(0.0, 0.0, 0.8 + jitter * 0.2)
    } else if choice < 0.9 {
        color::from_hsl(0.08, 0.5, 0.8)
    } else {
        color::from_hsl(0.6, 0.5, 0.8)
    }
}

impl StarShell {
    pub fn generate<R: Rng + ?Sized>(
        descriptor: StarShellDescriptor,
        params: &StarFieldParams,
        rng: &mut R,
    ) -> Self {
        let stars = (0..params.stars_per_shell)
            .map(|_| {
                let radius = params.min_radius + rng.gen::<f32>() * params.radius_span;
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                // acos of a uniform [-1, 1] sample gives uniform coverage per solid angle.
                let phi = (rng.gen::<f32>() * 2.0 - 1.0).clamp(-1.0, 1.0).acos();

                let position = Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                );

                let choice = rng.gen::<f32>();
                let jitter = rng.gen::<f32>();
                let size = rng.gen::<f32>() * params.size_span + params.min_size;

                Star {
                    position,
                    color: star_color(choice, jitter),
                    size,
                }
            })
            .collect();

        Self { descriptor, stars }
    }
}
