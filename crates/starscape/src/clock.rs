//! Animation clock: advances shader time, eases the camera toward the scroll
//! target, and sways the mountain layers.

use engine_core::Time;
use glam::Vec3;
use renderer::Material;

use crate::scene::SceneContext;

/// Fraction of the remaining distance to the target covered each frame.
pub const CAMERA_SMOOTHING: f32 = 0.05;
/// Fixed point the camera keeps looking at while it moves.
pub const LOOK_AT_ANCHOR: Vec3 = Vec3::new(0.0, 10.0, -600.0);
/// The nebula drifts at half speed.
pub const NEBULA_TIME_SCALE: f32 = 0.5;
/// Resting height of the mountain layers under parallax.
pub const PARALLAX_BASE_Y: f32 = 50.0;

/// Seconds since mount, continuous across frames.
#[derive(Debug, Default)]
pub struct AnimationClock {
    time: Time,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to now and return elapsed seconds.
    pub fn advance(&mut self) -> f32 {
        self.time.update();
        self.time.elapsed_seconds()
    }
}

/// Idle float added on top of the smoothed camera position.
pub fn camera_float(t: f32) -> Vec3 {
    Vec3::new((t * 0.1).sin() * 2.0, (t * 0.15).cos(), 0.0)
}

/// Parallax multiplier of a mountain layer. Nearer layers get the smaller factor.
pub fn parallax_factor(layer: usize) -> f32 {
    1.0 + layer as f32 * 0.5
}

/// Parallax x/y offset of a mountain layer at time `t`.
pub fn parallax_offset(layer: usize, t: f32) -> (f32, f32) {
    let factor = parallax_factor(layer);
    ((t * 0.1).sin() * 2.0 * factor, PARALLAX_BASE_Y + (t * 0.15).cos() * factor)
}

/// One frame of animation at time `t` (seconds since mount). Rendering is left to the caller.
pub fn tick<B>(ctx: &mut SceneContext<B>, t: f32) {
    for object in ctx.scene.objects_mut() {
        object.time = match object.material {
            Material::Nebula { .. } => t * NEBULA_TIME_SCALE,
            _ => t,
        };
    }

    if let Some(target) = ctx.camera_target {
        ctx.smoothed_position += (target - ctx.smoothed_position) * CAMERA_SMOOTHING;
        ctx.camera.set_position(ctx.smoothed_position + camera_float(t));
        ctx.camera.look_at(LOOK_AT_ANCHOR);
    }

    for (layer, id) in ctx.mountains.iter().enumerate() {
        if let Some(object) = ctx.scene.get_mut(*id) {
            let (x, y) = parallax_offset(layer, t);
            object.transform.position.x = x;
            object.transform.position.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::testing::populated;
    use crate::scene::{INITIAL_CAMERA_POSITION, INITIAL_SMOOTHED_POSITION};

    #[test]
    fn time_reaches_every_object_and_nebula_runs_at_half_rate() {
        let mut ctx = populated(1);
        tick(&mut ctx, 4.0);
        for object in ctx.scene.objects() {
            let expected = if Some(object.id) == ctx.nebula { 2.0 } else { 4.0 };
            assert_eq!(object.time, expected, "{}", object.name);
        }
    }

    #[test]
    fn camera_stays_put_without_target() {
        let mut ctx = populated(2);
        tick(&mut ctx, 3.0);
        assert_eq!(ctx.camera.position(), INITIAL_CAMERA_POSITION);
        assert_eq!(ctx.smoothed_position, INITIAL_SMOOTHED_POSITION);
    }

    #[test]
    fn smoothing_closes_distance_without_overshoot() {
        let mut ctx = populated(3);
        let target = Vec3::new(0.0, 40.0, -50.0);
        ctx.camera_target = Some(target);
        let mut prev = (ctx.smoothed_position - target).length();
        for frame in 0..200 {
            tick(&mut ctx, frame as f32 / 60.0);
            let dist = (ctx.smoothed_position - target).length();
            assert!(dist < prev, "frame {frame}: {dist} >= {prev}");
            // Same side of the target on every axis.
            assert!(ctx.smoothed_position.z >= target.z);
            assert!(ctx.smoothed_position.y <= target.y);
            prev = dist;
        }
    }

    #[test]
    fn first_step_moves_five_percent() {
        let mut ctx = populated(4);
        let target = Vec3::new(0.0, 30.0, 300.0);
        ctx.camera_target = Some(target);
        tick(&mut ctx, 0.0);
        assert!((ctx.smoothed_position.z - 110.0).abs() < 1e-4);
        let expected = ctx.smoothed_position + camera_float(0.0);
        assert!(ctx.camera.position().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn camera_faces_anchor_after_motion() {
        let mut ctx = populated(5);
        ctx.camera_target = Some(Vec3::new(0.0, 50.0, -700.0));
        tick(&mut ctx, 1.0);
        let expected = (LOOK_AT_ANCHOR - ctx.camera.position()).normalize();
        assert!(ctx.camera.forward().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn parallax_moves_x_y_but_not_depth() {
        let mut ctx = populated(6);
        let depths: Vec<f32> = ctx
            .mountains
            .iter()
            .map(|id| ctx.scene.get(*id).unwrap().transform.position.z)
            .collect();
        let t = 7.5;
        tick(&mut ctx, t);
        for (i, id) in ctx.mountains.iter().enumerate() {
            let p = ctx.scene.get(*id).unwrap().transform.position;
            let f = 1.0 + i as f32 * 0.5;
            assert!((p.x - (t * 0.1).sin() * 2.0 * f).abs() < 1e-5);
            assert!((p.y - (50.0 + (t * 0.15).cos() * f)).abs() < 1e-5);
            assert_eq!(p.z, depths[i]);
        }
    }

    #[test]
    fn farther_layers_sway_more() {
        assert!(parallax_factor(3) > parallax_factor(0));
        assert_eq!(parallax_factor(0), 1.0);
        assert_eq!(parallax_offset(0, 0.0), (0.0, 51.0));
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = AnimationClock::new();
        let a = clock.advance();
        let b = clock.advance();
        assert!(b >= a);
    }
}
