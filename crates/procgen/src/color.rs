//! Color conversions. Every helper returns linear RGB with channels in [0, 1].

use glam::Vec3;

/// Convert a single sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear RGB from a 0xRRGGBB sRGB hex value.
pub fn from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

/// Linear RGB from sRGB hue/saturation/lightness, each in [0, 1].
pub fn from_hsl(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = srgb_to_linear(l);
        return Vec3::splat(v);
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    }

    Vec3::new(
        srgb_to_linear(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        srgb_to_linear(hue_to_rgb(p, q, h)),
        srgb_to_linear(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_primaries() {
        assert!(from_hex(0xff0000).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        assert_eq!(from_hex(0x000000), Vec3::ZERO);
        assert!(from_hex(0xffffff).abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn hsl_grey_has_equal_channels() {
        let c = from_hsl(0.0, 0.0, 0.9);
        assert_eq!(c.x, c.y);
        assert_eq!(c.y, c.z);
        assert!(c.x > 0.7 && c.x < 0.9);
    }

    #[test]
    fn warm_tint_is_red_dominant_and_cool_is_blue_dominant() {
        let warm = from_hsl(0.08, 0.5, 0.8);
        let cool = from_hsl(0.6, 0.5, 0.8);
        assert!(warm.x > warm.z);
        assert!(cool.z > cool.x);
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for i in 0..=20 {
            let h = i as f32 / 20.0;
            let c = from_hsl(h, 1.0, 0.5);
            for v in c.to_array() {
                assert!((0.0..=1.0).contains(&v), "h={h} -> {c:?}");
            }
        }
    }
}
