//! Layer descriptors: the immutable configuration behind each depth layer.

use crate::color;

/// Configuration for one mountain silhouette layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDescriptor {
    /// Depth offset (negative = further into the scene).
    pub distance: f32,
    /// Profile amplitude.
    pub height: f32,
    /// Base color as 0xRRGGBB (sRGB).
    pub color: u32,
    /// Layer opacity in [0, 1].
    pub opacity: f32,
}

impl LayerDescriptor {
    /// Linear RGBA color of the layer.
    pub fn rgba(&self) -> [f32; 4] {
        let c = color::from_hex(self.color);
        [c.x, c.y, c.z, self.opacity.clamp(0.0, 1.0)]
    }
}

/// Mountain layers, front to back. Farther layers are taller and hazier.
pub const MOUNTAIN_LAYERS: [LayerDescriptor; 4] = [
    LayerDescriptor { distance: -50.0, height: 60.0, color: 0x1a1a2e, opacity: 1.0 },
    LayerDescriptor { distance: -100.0, height: 80.0, color: 0x16213e, opacity: 0.8 },
    LayerDescriptor { distance: -150.0, height: 100.0, color: 0x0f3460, opacity: 0.6 },
    LayerDescriptor { distance: -200.0, height: 120.0, color: 0x0a4668, opacity: 0.4 },
];

/// A star shell is only distinguished by its depth index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarShellDescriptor {
    pub depth: u32,
}

impl StarShellDescriptor {
    /// Rotation rate about the view axis in radians per second. Deeper shells turn slower.
    pub fn angular_speed(&self) -> f32 {
        0.05 * (1.0 - self.depth as f32 * 0.3)
    }
}

pub const STAR_SHELLS: [StarShellDescriptor; 3] = [
    StarShellDescriptor { depth: 0 },
    StarShellDescriptor { depth: 1 },
    StarShellDescriptor { depth: 2 },
];

/// Index of the back-most mountain layer (the one the nebula tracks).
pub fn back_most_layer(layers: &[LayerDescriptor]) -> Option<usize> {
    layers
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mountain_layers_recede_and_fade() {
        for pair in MOUNTAIN_LAYERS.windows(2) {
            assert!(pair[1].distance < pair[0].distance);
            assert!(pair[1].opacity < pair[0].opacity);
            assert!(pair[1].height > pair[0].height);
        }
    }

    #[test]
    fn back_most_layer_is_last() {
        assert_eq!(back_most_layer(&MOUNTAIN_LAYERS), Some(3));
        assert_eq!(back_most_layer(&[]), None);
    }

    #[test]
    fn deeper_shells_rotate_slower() {
        let speeds: Vec<f32> = STAR_SHELLS.iter().map(|s| s.angular_speed()).collect();
        assert!(speeds[0] > speeds[1] && speeds[1] > speeds[2]);
        assert!(speeds[2] > 0.0);
    }
}
