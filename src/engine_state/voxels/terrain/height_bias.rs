//! Height bias curve.
//!
//! The bias is added to the noise sum before the solidity test. It pushes low layers
//! toward solid and high layers toward air, shaping where the surface can appear.

use crate::engine_state::voxels::chunk::CHUNK_HEIGHT;

use super::noise::{fade, lerp};

/// Anchor heights, paired with [`BIAS_ANCHOR_VALUES`].
const BIAS_ANCHOR_HEIGHTS: [i32; 5] = [0, 64, 128, 175, CHUNK_HEIGHT];
/// Bias at each anchor height.
const BIAS_ANCHOR_VALUES: [f32; 5] = [0.5, 0.15, 0.33, -1.0, -1.0];

/// Biases at or below this are always air; noise is not evaluated.
pub const FORCED_AIR_BIAS: f32 = -0.99;
/// Biases at or above this are always solid; noise is not evaluated.
pub const FORCED_SOLID_BIAS: f32 = 0.99;

/// A layer whose solidity does not depend on noise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ForcedLayer {
    Air,
    Solid,
}

/// Per-layer bias, precomputed once over the full world height.
#[derive(Clone, Debug)]
pub struct HeightBiasCurve {
    biases: Box<[f32]>,
}

impl HeightBiasCurve {
    /// Interpolates between the anchors with the quintic fade curve.
    pub fn new() -> Self {
        let biases = (0..CHUNK_HEIGHT)
            .map(|y| {
                let upper = BIAS_ANCHOR_HEIGHTS
                    .iter()
                    .position(|&height| height > y)
                    .unwrap_or(BIAS_ANCHOR_HEIGHTS.len() - 1);
                let lower = upper - 1;

                let t = (y - BIAS_ANCHOR_HEIGHTS[lower]) as f32
                    / (BIAS_ANCHOR_HEIGHTS[upper] - BIAS_ANCHOR_HEIGHTS[lower]) as f32;
                lerp(
                    BIAS_ANCHOR_VALUES[lower],
                    BIAS_ANCHOR_VALUES[upper],
                    fade(t),
                )
            })
            .collect();

        HeightBiasCurve { biases }
    }

    /// Bias for local height `y`.
    ///
    /// # Panics
    /// Panics if `y` is outside the world height.
    #[inline]
    pub fn bias(&self, y: usize) -> f32 {
        self.biases[y]
    }

    /// Whether layer `y` is decided by the bias alone.
    #[inline]
    pub fn forced(&self, y: usize) -> Option<ForcedLayer> {
        let bias = self.biases[y];
        if bias <= FORCED_AIR_BIAS {
            Some(ForcedLayer::Air)
        } else if bias >= FORCED_SOLID_BIAS {
            Some(ForcedLayer::Solid)
        } else {
            None
        }
    }

    /// Lowest layer that is forced air, if any.
    pub fn lowest_forced_air(&self) -> Option<usize> {
        (0..self.biases.len()).find(|&y| self.forced(y) == Some(ForcedLayer::Air))
    }
}

impl Default for HeightBiasCurve {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_hit_exactly() {
        let curve = HeightBiasCurve::new();
        assert_eq!(curve.bias(0), 0.5);
        assert_eq!(curve.bias(64), 0.15);
        assert_eq!(curve.bias(128), 0.33);
        assert_eq!(curve.bias(175), -1.0);
        assert_eq!(curve.bias(383), -1.0);
    }

    #[test]
    fn upper_layers_are_forced_air() {
        let curve = HeightBiasCurve::new();
        let lowest = curve.lowest_forced_air().expect("curve reaches -1");
        assert!((165..=175).contains(&lowest), "lowest forced air layer {lowest}");
        for y in lowest..CHUNK_HEIGHT as usize {
            assert_eq!(curve.forced(y), Some(ForcedLayer::Air));
        }
        for y in 0..128 {
            assert_eq!(curve.forced(y), None);
        }
    }

    #[test]
    fn bias_falls_between_neighboring_anchors() {
        let curve = HeightBiasCurve::new();
        for y in 0..64 {
            assert!((0.15..=0.5).contains(&curve.bias(y)));
        }
        for y in 128..175 {
            assert!((-1.0..=0.33).contains(&curve.bias(y)));
        }
    }
}
