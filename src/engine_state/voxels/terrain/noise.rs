//! Seeded gradient noise.
//!
//! A classic lattice gradient noise: each integer lattice corner picks one of sixteen
//! fixed gradients through a seeded permutation table, the dot products with the
//! corner-to-sample offsets are blended with the quintic fade curve. Output lies in
//! roughly `[-1, 1]`.
//!
//! Everything is a pure function of the seed and the sample point, so results are
//! bit-identical no matter which thread samples or in what order.

/// Gradient vectors selected by the lattice hash. The last four repeat entries from the
/// first twelve so the table can be indexed with a 4-bit mask.
const GRADIENTS: [[f32; 3]; 16] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [0.0, -1.0, -1.0],
];

/// Knuth's multiplicative hash constant, used to scatter lattice coordinates before
/// they index the permutation table.
const LATTICE_HASH_MULTIPLIER: u32 = 2_654_435_761;

/// Number of entries in the permutation table.
pub const PERMUTATION_SIZE: usize = 256;

/// Quintic smoothstep `6t⁵ − 15t⁴ + 10t³`.
///
/// Monotonic on `[0, 1]` with `fade(0) = 0` and `fade(1) = 1`, and flat first and
/// second derivatives at both ends.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lattice_hash(coordinate: i32) -> i32 {
    coordinate.wrapping_mul(LATTICE_HASH_MULTIPLIER as i32)
}

/// Deterministic 2D/3D gradient noise sampler.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    permutation: [u8; PERMUTATION_SIZE],
}

impl NoiseGenerator {
    /// Builds the permutation table with a Fisher–Yates shuffle driven by `seed`.
    pub fn new(seed: u64) -> Self {
        let mut permutation = [0u8; PERMUTATION_SIZE];
        for (index, entry) in permutation.iter_mut().enumerate() {
            *entry = index as u8;
        }

        let mut rng = fastrand::Rng::with_seed(seed);
        for i in (1..PERMUTATION_SIZE).rev() {
            let j = (rng.u64(..) % (i as u64 + 1)) as usize;
            permutation.swap(i, j);
        }

        NoiseGenerator { permutation }
    }

    /// The shuffled permutation table.
    pub fn permutation(&self) -> &[u8; PERMUTATION_SIZE] {
        &self.permutation
    }

    #[inline]
    fn permute(&self, value: i32) -> i32 {
        self.permutation[(value & 255) as usize] as i32
    }

    #[inline]
    fn gradient_2d(&self, x0: i32, y0: i32) -> &[f32; 3] {
        let index = self.permute(self.permute(lattice_hash(x0)).wrapping_add(lattice_hash(y0)));
        &GRADIENTS[(index & 15) as usize]
    }

    #[inline]
    fn gradient_3d(&self, x0: i32, y0: i32, z0: i32) -> &[f32; 3] {
        let index = self.permute(
            self.permute(self.permute(lattice_hash(x0)).wrapping_add(lattice_hash(y0)))
                .wrapping_add(lattice_hash(z0)),
        );
        &GRADIENTS[(index & 15) as usize]
    }

    #[inline]
    fn dot_gradient_2d(&self, x0: i32, y0: i32, x: f32, y: f32) -> f32 {
        let gradient = self.gradient_2d(x0, y0);
        (x - x0 as f32) * gradient[0] + (y - y0 as f32) * gradient[1]
    }

    #[inline]
    fn dot_gradient_3d(&self, x0: i32, y0: i32, z0: i32, x: f32, y: f32, z: f32) -> f32 {
        let gradient = self.gradient_3d(x0, y0, z0);
        (x - x0 as f32) * gradient[0]
            + (y - y0 as f32) * gradient[1]
            + (z - z0 as f32) * gradient[2]
    }

    /// Samples 2D noise at `(x, y)`.
    pub fn sample_2d(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);

        let tx = fade(x - x0 as f32);
        let ty = fade(y - y0 as f32);

        let n00 = self.dot_gradient_2d(x0, y0, x, y);
        let n10 = self.dot_gradient_2d(x1, y0, x, y);
        let n01 = self.dot_gradient_2d(x0, y1, x, y);
        let n11 = self.dot_gradient_2d(x1, y1, x, y);

        lerp(lerp(n00, n10, tx), lerp(n01, n11, tx), ty)
    }

    /// Samples 3D noise at `(x, y, z)`.
    pub fn sample_3d(&self, x: f32, y: f32, z: f32) -> f32 {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let z0 = z.floor() as i32;
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);
        let z1 = z0.wrapping_add(1);

        let tx = fade(x - x0 as f32);
        let ty = fade(y - y0 as f32);
        let tz = fade(z - z0 as f32);

        let n000 = self.dot_gradient_3d(x0, y0, z0, x, y, z);
        let n100 = self.dot_gradient_3d(x1, y0, z0, x, y, z);
        let n010 = self.dot_gradient_3d(x0, y1, z0, x, y, z);
        let n110 = self.dot_gradient_3d(x1, y1, z0, x, y, z);
        let n001 = self.dot_gradient_3d(x0, y0, z1, x, y, z);
        let n101 = self.dot_gradient_3d(x1, y0, z1, x, y, z);
        let n011 = self.dot_gradient_3d(x0, y1, z1, x, y, z);
        let n111 = self.dot_gradient_3d(x1, y1, z1, x, y, z);

        lerp(
            lerp(lerp(n000, n100, tx), lerp(n010, n110, tx), ty),
            lerp(lerp(n001, n101, tx), lerp(n011, n111, tx), ty),
            tz,
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn permutation_is_a_shuffle() {
        let generator = NoiseGenerator::new(42);
        let mut sorted = *generator.permutation();
        sorted.sort_unstable();
        for (index, value) in sorted.iter().enumerate() {
            assert_eq!(*value as usize, index);
        }
        assert_ne!(generator.permutation(), NoiseGenerator::new(43).permutation());
    }

    #[test]
    fn fade_endpoints_and_monotonicity() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-6);

        let mut previous = fade(0.0);
        for step in 1..=1000 {
            let current = fade(step as f32 / 1000.0);
            assert!(current >= previous, "fade decreased at step {step}");
            previous = current;
        }
    }

    #[test]
    fn samples_stay_in_range() {
        let generator = NoiseGenerator::new(0);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..10_000 {
            let x = rng.f32() * 2000.0 - 1000.0;
            let y = rng.f32() * 2000.0 - 1000.0;
            let z = rng.f32() * 2000.0 - 1000.0;

            let value = generator.sample_3d(x, y, z);
            assert!((-1.01..=1.01).contains(&value), "3d sample {value} out of range");
            let value = generator.sample_2d(x, z);
            assert!((-1.01..=1.01).contains(&value), "2d sample {value} out of range");
        }
    }

    #[test]
    fn lattice_points_are_zero() {
        let generator = NoiseGenerator::new(9);
        assert_eq!(generator.sample_3d(3.0, -7.0, 12.0), 0.0);
        assert_eq!(generator.sample_2d(-5.0, 8.0), 0.0);
    }

    proptest! {
        #[test]
        fn sampling_is_deterministic(
            seed in any::<u64>(),
            x in -10_000.0f32..10_000.0,
            y in -10_000.0f32..10_000.0,
            z in -10_000.0f32..10_000.0,
        ) {
            let a = NoiseGenerator::new(seed);
            let b = NoiseGenerator::new(seed);
            prop_assert_eq!(a.sample_3d(x, y, z).to_bits(), b.sample_3d(x, y, z).to_bits());
            prop_assert_eq!(a.sample_2d(x, z).to_bits(), b.sample_2d(x, z).to_bits());
        }

        #[test]
        fn sampling_stays_in_range(
            seed in any::<u64>(),
            x in -10_000.0f32..10_000.0,
            y in -10_000.0f32..10_000.0,
            z in -10_000.0f32..10_000.0,
        ) {
            let value = NoiseGenerator::new(seed).sample_3d(x, y, z);
            prop_assert!((-1.01..=1.01).contains(&value));
        }
    }
}
