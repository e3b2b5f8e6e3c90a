//! # Terrain Generation
//!
//! Turns a chunk coordinate into a populated [`Chunk`].
//!
//! Generation happens in two stages:
//!
//! 1. A [`DensityEvaluator`] fills a density field for the chunk: four octaves of 3D
//!    gradient noise plus the height bias for the layer.
//! 2. A classification scan walks every column from the top down, deciding solidity
//!    from the field and picking the block from the depth below the last air gap.
//!
//! The scan treats layers the height bias forces to air or solid the same way no matter
//! which evaluator filled the field, so evaluators only have to agree on the layers
//! that actually sample noise.
//!
//! ## Evaluators
//!
//! * [`ScalarEvaluator`] - evaluates voxel by voxel on the calling thread, skipping
//!   forced layers entirely.
//! * [`LayeredEvaluator`] - evaluates the whole field one Y layer per unit of work,
//!   fanned out over scoped threads.

use std::sync::Arc;

use crate::engine_state::voxels::{
    block::Block,
    chunk::{Chunk, ChunkCreationIterator, ChunkPosition, CHUNK_HEIGHT, CHUNK_PLANE_SIZE, CHUNK_WIDTH},
};

pub mod height_bias;
mod layered;
pub mod noise;
mod scalar;

pub use height_bias::{ForcedLayer, HeightBiasCurve};
pub use layered::LayeredEvaluator;
pub use noise::NoiseGenerator;
pub use scalar::ScalarEvaluator;

/// Octave scales and weights, coarsest first.
const OCTAVES: [(f32, f32); 4] = [(128.0, 8.0), (64.0, 4.0), (32.0, 2.0), (16.0, 1.0)];
/// Sum of the octave weights, used to normalize the noise sum back to `[-1, 1]`.
const OCTAVE_WEIGHT_SUM: f32 = 15.0;

/// Blocks below the surface that are dirt rather than stone.
const DIRT_DEPTH: usize = 2;

/// Density of every voxel in a chunk, indexed like the chunk's block grid
/// (`y * 256 + x * 16 + z`).
pub type DensityField = Vec<f32>;

/// Everything needed to compute the density of a single voxel.
///
/// Shared read-only between evaluators and their worker threads.
#[derive(Debug)]
pub struct DensitySampler {
    noise: NoiseGenerator,
    curve: HeightBiasCurve,
}

impl DensitySampler {
    /// Creates a sampler for `seed`.
    pub fn new(seed: u64) -> Self {
        DensitySampler {
            noise: NoiseGenerator::new(seed),
            curve: HeightBiasCurve::new(),
        }
    }

    /// The height bias curve.
    pub fn curve(&self) -> &HeightBiasCurve {
        &self.curve
    }

    /// Density at world column `(world_x, world_z)` and local height `y`. Solid iff
    /// the result is non-negative.
    #[inline]
    pub fn density(&self, world_x: i32, y: usize, world_z: i32) -> f32 {
        let (x, y_f, z) = (world_x as f32, y as f32, world_z as f32);

        let mut sum = 0.0;
        for (scale, weight) in OCTAVES {
            sum += self.noise.sample_3d(x / scale, y_f / scale, z / scale) * weight;
        }

        sum / OCTAVE_WEIGHT_SUM + self.curve.bias(y)
    }
}

/// A strategy for filling the density field of a chunk.
///
/// Implementations may leave forced layers with any value; the classification scan
/// never reads them.
pub trait DensityEvaluator: Send + Sync {
    /// Short name, used in logs.
    fn name(&self) -> &'static str;

    /// Fills the density field for the chunk at `position`.
    fn evaluate(&self, sampler: &DensitySampler, position: ChunkPosition) -> DensityField;
}

/// Seeded terrain generator. Cheap to share between worker threads behind an `Arc`.
pub struct TerrainGenerator {
    seed: u64,
    sampler: DensitySampler,
    evaluator: Box<dyn DensityEvaluator>,
}

impl TerrainGenerator {
    /// Creates a generator using the given evaluator.
    pub fn new(seed: u64, evaluator: Box<dyn DensityEvaluator>) -> Self {
        log::info!(
            "Creating terrain generator with seed {} and {} evaluator",
            seed,
            evaluator.name()
        );
        TerrainGenerator {
            seed,
            sampler: DensitySampler::new(seed),
            evaluator,
        }
    }

    /// Convenience constructor for a shareable scalar generator.
    pub fn scalar(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed, Box::new(ScalarEvaluator)))
    }

    /// The seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The name of the active evaluator.
    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Generates a fully populated chunk at `position`.
    ///
    /// The returned chunk has no dirty subchunks and no neighbor links.
    pub fn generate(&self, position: ChunkPosition) -> Chunk {
        let field = self.evaluator.evaluate(&self.sampler, position);
        classify(position, self.sampler.curve(), &field)
    }
}

/// Walks every column top-down and turns densities into blocks.
///
/// The first solid voxel below air (or the top of the world) is grass, the next
/// [`DIRT_DEPTH`] are dirt and everything deeper is stone. Air resets the depth.
fn classify(position: ChunkPosition, curve: &HeightBiasCurve, field: &[f32]) -> Chunk {
    debug_assert_eq!(field.len(), CHUNK_PLANE_SIZE * CHUNK_HEIGHT as usize);

    let mut cci = ChunkCreationIterator::new(position);
    while !cci.is_complete() {
        let (local_x, local_z) = cci.current_column();
        let mut depth = 0;

        for y in (0..CHUNK_HEIGHT as usize).rev() {
            let solid = match curve.forced(y) {
                Some(ForcedLayer::Air) => false,
                Some(ForcedLayer::Solid) => true,
                None => field[Chunk::index(local_x, y, local_z)] >= 0.0,
            };

            let block = if !solid {
                depth = 0;
                Block::AIR
            } else {
                let block = match depth {
                    0 => Block::GRASS,
                    d if d <= DIRT_DEPTH => Block::DIRT,
                    _ => Block::STONE,
                };
                depth += 1;
                block
            };

            cci.push_block(block);
        }
    }

    cci.return_chunk()
}

/// World-space X of column `local_x` in the chunk at `position`.
#[inline]
fn world_x(position: ChunkPosition, local_x: usize) -> i32 {
    position.x * CHUNK_WIDTH + local_x as i32
}

/// World-space Z of column `local_z` in the chunk at `position`.
#[inline]
fn world_z(position: ChunkPosition, local_z: usize) -> i32 {
    position.y * CHUNK_WIDTH + local_z as i32
}

/// Fills one Y layer (`CHUNK_PLANE_SIZE` densities, indexed `x * 16 + z`).
fn fill_layer(sampler: &DensitySampler, position: ChunkPosition, y: usize, layer: &mut [f32]) {
    let width = CHUNK_WIDTH as usize;
    for local_x in 0..width {
        for local_z in 0..width {
            layer[local_x * width + local_z] = sampler.density(
                world_x(position, local_x),
                y,
                world_z(position, local_z),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    /// Returns the blocks of one column, top to bottom.
    fn column(chunk: &Chunk, x: usize, z: usize) -> Vec<Block> {
        (0..CHUNK_HEIGHT as usize)
            .rev()
            .map(|y| chunk.get_block_at(x, y, z))
            .collect()
    }

    fn assert_layering(chunk: &Chunk) {
        for x in 0..CHUNK_WIDTH as usize {
            for z in 0..CHUNK_WIDTH as usize {
                let mut depth = 0;
                for block in column(chunk, x, z) {
                    let expected_solid = match depth {
                        0 => Block::GRASS,
                        1 | 2 => Block::DIRT,
                        _ => Block::STONE,
                    };
                    if block.is_air() {
                        depth = 0;
                    } else {
                        assert_eq!(block, expected_solid, "column ({x}, {z}) depth {depth}");
                        depth += 1;
                    }
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = TerrainGenerator::scalar(1234);
        let a = generator.generate(Point2::new(-3, 7));
        let b = TerrainGenerator::scalar(1234).generate(Point2::new(-3, 7));
        assert!(a.blocks() == b.blocks());
    }

    #[test]
    fn generated_chunks_start_clean_and_unlinked() {
        let chunk = TerrainGenerator::scalar(0).generate(Point2::new(2, 2));
        assert_eq!(chunk.position(), Point2::new(2, 2));
        assert!(!chunk.is_dirty());
        assert!(!chunk.has_all_neighbors());
    }

    #[test]
    fn columns_follow_surface_layering() {
        for seed in [0, 1, 99] {
            let chunk = TerrainGenerator::scalar(seed).generate(Point2::new(seed as i32, -1));
            assert_layering(&chunk);
        }
    }

    #[test]
    fn forced_air_layers_are_empty() {
        let generator = TerrainGenerator::scalar(5);
        let chunk = generator.generate(Point2::new(0, 0));
        let lowest = DensitySampler::new(5)
            .curve()
            .lowest_forced_air()
            .expect("curve reaches forced air");
        for y in lowest..CHUNK_HEIGHT as usize {
            for x in 0..CHUNK_WIDTH as usize {
                for z in 0..CHUNK_WIDTH as usize {
                    assert!(chunk.get_block_at(x, y, z).is_air());
                }
            }
        }
    }

    #[test]
    fn golden_surface_for_seed_zero() {
        let chunk = TerrainGenerator::scalar(0).generate(Point2::new(0, 0));

        let surface = (0..CHUNK_HEIGHT as usize)
            .rev()
            .find(|&y| !chunk.get_block_at(0, y, 0).is_air())
            .expect("column (0, 0) has ground");
        assert!(
            (136..=155).contains(&surface),
            "surface of column (0, 0) at {surface}"
        );

        assert_eq!(chunk.get_block_at(0, surface, 0), Block::GRASS);
        assert_eq!(chunk.get_block_at(0, surface - 1, 0), Block::DIRT);
        assert_eq!(chunk.get_block_at(0, surface - 2, 0), Block::DIRT);
        for y in 0..surface - 2 {
            assert_eq!(chunk.get_block_at(0, y, 0), Block::STONE, "y = {y}");
        }
    }

    #[test]
    fn scalar_and_layered_agree() {
        let scalar = TerrainGenerator::new(77, Box::new(ScalarEvaluator));
        let layered = TerrainGenerator::new(77, Box::new(LayeredEvaluator::new(3)));
        for position in [Point2::new(0, 0), Point2::new(-5, 12), Point2::new(40, -40)] {
            let a = scalar.generate(position);
            let b = layered.generate(position);
            assert!(a.blocks() == b.blocks(), "evaluators differ at {position:?}");
        }
    }
}
