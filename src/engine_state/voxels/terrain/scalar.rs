//! Per-voxel density evaluation on the calling thread.

use crate::engine_state::voxels::chunk::{
    Chunk, ChunkPosition, CHUNK_HEIGHT, CHUNK_PLANE_SIZE, CHUNK_WIDTH,
};

use super::{world_x, world_z, DensityEvaluator, DensityField, DensitySampler};

/// Evaluates density one voxel at a time, skipping layers the height bias forces.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarEvaluator;

impl DensityEvaluator for ScalarEvaluator {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn evaluate(&self, sampler: &DensitySampler, position: ChunkPosition) -> DensityField {
        let mut field = vec![0.0; CHUNK_PLANE_SIZE * CHUNK_HEIGHT as usize];
        let width = CHUNK_WIDTH as usize;

        for local_x in 0..width {
            for local_z in 0..width {
                let (x, z) = (world_x(position, local_x), world_z(position, local_z));
                for y in 0..CHUNK_HEIGHT as usize {
                    if sampler.curve().forced(y).is_some() {
                        continue;
                    }
                    field[Chunk::index(local_x, y, local_z)] = sampler.density(x, y, z);
                }
            }
        }

        field
    }
}
