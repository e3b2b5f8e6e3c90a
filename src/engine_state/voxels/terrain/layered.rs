//! Layer-parallel density evaluation.
//!
//! The field is computed in one batch, one Y layer per unit of work, with the layers
//! split into contiguous bands across scoped worker threads. Every layer is evaluated,
//! forced or not, so the batch has a fixed shape regardless of the height curve.

use std::num::NonZeroUsize;
use std::thread;

use crate::engine_state::voxels::chunk::{ChunkPosition, CHUNK_HEIGHT, CHUNK_PLANE_SIZE};

use super::{fill_layer, DensityEvaluator, DensityField, DensitySampler};

/// Evaluates the whole field as a batch of layers fanned out over threads.
#[derive(Copy, Clone, Debug)]
pub struct LayeredEvaluator {
    threads: NonZeroUsize,
}

impl LayeredEvaluator {
    /// Creates an evaluator that splits each chunk over `threads` threads. Zero is
    /// treated as one.
    pub fn new(threads: usize) -> Self {
        LayeredEvaluator {
            threads: NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Number of threads a chunk is split over.
    pub fn threads(&self) -> usize {
        self.threads.get()
    }
}

impl Default for LayeredEvaluator {
    fn default() -> Self {
        Self::new(
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        )
    }
}

impl DensityEvaluator for LayeredEvaluator {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn evaluate(&self, sampler: &DensitySampler, position: ChunkPosition) -> DensityField {
        let height = CHUNK_HEIGHT as usize;
        let mut field = vec![0.0; CHUNK_PLANE_SIZE * height];
        let layers_per_band = height.div_ceil(self.threads.get());

        thread::scope(|scope| {
            for (band, slice) in field
                .chunks_mut(layers_per_band * CHUNK_PLANE_SIZE)
                .enumerate()
            {
                scope.spawn(move || {
                    let first_layer = band * layers_per_band;
                    for (offset, layer) in slice.chunks_mut(CHUNK_PLANE_SIZE).enumerate() {
                        fill_layer(sampler, position, first_layer + offset, layer);
                    }
                });
            }
        });

        field
    }
}
