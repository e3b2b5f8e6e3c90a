//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates chunk data on a
//! worker thread. The task is scheduled when a coordinate inside the view window has
//! no chunk yet.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::{JobKind, Task, TaskTarget},
    voxels::{
        chunk::{Chunk, ChunkPosition},
        terrain::TerrainGenerator,
    },
    WorldTaskResult,
};

/// A task that generates chunk data asynchronously.
///
/// The generated chunk is not visible to anyone until the coordinating thread drains
/// the result and inserts it into the world.
pub struct ChunkGenerationTask {
    /// The shared terrain generator
    generator: Arc<TerrainGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPosition,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The terrain generator shared by all generation jobs
    /// * `position` - The chunk coordinates where the chunk should be generated
    pub fn new(generator: Arc<TerrainGenerator>, position: ChunkPosition) -> Self {
        ChunkGenerationTask {
            generator,
            position,
        }
    }
}

impl Task<WorldTaskResult> for ChunkGenerationTask {
    fn describe(&self) -> String {
        format!("generate chunk ({}, {})", self.position.x, self.position.y)
    }

    fn target(&self) -> Option<TaskTarget> {
        Some(TaskTarget {
            kind: JobKind::Generation,
            position: self.position,
        })
    }

    fn process(self: Box<Self>) -> WorldTaskResult {
        WorldTaskResult::Generated(ChunkGenerationResult {
            chunk: self.generator.generate(self.position),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationResult {
    /// The fully populated chunk, clean and unlinked
    pub chunk: Chunk,
}
