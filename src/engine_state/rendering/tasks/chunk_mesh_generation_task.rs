//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which regenerates the geometry
//! of a chunk's dirty subchunks on a worker, keeping the coordinating thread
//! responsive while the culling runs.
//!
//! Meshing jobs only ever take read locks. The dirty set is taken on the coordinating
//! thread when the job is dispatched, and the five chunks a job reads are locked in
//! ascending coordinate order, the same order for every job.

use std::sync::{Arc, RwLockReadGuard};

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{ChunkMesher, ChunkNeighborhood, SubchunkMesh},
        task_management::task::{JobKind, Task, TaskTarget},
        voxels::{
            block::block_side::BlockSide,
            chunk::{Chunk, ChunkPosition},
        },
        WorldTaskResult,
    },
};

/// A task that meshes the dirty subchunks of one chunk.
///
/// The task holds shared handles to the chunk and its four neighbors, taken when the
/// job was dispatched, so the chunks stay alive even if the world evicts them while
/// the job runs.
pub struct ChunkMeshGenerationTask {
    /// Shared mesher (atlas layout)
    mesher: Arc<ChunkMesher>,
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
    /// Neighbor chunks, ordered north, east, south, west
    neighbors: [MtResource<Chunk>; 4],
    /// Position of `chunk`, kept for reporting without taking a lock
    position: ChunkPosition,
    /// Subchunks to regenerate, taken from the chunk at dispatch
    dirty: Vec<usize>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `mesher` - The mesher shared by all meshing jobs
    /// * `position` - Position of the chunk
    /// * `chunk` - The chunk that needs mesh generation
    /// * `neighbors` - Its four horizontal neighbors, ordered north, east, south, west
    /// * `dirty` - The dirty subchunk indices, already cleared on the chunk
    pub fn new(
        mesher: Arc<ChunkMesher>,
        position: ChunkPosition,
        chunk: MtResource<Chunk>,
        neighbors: [MtResource<Chunk>; 4],
        dirty: Vec<usize>,
    ) -> Self {
        ChunkMeshGenerationTask {
            mesher,
            chunk,
            neighbors,
            position,
            dirty,
        }
    }
}

/// Indices into `positions` in ascending `(x, z)` order.
fn lock_order(positions: &[ChunkPosition; 5]) -> [usize; 5] {
    let mut order = [0, 1, 2, 3, 4];
    order.sort_by_key(|&index| (positions[index].x, positions[index].y));
    order
}

impl Task<WorldTaskResult> for ChunkMeshGenerationTask {
    fn describe(&self) -> String {
        format!("mesh chunk ({}, {})", self.position.x, self.position.y)
    }

    fn target(&self) -> Option<TaskTarget> {
        Some(TaskTarget {
            kind: JobKind::Meshing,
            position: self.position,
        })
    }

    /// Culls each dirty subchunk while holding read locks on the chunk and its
    /// neighbors.
    ///
    /// An edit that lands after dispatch re-dirties its subchunk, so it is picked up
    /// by the next meshing job instead of being lost.
    fn process(self: Box<Self>) -> WorldTaskResult {
        let ChunkMeshGenerationTask {
            mesher,
            chunk,
            neighbors,
            position,
            dirty,
        } = *self;

        let [north, east, south, west] = &neighbors;
        let handles = [&chunk, north, east, south, west];
        let [north_at, east_at, south_at, west_at] =
            BlockSide::horizontal().map(|side| position + side.chunk_offset());
        let positions = [position, north_at, east_at, south_at, west_at];

        let mut guards: [Option<RwLockReadGuard<'_, Chunk>>; 5] = Default::default();
        for index in lock_order(&positions) {
            guards[index] = Some(handles[index].get());
        }
        let [Some(center), Some(north), Some(east), Some(south), Some(west)] = &guards else {
            unreachable!("every chunk was locked above");
        };

        let neighborhood = ChunkNeighborhood::new(
            &**center,
            [Some(&**north), Some(&**east), Some(&**south), Some(&**west)],
        );
        let meshes = dirty
            .into_iter()
            .map(|index| (index, mesher.mesh_subchunk(&neighborhood, index)))
            .collect();
        drop(guards);

        WorldTaskResult::Meshed(ChunkMeshResult {
            position,
            chunk,
            meshes,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshResult {
    /// Position of the meshed chunk
    pub position: ChunkPosition,
    /// The chunk that was meshed. A result whose chunk is no longer the one stored at
    /// `position` is stale and gets discarded.
    pub chunk: MtResource<Chunk>,
    /// New geometry per subchunk index, bottom to top
    pub meshes: Vec<(usize, SubchunkMesh)>,
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::Duration;

    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::block::Block;

    fn chunk_at(x: i32, z: i32) -> MtResource<Chunk> {
        MtResource::new(Chunk::empty(Point2::new(x, z)))
    }

    fn task_for(position: ChunkPosition, dirty: Vec<usize>) -> (MtResource<Chunk>, [MtResource<Chunk>; 4], ChunkMeshGenerationTask) {
        let chunk = chunk_at(position.x, position.y);
        chunk.get_mut().write_block_at(3, 40, 3, Block::STONE);
        let neighbors = BlockSide::horizontal().map(|side| {
            let at = position + side.chunk_offset();
            chunk_at(at.x, at.y)
        });
        let task = ChunkMeshGenerationTask::new(
            Arc::new(ChunkMesher::default()),
            position,
            chunk.clone(),
            neighbors.clone(),
            dirty,
        );
        (chunk, neighbors, task)
    }

    #[test]
    fn runs_while_other_readers_hold_every_chunk() {
        let (chunk, neighbors, task) = task_for(Point2::new(0, 0), vec![2]);
        let _center_reader = chunk.get();
        let _neighbor_readers: Vec<_> = neighbors.iter().map(|neighbor| neighbor.get()).collect();

        let (sender, receiver) = channel();
        thread::spawn(move || {
            let _ = sender.send(Box::new(task).process());
        });

        let result = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("meshing job blocked behind readers");
        let WorldTaskResult::Meshed(result) = result else {
            panic!("expected a meshing result");
        };
        assert_eq!(result.position, Point2::new(0, 0));
        assert_eq!(result.meshes.len(), 1);
        assert_eq!(result.meshes[0].0, 2);
        assert_eq!(result.meshes[0].1.face_count(), 6);
        assert!(result.chunk.ptr_eq(&chunk));
    }

    #[test]
    fn adjacent_jobs_lock_shared_chunks_in_the_same_order() {
        let locked_positions = |center: ChunkPosition| {
            let [north, east, south, west] =
                BlockSide::horizontal().map(|side| center + side.chunk_offset());
            let positions = [center, north, east, south, west];
            lock_order(&positions).map(|index| positions[index])
        };
        let rank = |sequence: &[ChunkPosition; 5], position: ChunkPosition| {
            sequence.iter().position(|p| *p == position).unwrap()
        };

        // Both jobs read (0, 0) and (1, 1)
        let east_job = locked_positions(Point2::new(1, 0));
        let south_job = locked_positions(Point2::new(0, 1));
        assert!(rank(&east_job, Point2::new(0, 0)) < rank(&east_job, Point2::new(1, 1)));
        assert!(rank(&south_job, Point2::new(0, 0)) < rank(&south_job, Point2::new(1, 1)));

        for sequence in [east_job, south_job] {
            assert!(sequence
                .windows(2)
                .all(|pair| (pair[0].x, pair[0].y) < (pair[1].x, pair[1].y)));
        }
    }
}
