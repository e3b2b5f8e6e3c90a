//! # Engine State Module
//!
//! The streaming core: the `WorldScheduler` and the subsystems it coordinates.
//!
//! ## Key Components
//!
//! * `WorldScheduler` - Owns the chunk map and drives generation, meshing and eviction
//! * `config` - Serde-loadable world settings
//! * `load_order` - Nearest-first coordinate order around the observer
//! * `rendering` - Face culling, texture atlas layout and mesh handle bookkeeping
//! * `task_management` - Fixed worker pool running generation and meshing jobs
//! * `voxels` - Blocks, chunks, terrain generation, the world map and picking
//!
//! ## Tick Phases
//!
//! Every call to [`WorldScheduler::tick`] runs four phases, strictly in this order:
//!
//! 1. Drain finished jobs and insert generated chunks, linking them to their neighbors
//! 2. Hand finished meshes to the [`MeshSink`]
//! 3. Evict chunks outside the window around the observer
//! 4. Dispatch new generation and meshing jobs, nearest first, up to the cap
//!
//! Only the coordinating thread touches the chunk map, the neighbor links and the
//! pending sets. Workers see chunks through the shared handles a job was given.
//!
//! ## Chunk Lifecycle
//!
//! A coordinate moves Absent → Generating → Present → Meshing → Present, and any
//! present chunk that is not generating is evicted once it leaves the window. The
//! window reaches one ring further than the view distance, so every chunk that gets
//! meshed has all four neighbors loaded.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{debug, error, info};
use thiserror::Error;

use config::{ConfigError, WorldConfig};
use load_order::LoadOrder;
use rendering::meshing::{ChunkMesher, MeshRegistry, MeshSink, SubchunkMesh};
use rendering::tasks::chunk_mesh_generation_task::{ChunkMeshGenerationTask, ChunkMeshResult};
use task_management::task::JobKind;
use task_management::{DrainPolicy, TaskError, TaskManager};
use voxels::block::{block_side::BlockSide, Block};
use voxels::chunk::{Chunk, ChunkPosition};
use voxels::pick::{pick, PickHit};
use voxels::tasks::chunk_generation_task::{ChunkGenerationResult, ChunkGenerationTask};
use voxels::terrain::TerrainGenerator;
use voxels::world::{chunk_position_for_point, World};

use crate::core::MtResource;

pub mod config;
pub mod load_order;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What a worker hands back to the scheduler.
pub enum WorldTaskResult {
    /// A chunk finished generating
    Generated(ChunkGenerationResult),
    /// A chunk's dirty subchunks finished meshing
    Meshed(ChunkMeshResult),
}

/// Errors returned by the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A generation or meshing job did not produce a result.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The world settings are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Point-in-time counters describing the scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Chunks in the map
    pub present: usize,
    /// Coordinates with a generation job in flight
    pub generating: usize,
    /// Coordinates with a meshing job in flight
    pub meshing: usize,
    /// Coordinates whose job failed and will not be dispatched again while in view
    pub failed: usize,
    /// Chunks evicted since the scheduler was created
    pub evicted_total: u64,
    /// Meshing results applied since the scheduler was created
    pub meshed_total: u64,
    /// The observer's chunk as of the last tick
    pub observer_chunk: ChunkPosition,
}

/// What one [`WorldScheduler::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Generated chunks inserted into the map
    pub generated: usize,
    /// Meshing results handed to the mesh sink
    pub meshed: usize,
    /// Chunks evicted
    pub evicted: usize,
    /// Generation jobs dispatched
    pub dispatched_generation: usize,
    /// Meshing jobs dispatched
    pub dispatched_meshing: usize,
    /// Wall time spent in the tick
    pub elapsed: Duration,
}

/// Streams chunks around a moving observer.
///
/// The scheduler is the single owner of the [`World`]. It keeps two pending sets of
/// coordinates with a job in flight; a coordinate is inserted when its job is
/// dispatched and removed only when that job's result is drained, so no coordinate
/// ever has two jobs of the same kind running.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_streaming::engine_state::{config::WorldConfig, WorldScheduler};
///
/// let mut scheduler = WorldScheduler::headless(WorldConfig::default())?;
/// scheduler.tick(Point3::new(0.0, 150.0, 0.0))?;
/// println!("{:?}", scheduler.stats());
/// # Ok::<(), voxel_streaming::engine_state::SchedulerError>(())
/// ```
pub struct WorldScheduler<S: MeshSink = MeshRegistry> {
    world: World,
    task_manager: TaskManager<WorldTaskResult>,
    generator: Arc<TerrainGenerator>,
    mesher: Arc<ChunkMesher>,
    mesh_sink: S,
    /// Coordinates with a generation job in flight
    generating: HashSet<ChunkPosition>,
    /// Coordinates with a meshing job in flight
    meshing: HashSet<ChunkPosition>,
    /// Coordinates whose job never reported back
    failed: HashSet<ChunkPosition>,
    load_order: LoadOrder,
    max_jobs_in_flight: usize,
    drain_policy: DrainPolicy,
    observer_chunk: ChunkPosition,
    evicted_total: u64,
    meshed_total: u64,
}

impl WorldScheduler<MeshRegistry> {
    /// Creates a scheduler that records meshes in a [`MeshRegistry`] instead of
    /// uploading them anywhere.
    pub fn headless(config: WorldConfig) -> Result<Self, SchedulerError> {
        Self::new(config, MeshRegistry::new())
    }
}

impl<S: MeshSink> WorldScheduler<S> {
    /// Creates a scheduler with an empty world.
    ///
    /// # Errors
    /// Fails if `config` does not validate or the worker threads cannot be started.
    pub fn new(config: WorldConfig, mesh_sink: S) -> Result<Self, SchedulerError> {
        config.validate()?;

        let generator = config.build_generator();
        info!(
            "Creating world scheduler: seed {}, view distance {}, {} generator, cap {}",
            config.seed,
            config.view_distance,
            generator.evaluator_name(),
            config.max_jobs_in_flight
        );

        Ok(WorldScheduler {
            world: World::new(),
            task_manager: TaskManager::new(config.worker_count)?,
            generator,
            mesher: Arc::new(ChunkMesher::default()),
            mesh_sink,
            generating: HashSet::new(),
            meshing: HashSet::new(),
            failed: HashSet::new(),
            load_order: LoadOrder::new(config.view_distance),
            max_jobs_in_flight: config.max_jobs_in_flight,
            drain_policy: config.drain_policy,
            observer_chunk: ChunkPosition::new(0, 0),
            evicted_total: 0,
            meshed_total: 0,
        })
    }

    /// The chunk map.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The mesh sink receiving geometry.
    pub fn mesh_sink(&self) -> &S {
        &self.mesh_sink
    }

    /// The terrain generator used by generation jobs.
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// Whether a generation job is in flight for `position`.
    pub fn is_generating(&self, position: ChunkPosition) -> bool {
        self.generating.contains(&position)
    }

    /// Whether a meshing job is in flight for `position`.
    pub fn is_meshing(&self, position: ChunkPosition) -> bool {
        self.meshing.contains(&position)
    }

    /// Jobs dispatched and not yet drained.
    pub fn jobs_in_flight(&self) -> usize {
        self.generating.len() + self.meshing.len()
    }

    /// Current counters.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            present: self.world.len(),
            generating: self.generating.len(),
            meshing: self.meshing.len(),
            failed: self.failed.len(),
            evicted_total: self.evicted_total,
            meshed_total: self.meshed_total,
            observer_chunk: self.observer_chunk,
        }
    }

    /// Reads a block in world coordinates. Unloaded chunks read as air.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        self.world.get_block(x, y, z)
    }

    /// Writes a block in world coordinates and marks its subchunk dirty. The next
    /// tick remeshes it. Returns `false` (and does nothing) for unloaded chunks.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> bool {
        self.world.set_block(x, y, z, block)
    }

    /// Casts a ray through the loaded world.
    pub fn pick(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<PickHit> {
        pick(&self.world, origin, direction, max_distance)
    }

    /// Advances the world one step with the observer at `observer`.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Task`] if any job drained this tick failed. The
    /// successful results of the same drain are applied first; eviction and dispatch
    /// are skipped for this tick. Each failed job's coordinate leaves its pending set
    /// right away and is not dispatched again until it leaves the window.
    pub fn tick(&mut self, observer: Point3<f32>) -> Result<TickReport, SchedulerError> {
        let start = web_time::Instant::now();
        let mut report = TickReport::default();

        self.observer_chunk = chunk_position_for_point(observer);

        let drained = self.task_manager.drain(self.drain_policy);
        let mut meshed = Vec::new();
        for result in drained.results {
            match result {
                WorldTaskResult::Generated(generated) => {
                    self.insert_generated(generated);
                    report.generated += 1;
                }
                WorldTaskResult::Meshed(result) => meshed.push(result),
            }
        }
        for result in meshed {
            if self.apply_meshes(result) {
                report.meshed += 1;
            }
        }

        if !drained.failures.is_empty() {
            self.record_failures(&drained.failures);
            self.release_orphaned_positions();
            for failure in &drained.failures[1..] {
                error!("Job failed: {failure}");
            }
            report.elapsed = start.elapsed();
            debug!("Tick aborted after draining: {:?}", report);
            let mut failures = drained.failures;
            return Err(failures.swap_remove(0).into());
        }

        report.evicted = self.evict_distant();
        let (generation, meshing) = self.dispatch_nearby();
        report.dispatched_generation = generation;
        report.dispatched_meshing = meshing;

        report.elapsed = start.elapsed();
        debug!(
            "Tick at chunk ({}, {}): {} generated, {} meshed, {} evicted, {} + {} dispatched, {} present, took {:?}",
            self.observer_chunk.x,
            self.observer_chunk.y,
            report.generated,
            report.meshed,
            report.evicted,
            report.dispatched_generation,
            report.dispatched_meshing,
            self.world.len(),
            report.elapsed
        );

        Ok(report)
    }

    /// Blocks until every dispatched job has been drained and applied, without
    /// evicting or dispatching anything.
    pub fn flush(&mut self) -> Result<(), SchedulerError> {
        let drained = self.task_manager.drain(DrainPolicy::JoinAll);
        let mut meshed = Vec::new();
        for result in drained.results {
            match result {
                WorldTaskResult::Generated(generated) => self.insert_generated(generated),
                WorldTaskResult::Meshed(result) => meshed.push(result),
            }
        }
        for result in meshed {
            self.apply_meshes(result);
        }

        self.record_failures(&drained.failures);
        self.release_orphaned_positions();
        match drained.failures.into_iter().next() {
            Some(failure) => Err(failure.into()),
            None => Ok(()),
        }
    }

    /// Inserts a generated chunk and links it. A fresh chunk has never been meshed,
    /// so every subchunk starts dirty.
    fn insert_generated(&mut self, generated: ChunkGenerationResult) {
        let mut chunk = generated.chunk;
        let position = chunk.position();
        self.generating.remove(&position);

        chunk.mark_all_dirty();
        self.world.insert_chunk(chunk);
    }

    /// Hands a meshing result to the mesh sink. Returns `false` if the chunk was
    /// evicted (or replaced) while the job ran, in which case the geometry is dropped.
    fn apply_meshes(&mut self, result: ChunkMeshResult) -> bool {
        let ChunkMeshResult {
            position,
            chunk: meshed_chunk,
            meshes,
        } = result;
        self.meshing.remove(&position);

        let current = self
            .world
            .get_chunk_at(position)
            .filter(|chunk| chunk.ptr_eq(&meshed_chunk));
        let Some(chunk) = current else {
            debug!(
                "Dropping mesh for chunk ({}, {}), it is no longer loaded",
                position.x, position.y
            );
            return false;
        };

        let mut chunk = chunk.get_mut();
        for (index, mesh) in meshes {
            if let Some(old) = chunk.replace_subchunk_mesh(index, None) {
                self.mesh_sink.release(old);
            }
            if let SubchunkMesh::Geometry(vertices) = &mesh {
                let handle = self.mesh_sink.upload(position, index, vertices);
                chunk.replace_subchunk_mesh(index, Some(handle));
            }
        }

        self.meshed_total += 1;
        true
    }

    /// Moves the coordinate of every panicked job from its pending set to the failed
    /// set.
    fn record_failures(&mut self, failures: &[TaskError]) {
        for failure in failures {
            let TaskError::Panicked {
                target: Some(target),
                ..
            } = failure
            else {
                continue;
            };
            let pending = match target.kind {
                JobKind::Generation => &mut self.generating,
                JobKind::Meshing => &mut self.meshing,
            };
            pending.remove(&target.position);
            self.failed.insert(target.position);
        }
    }

    /// Once the worker pool is idle, any coordinate still pending has lost its job.
    /// Those move to the failed set so they stop counting against the cap.
    fn release_orphaned_positions(&mut self) {
        if !self.task_manager.is_idle() {
            return;
        }
        self.failed.extend(self.generating.drain());
        self.failed.extend(self.meshing.drain());
    }

    /// Removes every chunk outside the window that has no generation job in flight.
    fn evict_distant(&mut self) -> usize {
        let center = self.observer_chunk;
        let distant: Vec<ChunkPosition> = self
            .world
            .positions()
            .filter(|&position| {
                !self.load_order.contains(center, position) && !self.generating.contains(&position)
            })
            .collect();

        for &position in &distant {
            if let Some(chunk) = self.world.remove_chunk(position) {
                for handle in chunk.get_mut().take_mesh_handles() {
                    self.mesh_sink.release(handle);
                }
            }
        }

        let load_order = &self.load_order;
        self.failed
            .retain(|&position| load_order.contains(center, position));

        self.evicted_total += distant.len() as u64;
        distant.len()
    }

    /// Walks the window nearest first, dispatching generation for missing chunks and
    /// meshing for dirty chunks with all four neighbors, until the cap is reached.
    ///
    /// A meshing job is handed the chunk's dirty set, cleared here, so workers never
    /// need a write lock.
    fn dispatch_nearby(&mut self) -> (usize, usize) {
        let mut dispatched_generation = 0;
        let mut dispatched_meshing = 0;

        let positions: Vec<ChunkPosition> = self.load_order.around(self.observer_chunk).collect();
        for position in positions {
            if self.jobs_in_flight() >= self.max_jobs_in_flight {
                break;
            }
            if self.failed.contains(&position) {
                continue;
            }

            match self.world.get_chunk_at(position) {
                None => {
                    if self.generating.insert(position) {
                        self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                            self.generator.clone(),
                            position,
                        )));
                        dispatched_generation += 1;
                    }
                }
                Some(chunk) => {
                    if self.meshing.contains(&position) || !chunk.get().is_dirty() {
                        continue;
                    }
                    let Some(neighbors) = self.neighbors_of(position) else {
                        continue;
                    };
                    let dirty = chunk.get_mut().take_dirty_subchunks();
                    self.meshing.insert(position);
                    self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                        self.mesher.clone(),
                        position,
                        chunk,
                        neighbors,
                        dirty,
                    )));
                    dispatched_meshing += 1;
                }
            }
        }

        (dispatched_generation, dispatched_meshing)
    }

    /// Handles to the four horizontal neighbors, ordered by `BlockSide`, if all are
    /// loaded.
    fn neighbors_of(&self, position: ChunkPosition) -> Option<[MtResource<Chunk>; 4]> {
        let [north, east, south, west] = BlockSide::horizontal()
            .map(|side| self.world.get_chunk_at(position + side.chunk_offset()));
        Some([north?, east?, south?, west?])
    }
}
