//! # Task System Core Trait
//!
//! This module defines the unit of work the task system moves between threads.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created on the coordinating thread and published via
//!    `TaskManager::publish_task()`
//! 2. The task's `process()` method runs on a worker thread, consuming the task
//! 3. The returned value travels back over the worker's result channel
//! 4. The coordinating thread collects it with `TaskManager::drain()` and applies it
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - The result type must be `Send` to be transferred back
//! - Shared state reached from a task must be properly synchronized

use crate::engine_state::voxels::chunk::ChunkPosition;

/// Which pipeline stage a task belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Terrain generation for an absent chunk
    Generation,
    /// Meshing of a present chunk's dirty subchunks
    Meshing,
}

/// The chunk a task works on, reported back if the task fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskTarget {
    /// Pipeline stage
    pub kind: JobKind,
    /// Chunk coordinate
    pub position: ChunkPosition,
}

/// A unit of work that runs to completion on a worker thread and produces an `R`.
///
/// Tasks should own everything they need (or hold shared handles such as
/// `MtResource`), so they can be moved to another thread freely.
pub trait Task<R>: Send {
    /// Human-readable description, used when reporting a failed task.
    fn describe(&self) -> String;

    /// The chunk this task works on, if any. Read before the task runs so a failure
    /// can name it.
    fn target(&self) -> Option<TaskTarget> {
        None
    }

    /// Performs the work and returns its result.
    ///
    /// A panic here is caught by the worker and reported to the coordinating thread
    /// as a `TaskError`; the worker keeps running.
    fn process(self: Box<Self>) -> R;
}

/// A task ready to be handed to the pool.
pub type BoxedTask<R> = Box<dyn Task<R> + Send>;
