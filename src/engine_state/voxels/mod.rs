//! # Voxel Engine Core
//!
//! This module contains the voxel data model of the engine: what a block is, how
//! chunks store them, how terrain fills chunks and how the loaded chunks form a world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block identifiers, the block type registry and block faces
//! * **Chunk**: Dense 16x384x16 columns split into 24 independently meshed subchunks
//! * **Terrain**: Seeded noise and the density evaluators that populate chunks
//! * **World**: The sparse chunk map with symmetric neighbor links and block access
//! * **Pick**: Ray casts through the loaded world
//! * **Tasks**: Chunk generation jobs run on the worker pool
//!
//! ## Data Flow
//!
//! 1. The scheduler dispatches a generation task for a missing coordinate
//! 2. The terrain generator produces a clean, unlinked chunk on a worker
//! 3. The scheduler inserts it into the world, which links it to its neighbors
//! 4. Block edits go through the world and mark the owning subchunk dirty
//!
//! ## Thread Safety
//!
//! Chunks live behind [`MtResource`](crate::core::MtResource) handles. Workers only
//! ever read chunks (or take a chunk's dirty set); the map and the neighbor links
//! are changed on the coordinating thread alone.

pub mod block;
pub mod chunk;
pub mod pick;
pub mod tasks;
pub mod terrain;
pub mod world;
