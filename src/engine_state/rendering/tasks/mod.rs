//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates subchunk geometry in the background

pub mod chunk_mesh_generation_task;
