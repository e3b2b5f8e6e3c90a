//! Rendering-side data for the voxel engine.
//!
//! Nothing in here talks to a GPU. This module turns chunk data into vertex lists
//! (face culling against neighbors, texture atlas UVs) and keeps the bookkeeping for
//! the opaque mesh handles a rendering collaborator hands back.

pub mod meshing;
pub mod tasks;
pub mod texture_atlas;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;
