//! Mesh generation for voxel rendering.
//!
//! This module provides the core functionality for converting voxel data into
//! triangle geometry.
//!
//! # Architecture
//! - [`SubchunkMesh`]: The geometry of one subchunk, or an explicit empty marker
//! - [`Face`]: A single quad of a voxel, with its corners and side
//! - [`ChunkNeighborhood`]: A chunk plus the neighbors its border faces look into
//! - [`cull_subchunk`]: Exposed-face culling for one subchunk

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
