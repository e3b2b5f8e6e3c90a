//! Vertex data structures for voxel geometry.
//!
//! This module defines the vertex format handed to the rendering collaborator.

use cgmath::Point3;

/// A vertex of subchunk geometry.
///
/// Positions are chunk-local block coordinates (the renderer offsets them by the
/// chunk's world origin). The layout is plain old data so vertex slices can be cast
/// straight to bytes with [`bytemuck::cast_slice`].
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: 2x f32 (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Outward unit normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub uv: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local position, in blocks
    /// * `normal` - Face normal
    /// * `uv` - Atlas texture coordinates
    pub fn new(position: Point3<usize>, normal: [f32; 3], uv: [f32; 2]) -> Self {
        Vertex {
            position: [position.x as f32, position.y as f32, position.z as f32],
            normal,
            uv,
        }
    }

    /// The vertex data as raw bytes.
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}
