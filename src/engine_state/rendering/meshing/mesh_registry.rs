//! Headless mesh bookkeeping.
//!
//! This module tracks which subchunk each uploaded mesh belongs to and hands out mesh
//! handles from a recycled pool, the way a renderer would hand out buffer slots.

use std::collections::{HashMap, VecDeque};

use crate::engine_state::{
    rendering::Vertex,
    voxels::chunk::{ChunkPosition, MeshHandle},
};

use super::MeshSink;

/// What the registry knows about one live mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRecord {
    /// Owning chunk
    pub chunk: ChunkPosition,
    /// Subchunk index within the chunk
    pub subchunk: usize,
    /// Number of vertices uploaded
    pub vertex_count: usize,
}

/// A [`MeshSink`] that keeps no geometry, only the handle to subchunk mapping.
///
/// Released handles are reused before new ones are minted.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    records: HashMap<MeshHandle, MeshRecord>,
    available_handles: VecDeque<MeshHandle>,
    next_handle: u32,
    uploads: u64,
}

impl MeshRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live meshes.
    pub fn live_count(&self) -> usize {
        self.records.len()
    }

    /// Total number of uploads ever received.
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Sum of the vertex counts of every live mesh.
    pub fn total_vertices(&self) -> usize {
        self.records.values().map(|record| record.vertex_count).sum()
    }

    /// The record behind a live handle.
    pub fn record(&self, handle: MeshHandle) -> Option<&MeshRecord> {
        self.records.get(&handle)
    }

    /// Live handles belonging to the chunk at `chunk`.
    pub fn handles_for_chunk(&self, chunk: ChunkPosition) -> Vec<MeshHandle> {
        self.records
            .iter()
            .filter(|(_, record)| record.chunk == chunk)
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn allocate_handle(&mut self) -> MeshHandle {
        self.available_handles.pop_front().unwrap_or_else(|| {
            let handle = MeshHandle(self.next_handle);
            self.next_handle += 1;
            handle
        })
    }
}

impl MeshSink for MeshRegistry {
    fn upload(&mut self, chunk: ChunkPosition, subchunk: usize, vertices: &[Vertex]) -> MeshHandle {
        let handle = self.allocate_handle();
        self.uploads += 1;
        self.records.insert(
            handle,
            MeshRecord {
                chunk,
                subchunk,
                vertex_count: vertices.len(),
            },
        );
        handle
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.records.remove(&handle).is_some() {
            self.available_handles.push_back(handle);
        } else {
            log::warn!("Released unknown mesh handle {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    #[test]
    fn released_handles_are_recycled() {
        let mut registry = MeshRegistry::new();
        let vertices = [Vertex::default(); 6];
        let a = registry.upload(Point2::new(0, 0), 3, &vertices);
        let b = registry.upload(Point2::new(1, 0), 4, &vertices[..3]);
        assert_ne!(a, b);
        assert_eq!(registry.total_vertices(), 9);

        registry.release(a);
        assert_eq!(registry.live_count(), 1);
        let c = registry.upload(Point2::new(2, 0), 0, &vertices);
        assert_eq!(c, a);
        assert_eq!(registry.record(c).unwrap().chunk, Point2::new(2, 0));
        assert_eq!(registry.handles_for_chunk(Point2::new(1, 0)), vec![b]);
        assert_eq!(registry.upload_count(), 3);
    }

    #[test]
    fn double_release_is_ignored() {
        let mut registry = MeshRegistry::new();
        let handle = registry.upload(Point2::new(0, 0), 0, &[]);
        registry.release(handle);
        registry.release(handle);
        assert_eq!(registry.live_count(), 0);
        assert_ne!(
            registry.upload(Point2::new(0, 0), 0, &[]),
            registry.upload(Point2::new(0, 0), 1, &[])
        );
    }
}
