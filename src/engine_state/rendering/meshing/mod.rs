//! Mesh generation and management for voxel rendering.
//!
//! This module handles the conversion of voxel data into triangle geometry and the
//! hand-off of that geometry to the rendering collaborator.
//!
//! # Architecture
//! - [`ChunkMesher`]: Regenerates geometry for the dirty subchunks of a chunk
//! - [`MeshSink`]: The rendering collaborator's side of the hand-off; it owns the
//!   resources behind each uploaded mesh and names them with a [`MeshHandle`]
//! - [`MeshRegistry`]: A headless sink that only tracks handles and vertex counts
//! - `mesh/`: Contains the exposed-face culling algorithm
//!
//! # Meshing Rules
//! - Only faces between a solid voxel and air are emitted
//! - Border faces look into the neighboring chunk, so meshing requires all four
//!   horizontal neighbors to be loaded
//! - Heights outside the world count as air, so the world floor and ceiling are drawn
//! - Meshing is a pure function of the blocks; running it twice yields the same
//!   vertices

use crate::engine_state::voxels::chunk::{Chunk, ChunkPosition, MeshHandle};

use super::{texture_atlas::TextureAtlas, Vertex};

mod mesh;
mod mesh_registry;

// Re-export the mesh module's public interface for external use
pub use mesh::*;
pub use mesh_registry::{MeshRecord, MeshRegistry};

/// Receives finished subchunk geometry on the coordinating thread.
///
/// Implementations own whatever resources back a mesh (GPU buffers, scene nodes) and
/// decide their lifetime; the world only stores the returned handle.
pub trait MeshSink {
    /// Takes ownership of new geometry for subchunk `subchunk` of the chunk at
    /// `chunk`, returning the handle it will be known by.
    fn upload(&mut self, chunk: ChunkPosition, subchunk: usize, vertices: &[Vertex])
        -> MeshHandle;

    /// Frees the resources behind `handle`. The handle is not used again.
    fn release(&mut self, handle: MeshHandle);
}

/// Converts chunks into per-subchunk geometry via exposed-face culling.
///
/// Stateless apart from the atlas layout, so one mesher is shared by every meshing job.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesher {
    atlas: TextureAtlas,
}

impl ChunkMesher {
    /// Creates a mesher that textures faces from `atlas`.
    pub fn new(atlas: TextureAtlas) -> Self {
        ChunkMesher { atlas }
    }

    /// The atlas layout faces are textured from.
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Generates the geometry of one subchunk.
    pub fn mesh_subchunk(&self, neighborhood: &ChunkNeighborhood<'_>, index: usize) -> SubchunkMesh {
        cull_subchunk(neighborhood, &self.atlas, index)
    }

    /// Regenerates every dirty subchunk of `chunk` and marks it clean.
    ///
    /// Returns the new geometry per subchunk index, bottom to top.
    ///
    /// # Panics
    /// Panics if any of the four horizontal neighbors is missing.
    pub fn mesh_dirty(
        &self,
        chunk: &mut Chunk,
        neighbors: [Option<&Chunk>; 4],
    ) -> Vec<(usize, SubchunkMesh)> {
        let dirty = chunk.take_dirty_subchunks();
        let neighborhood = ChunkNeighborhood::new(chunk, neighbors);
        dirty
            .into_iter()
            .map(|index| (index, self.mesh_subchunk(&neighborhood, index)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::{
        block::{block_side::BlockSide, Block},
        chunk::{CHUNK_WIDTH, SUBCHUNK_HEIGHT},
    };

    /// A chunk at the origin plus four empty neighbors.
    fn neighborhood_chunks() -> (Chunk, [Chunk; 4]) {
        let center = Chunk::empty(Point2::new(0, 0));
        let neighbors = BlockSide::horizontal()
            .map(|side| Chunk::empty(Point2::new(0, 0) + side.chunk_offset()));
        (center, neighbors)
    }

    fn refs(neighbors: &[Chunk; 4]) -> [Option<&Chunk>; 4] {
        [
            Some(&neighbors[0]),
            Some(&neighbors[1]),
            Some(&neighbors[2]),
            Some(&neighbors[3]),
        ]
    }

    #[test]
    fn cube_emits_only_outer_faces() {
        let (mut center, neighbors) = neighborhood_chunks();
        for x in 4..6 {
            for y in 20..22 {
                for z in 4..6 {
                    center.set_block_at(x, y, z, Block::STONE);
                }
            }
        }

        let meshes = ChunkMesher::default().mesh_dirty(&mut center, refs(&neighbors));
        assert_eq!(meshes.len(), 1);
        let (index, mesh) = &meshes[0];
        assert_eq!(*index, 1);
        // Six faces per side of the 2x2x2 cube, each side made of four block faces
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.vertices().len(), 24 * VERTICES_PER_FACE);
        assert!(!center.is_dirty());
    }

    #[test]
    fn single_block_emits_thirty_six_vertices() {
        let (mut center, neighbors) = neighborhood_chunks();
        center.set_block_at(8, 100, 8, Block::DIRT);

        let meshes = ChunkMesher::default().mesh_dirty(&mut center, refs(&neighbors));
        assert_eq!(meshes[0].1.vertices().len(), 36);
    }

    #[test]
    fn enclosed_solid_subchunk_is_empty() {
        let (mut center, mut neighbors) = neighborhood_chunks();
        // Fill subchunks 0..=2 everywhere, so subchunk 1 is fully enclosed
        for chunk in std::iter::once(&mut center).chain(neighbors.iter_mut()) {
            for x in 0..CHUNK_WIDTH as usize {
                for y in 0..3 * SUBCHUNK_HEIGHT as usize {
                    for z in 0..CHUNK_WIDTH as usize {
                        chunk.set_block_at(x, y, z, Block::STONE);
                    }
                }
            }
        }

        let mesher = ChunkMesher::default();
        let neighborhood = ChunkNeighborhood::new(&center, refs(&neighbors));
        assert_eq!(mesher.mesh_subchunk(&neighborhood, 1), SubchunkMesh::Empty);
        // The world floor is drawn, the top of the stack too
        assert_eq!(
            mesher.mesh_subchunk(&neighborhood, 0).face_count(),
            CHUNK_WIDTH as usize * CHUNK_WIDTH as usize
        );
        assert_eq!(
            mesher.mesh_subchunk(&neighborhood, 2).face_count(),
            CHUNK_WIDTH as usize * CHUNK_WIDTH as usize
        );
    }

    #[test]
    fn border_faces_look_into_neighbors() {
        let (mut center, mut neighbors) = neighborhood_chunks();
        center.set_block_at(15, 50, 0, Block::STONE);
        // East neighbor covers the +X face, north neighbor covers the -Z face
        neighbors[BlockSide::EAST as usize].set_block_at(0, 50, 0, Block::STONE);
        neighbors[BlockSide::NORTH as usize].set_block_at(15, 50, 15, Block::STONE);

        let meshes = ChunkMesher::default().mesh_dirty(&mut center, refs(&neighbors));
        assert_eq!(meshes[0].1.face_count(), 4);
    }

    #[test]
    fn meshing_is_idempotent() {
        let (mut center, neighbors) = neighborhood_chunks();
        center.set_block_at(1, 30, 1, Block::GRASS);
        center.set_block_at(1, 29, 1, Block::DIRT);

        let mesher = ChunkMesher::default();
        let first = mesher.mesh_dirty(&mut center, refs(&neighbors));
        center.mark_all_dirty();
        let second = mesher.mesh_dirty(&mut center, refs(&neighbors));

        let first_geometry: Vec<_> = first.into_iter().filter(|(_, m)| !m.is_empty()).collect();
        let second_geometry: Vec<_> = second.into_iter().filter(|(_, m)| !m.is_empty()).collect();
        assert_eq!(first_geometry, second_geometry);
    }

    #[test]
    fn clean_chunks_produce_nothing() {
        let (mut center, neighbors) = neighborhood_chunks();
        assert!(ChunkMesher::default()
            .mesh_dirty(&mut center, refs(&neighbors))
            .is_empty());
    }

    #[test]
    #[should_panic(expected = "meshing requires all four")]
    fn missing_neighbor_is_a_programming_error() {
        let (mut center, neighbors) = neighborhood_chunks();
        center.set_block_at(0, 10, 7, Block::STONE);
        let mut partial = refs(&neighbors);
        partial[BlockSide::WEST as usize] = None;
        ChunkMesher::default().mesh_dirty(&mut center, partial);
    }

    #[test]
    #[should_panic(expected = "has no north neighbor; meshing requires all four")]
    fn missing_neighbor_panics_without_edge_blocks() {
        let (mut center, neighbors) = neighborhood_chunks();
        // Nothing on any edge, so no face lookup ever leaves the chunk
        center.set_block_at(8, 10, 8, Block::STONE);
        let mut partial = refs(&neighbors);
        partial[BlockSide::NORTH as usize] = None;
        ChunkMesher::default().mesh_dirty(&mut center, partial);
    }
}
