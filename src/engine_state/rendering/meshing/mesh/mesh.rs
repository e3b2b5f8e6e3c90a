//! Exposed-face meshing for a single subchunk.
//!
//! Every solid voxel in the subchunk tests its six neighbors. A face is emitted when
//! the neighbor on that side is air. Horizontal lookups that leave the chunk continue
//! in the linked neighbor chunk; lookups above or below the world read as air.

use crate::engine_state::{
    rendering::{texture_atlas::TextureAtlas, Vertex},
    voxels::{
        block::{block_side::BlockSide, Block},
        chunk::{chunk_iteration::SubchunkBlockIterator, Chunk, CHUNK_HEIGHT, CHUNK_WIDTH},
    },
};

use super::face::Face;

/// Vertices emitted per exposed face: two triangles, no index buffer.
pub const VERTICES_PER_FACE: usize = 6;

/// The geometry of one subchunk.
#[derive(Debug, Clone, PartialEq)]
pub enum SubchunkMesh {
    /// The subchunk has no exposed faces; any previous geometry should be dropped.
    Empty,
    /// Triangle list, [`VERTICES_PER_FACE`] vertices per face.
    Geometry(Vec<Vertex>),
}

impl SubchunkMesh {
    /// The vertices, empty for [`SubchunkMesh::Empty`].
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            SubchunkMesh::Empty => &[],
            SubchunkMesh::Geometry(vertices) => vertices,
        }
    }

    /// Number of quads.
    pub fn face_count(&self) -> usize {
        self.vertices().len() / VERTICES_PER_FACE
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        matches!(self, SubchunkMesh::Empty)
    }
}

/// A chunk together with its four horizontal neighbors, as needed for meshing.
pub struct ChunkNeighborhood<'a> {
    center: &'a Chunk,
    /// Indexed by horizontal `BlockSide`
    neighbors: [&'a Chunk; 4],
}

impl<'a> ChunkNeighborhood<'a> {
    /// Groups `center` with its neighbors, ordered north, east, south, west.
    ///
    /// # Panics
    /// Panics if any neighbor is missing, whether or not the center has blocks on
    /// that edge.
    pub fn new(center: &'a Chunk, neighbors: [Option<&'a Chunk>; 4]) -> Self {
        let neighbors = BlockSide::horizontal().map(|side| match neighbors[side as usize] {
            Some(chunk) => chunk,
            None => panic!(
                "chunk {:?} has no {} neighbor; meshing requires all four",
                center.position(),
                side.name()
            ),
        });
        ChunkNeighborhood { center, neighbors }
    }

    /// The chunk being meshed.
    pub fn center(&self) -> &'a Chunk {
        self.center
    }

    fn neighbor(&self, side: BlockSide) -> &'a Chunk {
        self.neighbors[side as usize]
    }

    /// The block at a chunk-local coordinate that may be one step outside the chunk.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return Block::AIR;
        }
        let y = y as usize;

        let (chunk, x, z) = if x < 0 {
            (self.neighbor(BlockSide::WEST), x + CHUNK_WIDTH, z)
        } else if x >= CHUNK_WIDTH {
            (self.neighbor(BlockSide::EAST), x - CHUNK_WIDTH, z)
        } else if z < 0 {
            (self.neighbor(BlockSide::NORTH), x, z + CHUNK_WIDTH)
        } else if z >= CHUNK_WIDTH {
            (self.neighbor(BlockSide::SOUTH), x, z - CHUNK_WIDTH)
        } else {
            (self.center, x, z)
        };

        chunk.get_block_at(x as usize, y, z as usize)
    }
}

/// Generates the exposed-face geometry of subchunk `index`.
pub fn cull_subchunk(
    neighborhood: &ChunkNeighborhood<'_>,
    atlas: &TextureAtlas,
    index: usize,
) -> SubchunkMesh {
    let mut vertices = Vec::new();

    for (position, block) in SubchunkBlockIterator::new(neighborhood.center(), index) {
        for side in BlockSide::all() {
            let offset = side.offset();
            let neighbor = neighborhood.block_at(
                position.x as i32 + offset.x,
                position.y as i32 + offset.y,
                position.z as i32 + offset.z,
            );
            if !neighbor.is_air() {
                continue;
            }

            // Blocks without atlas entries are not drawn
            let Some(uvs) = atlas.uv_rect(block, side) else {
                continue;
            };
            vertices.extend(Face::new(position.x, position.y, position.z, side).vertices(uvs));
        }
    }

    if vertices.is_empty() {
        SubchunkMesh::Empty
    } else {
        SubchunkMesh::Geometry(vertices)
    }
}
