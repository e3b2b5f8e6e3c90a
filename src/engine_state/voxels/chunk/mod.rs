//! # Chunk Module
//!
//! This module provides the `Chunk` struct, a 16x384x16 column of voxel data split
//! into 24 vertically stacked subchunks, together with helpers for building chunks
//! and walking their solid blocks.
//!
//! ## Storage
//!
//! Blocks are stored densely, one byte each, in Y-major order (`y`, then `x`, then
//! `z`), so a subchunk's span is one contiguous slice of the grid.
//!
//! ## Dirty Tracking
//!
//! Each subchunk carries a dirty flag that tells the meshing pipeline to rebuild its
//! geometry. The chunk keeps a count of dirty subchunks, so the aggregate "is this
//! chunk dirty" question is answered without scanning all 24 records.
//!
//! ## Neighbors
//!
//! A chunk records which of its four horizontal neighbors are linked, by chunk
//! coordinate. The links are written only by the world's link/unlink routines, which
//! always update both sides together.

use cgmath::{Point2, Point3};

use super::block::block_side::BlockSide;
use super::block::Block;

mod chunk_creation;
pub mod chunk_iteration;

pub use chunk_creation::ChunkCreationIterator;

/// Width and depth of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk (and of the world) in blocks.
pub const CHUNK_HEIGHT: i32 = 384;
/// Height of a single subchunk in blocks.
pub const SUBCHUNK_HEIGHT: i32 = 16;
/// Number of subchunks stacked in a chunk.
pub const SUBCHUNK_COUNT: usize = (CHUNK_HEIGHT / SUBCHUNK_HEIGHT) as usize;
/// Number of blocks in one horizontal layer of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_WIDTH * CHUNK_WIDTH) as usize;
/// Total number of blocks in a chunk.
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_HEIGHT as usize;

/// A chunk coordinate `(chunkX, chunkZ)`, in chunks rather than blocks.
pub type ChunkPosition = Point2<i32>;

/// Opaque handle to mesh resources owned by the rendering collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// One 16-block-tall slice of a chunk: the unit of dirty tracking and remeshing.
#[derive(Default, Debug, Clone)]
pub struct Subchunk {
    dirty: bool,
    mesh: Option<MeshHandle>,
}

impl Subchunk {
    /// Whether the subchunk's geometry must be regenerated.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The rendering collaborator's handle for this subchunk's current geometry.
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }
}

/// Represents a 16x384x16 column of voxel blocks in the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    position: ChunkPosition,

    /// Dense block grid, indexed by [`Chunk::index`].
    blocks: Box<[Block]>,

    subchunks: [Subchunk; SUBCHUNK_COUNT],

    /// Invariant: equals the number of subchunks whose dirty flag is set.
    dirty_subchunk_count: usize,

    /// Linked neighbor coordinates, indexed by horizontal `BlockSide`.
    neighbors: [Option<ChunkPosition>; 4],
}

impl Chunk {
    /// Creates a new chunk with every block set to air, all subchunks clean and no
    /// neighbors linked.
    pub fn empty(position: ChunkPosition) -> Self {
        Chunk {
            position,
            blocks: vec![Block::AIR; CHUNK_SIZE].into_boxed_slice(),
            subchunks: Default::default(),
            dirty_subchunk_count: 0,
            neighbors: [None; 4],
        }
    }

    /// The position of this chunk in chunk coordinates.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// World-space block coordinates of the chunk's `(0, 0, 0)` corner.
    pub fn world_origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * CHUNK_WIDTH,
            0,
            self.position.y * CHUNK_WIDTH,
        )
    }

    /// Linear index of a local coordinate in the block grid.
    ///
    /// # Panics
    /// Panics in debug builds if the coordinate is outside the chunk.
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_WIDTH as usize);
        debug_assert!(y < CHUNK_HEIGHT as usize);
        debug_assert!(z < CHUNK_WIDTH as usize);
        y * CHUNK_PLANE_SIZE + x * CHUNK_WIDTH as usize + z
    }

    /// Index of the subchunk that contains local height `y`.
    pub fn subchunk_index_for_y(y: usize) -> usize {
        y / SUBCHUNK_HEIGHT as usize
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn get_block_at(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[Self::index(x, y, z)]
    }

    /// Sets the block at the specified chunk-relative coordinates and marks the owning
    /// subchunk dirty.
    ///
    /// A block on the bottom or top layer of its subchunk also dirties the subchunk
    /// below or above it, whose faces against that layer may change.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn set_block_at(&mut self, x: usize, y: usize, z: usize, block: Block) {
        self.blocks[Self::index(x, y, z)] = block;
        let index = Self::subchunk_index_for_y(y);
        self.set_subchunk_dirty(index, true);

        let layer = y % SUBCHUNK_HEIGHT as usize;
        if layer == 0 && index > 0 {
            self.set_subchunk_dirty(index - 1, true);
        }
        if layer == SUBCHUNK_HEIGHT as usize - 1 && index + 1 < SUBCHUNK_COUNT {
            self.set_subchunk_dirty(index + 1, true);
        }
    }

    /// Writes a block without touching dirty flags. Used while the chunk is still being
    /// populated and nobody else can observe it.
    pub(crate) fn write_block_at(&mut self, x: usize, y: usize, z: usize, block: Block) {
        self.blocks[Self::index(x, y, z)] = block;
    }

    /// The whole block grid.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The blocks of one subchunk, as a contiguous slice of the grid.
    pub fn subchunk_blocks(&self, index: usize) -> &[Block] {
        let start = index * SUBCHUNK_HEIGHT as usize * CHUNK_PLANE_SIZE;
        &self.blocks[start..start + SUBCHUNK_HEIGHT as usize * CHUNK_PLANE_SIZE]
    }

    /// Whether any subchunk is dirty.
    pub fn is_dirty(&self) -> bool {
        self.dirty_subchunk_count > 0
    }

    /// Number of dirty subchunks.
    pub fn dirty_subchunk_count(&self) -> usize {
        self.dirty_subchunk_count
    }

    /// Gets the subchunk record at `index`.
    ///
    /// # Panics
    /// Panics if `index >= SUBCHUNK_COUNT`.
    pub fn subchunk(&self, index: usize) -> &Subchunk {
        &self.subchunks[index]
    }

    /// Sets or clears one subchunk's dirty flag, keeping the aggregate count in step.
    pub fn set_subchunk_dirty(&mut self, index: usize, dirty: bool) {
        let subchunk = &mut self.subchunks[index];
        match (subchunk.dirty, dirty) {
            (false, true) => self.dirty_subchunk_count += 1,
            (true, false) => self.dirty_subchunk_count -= 1,
            _ => {}
        }
        subchunk.dirty = dirty;
    }

    /// Marks every subchunk dirty. A freshly generated chunk starts out this way.
    pub fn mark_all_dirty(&mut self) {
        for index in 0..SUBCHUNK_COUNT {
            self.set_subchunk_dirty(index, true);
        }
    }

    /// Indices of the dirty subchunks, bottom to top.
    pub fn dirty_subchunks(&self) -> Vec<usize> {
        (0..SUBCHUNK_COUNT)
            .filter(|&index| self.subchunks[index].dirty)
            .collect()
    }

    /// Clears every dirty flag and returns the indices that were dirty.
    ///
    /// The scheduler calls this when it dispatches a meshing job, so an edit that lands
    /// while the job runs re-dirties its subchunk instead of being lost.
    pub fn take_dirty_subchunks(&mut self) -> Vec<usize> {
        let dirty = self.dirty_subchunks();
        for &index in &dirty {
            self.set_subchunk_dirty(index, false);
        }
        dirty
    }

    /// Records the rendering collaborator's handle for a subchunk, returning the
    /// handle it replaces.
    pub fn replace_subchunk_mesh(
        &mut self,
        index: usize,
        mesh: Option<MeshHandle>,
    ) -> Option<MeshHandle> {
        std::mem::replace(&mut self.subchunks[index].mesh, mesh)
    }

    /// Removes and returns every mesh handle, leaving the subchunks without geometry.
    pub fn take_mesh_handles(&mut self) -> Vec<MeshHandle> {
        self.subchunks
            .iter_mut()
            .filter_map(|subchunk| subchunk.mesh.take())
            .collect()
    }

    /// The linked neighbor in a horizontal direction.
    pub fn neighbor(&self, side: BlockSide) -> Option<ChunkPosition> {
        self.neighbors.get(side as usize).copied().flatten()
    }

    /// Whether all four horizontal neighbors are linked.
    pub fn has_all_neighbors(&self) -> bool {
        self.neighbors.iter().all(Option::is_some)
    }

    /// Writes one neighbor slot. Only the world's symmetric link/unlink routines call
    /// this, so a one-sided link can never be created elsewhere.
    pub(crate) fn set_neighbor(&mut self, side: BlockSide, neighbor: Option<ChunkPosition>) {
        debug_assert!(
            (side as usize) < self.neighbors.len(),
            "vertical sides have no chunk neighbor"
        );
        self.neighbors[side as usize] = neighbor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_air_and_clean() {
        let chunk = Chunk::empty(Point2::new(3, -2));
        assert!(chunk.blocks().iter().all(|block| block.is_air()));
        assert!(!chunk.is_dirty());
        assert!(!chunk.has_all_neighbors());
        assert_eq!(chunk.world_origin(), Point3::new(48, 0, -32));
    }

    #[test]
    fn set_block_dirties_owning_subchunk() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(4, 37, 9, Block::STONE);

        assert_eq!(chunk.get_block_at(4, 37, 9), Block::STONE);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.dirty_subchunks(), vec![2]);
    }

    #[test]
    fn edits_on_subchunk_layers_dirty_the_adjacent_subchunk() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(5, 15, 5, Block::STONE);
        chunk.set_block_at(5, 16, 5, Block::STONE);
        chunk.take_dirty_subchunks();

        // Clearing the bottom layer of subchunk 1 exposes the top face below it
        chunk.set_block_at(5, 16, 5, Block::AIR);
        assert_eq!(chunk.take_dirty_subchunks(), vec![0, 1]);

        chunk.set_block_at(5, 15, 5, Block::AIR);
        assert_eq!(chunk.take_dirty_subchunks(), vec![0, 1]);

        // The world floor and ceiling have nothing beyond them
        chunk.set_block_at(0, 0, 0, Block::STONE);
        assert_eq!(chunk.take_dirty_subchunks(), vec![0]);
        chunk.set_block_at(0, CHUNK_HEIGHT as usize - 1, 0, Block::STONE);
        assert_eq!(chunk.take_dirty_subchunks(), vec![SUBCHUNK_COUNT - 1]);
    }

    #[test]
    fn dirty_count_tracks_flags() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_subchunk_dirty(1, true);
        chunk.set_subchunk_dirty(1, true);
        chunk.set_subchunk_dirty(5, true);
        assert_eq!(chunk.dirty_subchunk_count(), 2);

        chunk.set_subchunk_dirty(1, false);
        assert!(chunk.is_dirty());
        chunk.set_subchunk_dirty(5, false);
        assert!(!chunk.is_dirty());
        chunk.set_subchunk_dirty(5, false);
        assert_eq!(chunk.dirty_subchunk_count(), 0);
    }

    #[test]
    fn take_dirty_subchunks_clears_everything() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.mark_all_dirty();
        assert_eq!(chunk.dirty_subchunk_count(), SUBCHUNK_COUNT);

        let taken = chunk.take_dirty_subchunks();
        assert_eq!(taken, (0..SUBCHUNK_COUNT).collect::<Vec<_>>());
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn subchunk_slices_are_contiguous_layers() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.write_block_at(0, 16, 0, Block::DIRT);
        chunk.write_block_at(15, 31, 15, Block::STONE);

        let slice = chunk.subchunk_blocks(1);
        assert_eq!(slice.len(), 16 * CHUNK_PLANE_SIZE);
        assert_eq!(slice[0], Block::DIRT);
        assert_eq!(slice[slice.len() - 1], Block::STONE);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn mesh_handles_are_replaced_and_taken() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        assert_eq!(chunk.replace_subchunk_mesh(3, Some(MeshHandle(7))), None);
        assert_eq!(
            chunk.replace_subchunk_mesh(3, Some(MeshHandle(8))),
            Some(MeshHandle(7))
        );
        assert_eq!(chunk.take_mesh_handles(), vec![MeshHandle(8)]);
        assert_eq!(chunk.subchunk(3).mesh(), None);
    }
}
