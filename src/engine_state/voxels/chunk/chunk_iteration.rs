//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air blocks of one subchunk.
//!
//! Because the grid is stored Y-major, a subchunk is a contiguous slice. The iterator
//! walks that slice with a running offset and rebuilds the local coordinate from it,
//! skipping air without any per-block coordinate math.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, CHUNK_PLANE_SIZE, CHUNK_WIDTH, SUBCHUNK_HEIGHT};

/// An iterator over all non-air blocks in a single subchunk.
///
/// Yields the chunk-local position of each block (with `y` in the full chunk range,
/// not relative to the subchunk) together with the block itself.
pub struct SubchunkBlockIterator<'a> {
    /// The subchunk's blocks
    blocks: &'a [Block],
    /// Current position in `blocks`
    current_offset: usize,
    /// Local height of the subchunk's bottom layer
    base_y: usize,
}

impl<'a> SubchunkBlockIterator<'a> {
    /// Creates an iterator over subchunk `index` of `chunk_ref`.
    ///
    /// # Panics
    /// Panics if `index` is not a valid subchunk index.
    pub fn new(chunk_ref: &'a Chunk, index: usize) -> Self {
        SubchunkBlockIterator {
            blocks: chunk_ref.subchunk_blocks(index),
            current_offset: 0,
            base_y: index * SUBCHUNK_HEIGHT as usize,
        }
    }
}

impl<'a> Iterator for SubchunkBlockIterator<'a> {
    type Item = (Point3<usize>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        // Skip air
        while self.current_offset < self.blocks.len() && self.blocks[self.current_offset].is_air()
        {
            self.current_offset += 1;
        }

        let offset = self.current_offset;
        let block = *self.blocks.get(offset)?;
        self.current_offset += 1;

        let width = CHUNK_WIDTH as usize;
        let position = Point3::new(
            (offset % CHUNK_PLANE_SIZE) / width,
            self.base_y + offset / CHUNK_PLANE_SIZE,
            offset % width,
        );
        Some((position, block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.blocks.len() - self.current_offset))
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    #[test]
    fn yields_only_solid_blocks_with_chunk_positions() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(1, 17, 2, Block::DIRT);
        chunk.set_block_at(15, 31, 0, Block::STONE);
        chunk.set_block_at(0, 0, 0, Block::GRASS);

        let blocks: Vec<_> = SubchunkBlockIterator::new(&chunk, 1).collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(1, 17, 2), Block::DIRT),
                (Point3::new(15, 31, 0), Block::STONE),
            ]
        );
    }

    #[test]
    fn empty_subchunk_yields_nothing() {
        let chunk = Chunk::empty(Point2::new(0, 0));
        assert_eq!(SubchunkBlockIterator::new(&chunk, 23).count(), 0);
    }
}
