//! # Chunk Creation Module
//!
//! This module provides a cursor-based builder that populates a chunk one column at a
//! time, from the top of the world downward. That is the order terrain classification
//! produces blocks in, so the generator never has to compute indices itself.

use crate::engine_state::voxels::block::Block;

use super::{Chunk, ChunkPosition, CHUNK_HEIGHT, CHUNK_WIDTH};

/// A builder that fills a chunk column by column.
///
/// Columns are visited with X as the outer axis and Z as the inner axis. Inside a
/// column, blocks are pushed from `CHUNK_HEIGHT - 1` down to `0`.
///
/// The chunk under construction is owned by the builder, so no other code can observe
/// it half-populated. Writing blocks through the builder never marks subchunks dirty.
pub struct ChunkCreationIterator {
    chunk: Chunk,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
    /// Number of blocks pushed so far
    pushed: usize,
}

impl ChunkCreationIterator {
    /// Creates a builder for an all-air chunk at `position`, with the cursor at the top
    /// of column `(0, 0)`.
    pub fn new(position: ChunkPosition) -> Self {
        ChunkCreationIterator {
            chunk: Chunk::empty(position),
            local_x: 0,
            local_y: CHUNK_HEIGHT as usize - 1,
            local_z: 0,
            pushed: 0,
        }
    }

    /// The column the cursor is in, as local `(x, z)`.
    pub fn current_column(&self) -> (usize, usize) {
        (self.local_x, self.local_z)
    }

    /// Whether every block of the chunk has been pushed.
    pub fn is_complete(&self) -> bool {
        self.local_x == CHUNK_WIDTH as usize
    }

    /// Writes `block` at the cursor and moves the cursor one block down, wrapping to
    /// the top of the next column when the current one is finished.
    ///
    /// # Panics
    /// Panics if the chunk is already complete.
    pub fn push_block(&mut self, block: Block) {
        assert!(!self.is_complete(), "pushed past the end of the chunk");

        if !block.is_air() {
            self.chunk
                .write_block_at(self.local_x, self.local_y, self.local_z, block);
        }
        self.pushed += 1;

        if self.local_y > 0 {
            self.local_y -= 1;
            return;
        }

        // Column finished, move to the top of the next one
        self.local_y = CHUNK_HEIGHT as usize - 1;
        self.local_z += 1;
        if self.local_z == CHUNK_WIDTH as usize {
            self.local_z = 0;
            self.local_x += 1;
        }
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    ///
    /// Columns that were never pushed stay air.
    pub fn return_chunk(self) -> Chunk {
        self.chunk
    }

    /// Number of blocks pushed so far.
    pub fn pushed(&self) -> usize {
        self.pushed
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;

    #[test]
    fn pushes_fill_columns_top_down() {
        let mut cci = ChunkCreationIterator::new(Point2::new(0, 0));
        cci.push_block(Block::GRASS);
        cci.push_block(Block::DIRT);
        for _ in 2..CHUNK_HEIGHT {
            cci.push_block(Block::AIR);
        }
        assert_eq!(cci.current_column(), (0, 1));
        cci.push_block(Block::STONE);

        let chunk = cci.return_chunk();
        assert_eq!(chunk.get_block_at(0, 383, 0), Block::GRASS);
        assert_eq!(chunk.get_block_at(0, 382, 0), Block::DIRT);
        assert_eq!(chunk.get_block_at(0, 381, 0), Block::AIR);
        assert_eq!(chunk.get_block_at(0, 383, 1), Block::STONE);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn completes_after_every_block() {
        let mut cci = ChunkCreationIterator::new(Point2::new(0, 0));
        for _ in 0..CHUNK_SIZE {
            cci.push_block(Block::STONE);
        }
        assert!(cci.is_complete());
        assert_eq!(cci.pushed(), CHUNK_SIZE);
        assert!(cci
            .return_chunk()
            .blocks()
            .iter()
            .all(|block| *block == Block::STONE));
    }
}
