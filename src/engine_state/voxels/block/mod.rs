//! # Block Module
//!
//! This module provides the block identity value stored in every voxel, the registry
//! of block types, and the six faces a block can expose.

use std::fmt;

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// A `Block` is an interned identity: it wraps an index into the fixed block registry,
/// so two blocks are equal exactly when their string identifiers are equal. Blocks are
/// never mutated; changing a voxel means storing a different `Block`.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the `Pod` derive keep the voxel grid castable to raw
/// bytes, one byte per voxel.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    block_type: BlockTypeSize,
}

impl Block {
    /// Empty space.
    pub const AIR: Block = Block::new(BlockType::AIR);
    /// Surface block.
    pub const GRASS: Block = Block::new(BlockType::GRASS);
    /// Sub-surface block.
    pub const DIRT: Block = Block::new(BlockType::DIRT);
    /// Deep block.
    pub const STONE: Block = Block::new(BlockType::STONE);

    /// Creates a block of the specified type.
    pub const fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Resolves a registered identifier such as `"stone"` to its block.
    pub fn from_id(id: &str) -> Option<Self> {
        BlockType::from_id(id).map(Block::new)
    }

    /// The block's type in the registry.
    pub fn block_type(self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// The block's unique string identifier.
    pub fn id(self) -> &'static str {
        self.block_type().id()
    }

    /// `true` for air.
    pub fn is_air(self) -> bool {
        self == Block::AIR
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.id())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_follows_identifier() {
        assert_eq!(Block::from_id("grass"), Some(Block::GRASS));
        assert_ne!(Block::GRASS, Block::DIRT);
        assert_eq!(Block::STONE.to_string(), "stone");
        assert!(Block::default().is_air());
    }
}
