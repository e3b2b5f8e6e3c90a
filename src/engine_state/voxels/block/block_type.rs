//! # Block Type Module
//!
//! This module defines the fixed registry of block types in the voxel world and the
//! string identifiers each one is known by.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types in the voxel world.
///
/// The discriminant doubles as the compact storage value of a [`super::Block`].
/// The `FromPrimitive` derive allows conversion back from that stored integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    AIR = 0,

    /// The surface block of generated terrain.
    /// The top is grass, the sides have grass on dirt, and the bottom is plain dirt.
    GRASS = 1,

    /// The two layers directly below the surface.
    DIRT = 2,

    /// Everything deeper than the dirt layers.
    STONE = 3,
}

/// Every registered block type, in discriminant order.
pub const ALL_BLOCK_TYPES: [BlockType; 4] = [
    BlockType::AIR,
    BlockType::GRASS,
    BlockType::DIRT,
    BlockType::STONE,
];

/// Lookup from string identifier to block type.
pub static BLOCK_TYPES_BY_ID: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "grass" => BlockType::GRASS,
    "dirt" => BlockType::DIRT,
    "stone" => BlockType::STONE,
};

impl BlockType {
    /// The unique string identifier of this block type.
    pub const fn id(self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::GRASS => "grass",
            BlockType::DIRT => "dirt",
            BlockType::STONE => "stone",
        }
    }

    /// Converts a stored `BlockTypeSize` back into a `BlockType`.
    ///
    /// Unknown values resolve to `AIR`, matching how the world treats any voxel it
    /// cannot account for.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num_traits::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Looks up a block type by its string identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        BLOCK_TYPES_BY_ID.get(id).copied()
    }
}
