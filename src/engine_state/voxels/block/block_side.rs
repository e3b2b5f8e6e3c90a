//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. The four horizontal sides also
//! name the cardinal directions between neighboring chunks.

use cgmath::{Vector2, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// North faces negative Z, south positive Z, east positive X and west negative X.
/// The first four variants are the horizontal directions, in the order the chunk
/// neighbor slots use.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing negative Z
    NORTH = 0,

    /// Facing positive X
    EAST = 1,

    /// Facing positive Z
    SOUTH = 2,

    /// Facing negative X
    WEST = 3,

    /// Facing positive Y
    TOP = 4,

    /// Facing negative Y
    BOTTOM = 5,
}

impl BlockSide {
    /// All six block faces in a consistent order.
    pub const fn all() -> [BlockSide; 6] {
        [
            BlockSide::NORTH,
            BlockSide::EAST,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::TOP,
            BlockSide::BOTTOM,
        ]
    }

    /// The four cardinal directions that connect neighboring chunks.
    pub const fn horizontal() -> [BlockSide; 4] {
        [
            BlockSide::NORTH,
            BlockSide::EAST,
            BlockSide::SOUTH,
            BlockSide::WEST,
        ]
    }

    /// The face pointing the other way.
    pub const fn opposite(self) -> BlockSide {
        match self {
            BlockSide::NORTH => BlockSide::SOUTH,
            BlockSide::EAST => BlockSide::WEST,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::BOTTOM => BlockSide::TOP,
        }
    }

    /// Unit step from a voxel to the voxel this face touches.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::NORTH => Vector3::new(0, 0, -1),
            BlockSide::EAST => Vector3::new(1, 0, 0),
            BlockSide::SOUTH => Vector3::new(0, 0, 1),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
        }
    }

    /// Step between chunk coordinates in this direction.
    ///
    /// Only meaningful for the horizontal sides; vertical sides map to zero since
    /// chunks span the full world height.
    pub fn chunk_offset(self) -> Vector2<i32> {
        let offset = self.offset();
        Vector2::new(offset.x, offset.z)
    }

    /// Outward face normal.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Lowercase name used by the texture atlas tables.
    pub const fn name(self) -> &'static str {
        match self {
            BlockSide::NORTH => "north",
            BlockSide::EAST => "east",
            BlockSide::SOUTH => "south",
            BlockSide::WEST => "west",
            BlockSide::TOP => "top",
            BlockSide::BOTTOM => "bottom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_cancel_out() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn horizontal_sides_index_neighbor_slots() {
        for (index, side) in BlockSide::horizontal().into_iter().enumerate() {
            assert_eq!(side as usize, index);
            assert_eq!(side.offset().y, 0);
        }
    }
}
