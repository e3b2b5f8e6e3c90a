//! Texture atlas layout.
//!
//! Every block face maps to a 16x16 source image. Distinct images are packed left to
//! right into a single row of tiles, and each (block, face) pair resolves to the UV
//! rectangle of its tile. Only the layout lives here; decoding and blitting the images
//! is left to the rendering collaborator, which can follow [`TextureAtlas::image_names`].

use std::collections::HashMap;

use crate::engine_state::voxels::block::{
    block_side::BlockSide,
    block_type::{BlockType, ALL_BLOCK_TYPES},
    Block,
};

/// Edge length of one atlas tile, in pixels.
pub const TILE_SIZE: u32 = 16;

/// Source image for each `"{block id}_{face name}"` key.
static FACE_IMAGES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "grass_north" => "grass.png",
    "grass_east" => "grass.png",
    "grass_south" => "grass.png",
    "grass_west" => "grass.png",
    "grass_top" => "grass_top.png",
    "grass_bottom" => "dirt.png",

    "dirt_north" => "dirt.png",
    "dirt_east" => "dirt.png",
    "dirt_south" => "dirt.png",
    "dirt_west" => "dirt.png",
    "dirt_top" => "dirt.png",
    "dirt_bottom" => "dirt.png",

    "stone_north" => "stone.png",
    "stone_east" => "stone.png",
    "stone_south" => "stone.png",
    "stone_west" => "stone.png",
    "stone_top" => "stone.png",
    "stone_bottom" => "stone.png",
};

/// The source image name for a block face, if the block is drawn at all.
pub fn face_image(block: Block, side: BlockSide) -> Option<&'static str> {
    FACE_IMAGES
        .get(format!("{}_{}", block.id(), side.name()).as_str())
        .copied()
}

/// Normalized texture rectangle: origin `(u, v)` and extent `(width, height)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    /// Left edge
    pub u: f32,
    /// Top edge
    pub v: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl UvRect {
    /// Right edge.
    pub fn u_max(&self) -> f32 {
        self.u + self.width
    }

    /// Bottom edge.
    pub fn v_max(&self) -> f32 {
        self.v + self.height
    }
}

/// Packed atlas layout for every drawable block face.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    /// Images in tile order
    image_names: Vec<&'static str>,
    /// Keyed by block type and face
    uv_lookup: HashMap<(BlockType, BlockSide), UvRect>,
    width: u32,
    height: u32,
}

impl TextureAtlas {
    /// Builds the layout. Tiles are assigned in block registry order, then face order,
    /// the first time each image is seen.
    pub fn new() -> Self {
        let mut image_names: Vec<&'static str> = Vec::new();
        let mut tile_for_face = Vec::new();

        for block_type in ALL_BLOCK_TYPES {
            for side in BlockSide::all() {
                let Some(image) = face_image(Block::new(block_type), side) else {
                    continue;
                };
                let tile = match image_names.iter().position(|name| *name == image) {
                    Some(tile) => tile,
                    None => {
                        image_names.push(image);
                        image_names.len() - 1
                    }
                };
                tile_for_face.push(((block_type, side), tile));
            }
        }

        let width = image_names.len() as u32 * TILE_SIZE;
        let height = TILE_SIZE;

        let uv_lookup = tile_for_face
            .into_iter()
            .map(|(key, tile)| {
                let rect = UvRect {
                    u: (tile as u32 * TILE_SIZE) as f32 / width as f32,
                    v: 0.0,
                    width: TILE_SIZE as f32 / width as f32,
                    height: TILE_SIZE as f32 / height as f32,
                };
                (key, rect)
            })
            .collect();

        log::debug!("Texture atlas packed {} images", image_names.len());

        TextureAtlas {
            image_names,
            uv_lookup,
            width,
            height,
        }
    }

    /// Source images in tile order, left to right.
    pub fn image_names(&self) -> &[&'static str] {
        &self.image_names
    }

    /// Atlas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// UV rectangle for a block face; `None` for blocks that are never drawn.
    pub fn uv_rect(&self, block: Block, side: BlockSide) -> Option<UvRect> {
        self.uv_lookup.get(&(block.block_type(), side)).copied()
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_images_get_one_tile_each() {
        let atlas = TextureAtlas::new();
        assert_eq!(
            atlas.image_names(),
            &["grass.png", "grass_top.png", "dirt.png", "stone.png"]
        );
        assert_eq!((atlas.width(), atlas.height()), (64, 16));
    }

    #[test]
    fn grass_faces_use_their_own_images() {
        let atlas = TextureAtlas::new();
        let side = atlas.uv_rect(Block::GRASS, BlockSide::EAST).unwrap();
        let top = atlas.uv_rect(Block::GRASS, BlockSide::TOP).unwrap();
        let bottom = atlas.uv_rect(Block::GRASS, BlockSide::BOTTOM).unwrap();

        assert_eq!(side.u, 0.0);
        assert_eq!(top.u, 0.25);
        assert_eq!(bottom, atlas.uv_rect(Block::DIRT, BlockSide::NORTH).unwrap());
        assert_eq!(side.width, 0.25);
        assert_eq!(side.height, 1.0);
        assert_eq!(side.u_max(), 0.25);
    }

    #[test]
    fn air_has_no_uvs() {
        let atlas = TextureAtlas::new();
        for side in BlockSide::all() {
            assert!(atlas.uv_rect(Block::AIR, side).is_none());
            assert!(face_image(Block::AIR, side).is_none());
        }
    }
}
