//! # World Module
//!
//! This module provides the `World` struct, the authoritative store of loaded chunks.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only chunks the scheduler has generated are kept,
//! keyed by chunk coordinate. Each chunk lives in an [`MtResource`] so meshing jobs
//! can hold it (and its neighbors) while the coordinating thread keeps the map.
//!
//! ## Neighbor Links
//!
//! Chunks reference their four horizontal neighbors by coordinate. Links are only
//! ever written by [`World::insert_chunk`] and [`World::remove_chunk`], which update
//! both sides of every link together, so a chunk `A` naming `B` to the east always
//! means `B` names `A` to the west.
//!
//! ## Block Access
//!
//! [`World::get_block`] and [`World::set_block`] take world block coordinates and are
//! total: unloaded chunks and heights outside the world read as air and ignore writes.

use std::collections::HashMap;

use cgmath::{Point2, Point3};

use crate::core::MtResource;

use super::block::{block_side::BlockSide, Block};
use super::chunk::{Chunk, ChunkPosition, CHUNK_HEIGHT, CHUNK_WIDTH};

/// Chunk coordinate containing world column `(x, z)`.
pub fn chunk_position_for(x: i32, z: i32) -> ChunkPosition {
    Point2::new(x.div_euclid(CHUNK_WIDTH), z.div_euclid(CHUNK_WIDTH))
}

/// Chunk coordinate containing a real-valued world position (the observer's chunk).
pub fn chunk_position_for_point(position: Point3<f32>) -> ChunkPosition {
    chunk_position_for(position.x.floor() as i32, position.z.floor() as i32)
}

/// A broken neighbor link found by [`World::neighbor_asymmetries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborAsymmetry {
    /// Chunk holding the link
    pub chunk: ChunkPosition,
    /// Direction of the link
    pub side: BlockSide,
    /// Coordinate the link names
    pub target: ChunkPosition,
}

/// Represents a voxel world composed of 16x384x16 chunk columns.
///
/// # Examples
///
/// ```ignore
/// let mut world = World::new();
/// world.insert_chunk(generator.generate(Point2::new(0, 0)));
///
/// if let Some(chunk) = world.get_chunk_at(Point2::new(0, 0)) {
///     let block = chunk.get().get_block_at(0, 100, 0);
/// }
/// ```
#[derive(Default)]
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<ChunkPosition, MtResource<Chunk>>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether a chunk is loaded at `position`.
    pub fn contains(&self, position: ChunkPosition) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Coordinates of every loaded chunk, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.chunks.keys().copied()
    }

    /// Retrieves a shared handle to the chunk at `position`.
    pub fn get_chunk_at(&self, position: ChunkPosition) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    /// Adds a chunk and links it symmetrically to every loaded horizontal neighbor.
    ///
    /// A chunk already stored at the same coordinate is removed (and unlinked) first.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> MtResource<Chunk> {
        let position = chunk.position();
        if self.contains(position) {
            log::warn!("Replacing already loaded chunk at {:?}", position);
            self.remove_chunk(position);
        }

        let chunk = MtResource::new(chunk);
        self.chunks.insert(position, chunk.clone());

        for side in BlockSide::horizontal() {
            self.link(position, side);
        }

        chunk
    }

    /// Removes the chunk at `position`, clearing every link that points at it.
    ///
    /// Returns the removed chunk so its resources can be released.
    pub fn remove_chunk(&mut self, position: ChunkPosition) -> Option<MtResource<Chunk>> {
        let chunk = self.chunks.remove(&position)?;

        for side in BlockSide::horizontal() {
            let neighbor = chunk.get().neighbor(side);
            if let Some(neighbor) = neighbor.and_then(|p| self.chunks.get(&p)) {
                neighbor.get_mut().set_neighbor(side.opposite(), None);
            }
            chunk.get_mut().set_neighbor(side, None);
        }

        Some(chunk)
    }

    /// Links the chunk at `position` with its neighbor in direction `side`, on both
    /// sides, if both are loaded.
    fn link(&self, position: ChunkPosition, side: BlockSide) {
        let neighbor_position = position + side.chunk_offset();
        let (Some(chunk), Some(neighbor)) = (
            self.chunks.get(&position),
            self.chunks.get(&neighbor_position),
        ) else {
            return;
        };

        chunk.get_mut().set_neighbor(side, Some(neighbor_position));
        neighbor.get_mut().set_neighbor(side.opposite(), Some(position));
    }

    /// Whether every horizontal neighbor of `position` is loaded.
    pub fn has_all_neighbors(&self, position: ChunkPosition) -> bool {
        BlockSide::horizontal()
            .into_iter()
            .all(|side| self.contains(position + side.chunk_offset()))
    }

    /// Every link that lacks its reverse link or names an unloaded chunk. Empty when
    /// the world is consistent.
    pub fn neighbor_asymmetries(&self) -> Vec<NeighborAsymmetry> {
        let mut broken = Vec::new();
        for (&position, chunk) in &self.chunks {
            for side in BlockSide::horizontal() {
                let Some(target) = chunk.get().neighbor(side) else {
                    // A missing link is only broken if the neighbor is loaded
                    if self.contains(position + side.chunk_offset()) {
                        broken.push(NeighborAsymmetry {
                            chunk: position,
                            side,
                            target: position + side.chunk_offset(),
                        });
                    }
                    continue;
                };

                let reverse = self
                    .chunks
                    .get(&target)
                    .and_then(|neighbor| neighbor.get().neighbor(side.opposite()));
                if target != position + side.chunk_offset() || reverse != Some(position) {
                    broken.push(NeighborAsymmetry {
                        chunk: position,
                        side,
                        target,
                    });
                }
            }
        }
        broken
    }

    /// Splits a world block coordinate into the owning chunk and the local coordinate.
    /// `None` when `y` is outside the world.
    fn locate(x: i32, y: i32, z: i32) -> Option<(ChunkPosition, usize, usize, usize)> {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return None;
        }
        Some((
            chunk_position_for(x, z),
            x.rem_euclid(CHUNK_WIDTH) as usize,
            y as usize,
            z.rem_euclid(CHUNK_WIDTH) as usize,
        ))
    }

    /// The block at world coordinates `(x, y, z)`; air if the chunk is not loaded or
    /// `y` is outside the world.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        let Some((position, local_x, local_y, local_z)) = Self::locate(x, y, z) else {
            return Block::AIR;
        };
        self.chunks
            .get(&position)
            .map(|chunk| chunk.get().get_block_at(local_x, local_y, local_z))
            .unwrap_or(Block::AIR)
    }

    /// Sets the block at world coordinates `(x, y, z)` and marks the owning subchunk
    /// dirty. Does nothing if the chunk is not loaded or `y` is outside the world.
    ///
    /// A block on the chunk's edge also dirties the same subchunk of each linked
    /// neighbor across that edge, since the neighbor's faces against the edge depend on
    /// it.
    ///
    /// Returns whether the block was written.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> bool {
        let Some((position, local_x, local_y, local_z)) = Self::locate(x, y, z) else {
            return false;
        };
        let Some(chunk) = self.chunks.get(&position) else {
            return false;
        };

        let across: Vec<ChunkPosition> = {
            let mut chunk = chunk.get_mut();
            chunk.set_block_at(local_x, local_y, local_z, block);
            Self::edge_sides(local_x, local_z)
                .filter_map(|side| chunk.neighbor(side))
                .collect()
        };

        // One chunk lock at a time
        let subchunk = Chunk::subchunk_index_for_y(local_y);
        for neighbor in across {
            if let Some(neighbor) = self.chunks.get(&neighbor) {
                neighbor.get_mut().set_subchunk_dirty(subchunk, true);
            }
        }
        true
    }

    /// Horizontal sides whose edge the local column `(x, z)` lies on.
    fn edge_sides(x: usize, z: usize) -> impl Iterator<Item = BlockSide> {
        let last = CHUNK_WIDTH as usize - 1;
        [
            (z == 0, BlockSide::NORTH),
            (x == last, BlockSide::EAST),
            (z == last, BlockSide::SOUTH),
            (x == 0, BlockSide::WEST),
        ]
        .into_iter()
        .filter_map(|(on_edge, side)| on_edge.then_some(side))
    }
}
