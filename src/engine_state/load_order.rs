//! Nearest-first chunk load order.

use cgmath::Vector2;

use super::voxels::chunk::ChunkPosition;

/// Chunk offsets covering a square window, sorted by distance from its center.
///
/// Computed once and re-centered on the observer every tick by translation.
#[derive(Clone, Debug)]
pub struct LoadOrder {
    offsets: Vec<Vector2<i32>>,
    half_width: i32,
}

impl LoadOrder {
    /// Covers the square of half-width `view_distance + 1`. The extra ring is
    /// generated but never meshed; it exists so every meshed chunk has neighbors.
    pub fn new(view_distance: u32) -> Self {
        let half_width = view_distance as i32 + 1;

        let mut offsets = Vec::with_capacity(((2 * half_width + 1) * (2 * half_width + 1)) as usize);
        for x in -half_width..=half_width {
            for z in -half_width..=half_width {
                offsets.push(Vector2::new(x, z));
            }
        }
        // Stable, so equal distances keep the x-major scan order
        offsets.sort_by_key(|offset| offset.x * offset.x + offset.y * offset.y);

        LoadOrder {
            offsets,
            half_width,
        }
    }

    /// Half-width of the window, in chunks.
    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    /// Number of coordinates in the window.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the window is empty. It never is.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The window's coordinates around `center`, nearest first.
    pub fn around(&self, center: ChunkPosition) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.offsets.iter().map(move |offset| center + offset)
    }

    /// Whether `position` is inside the window around `center`.
    pub fn contains(&self, center: ChunkPosition, position: ChunkPosition) -> bool {
        (position.x - center.x).abs() <= self.half_width
            && (position.y - center.y).abs() <= self.half_width
    }
}
