//! Block picking.
//!
//! Casts a ray through the voxel grid one cell at a time (Amanatides and Woo traversal),
//! reading blocks only through [`World::get_block`].

use cgmath::{InnerSpace, Point3, Vector3};

use super::block::{block_side::BlockSide, Block};
use super::world::World;

/// The first solid block a ray hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// World coordinates of the hit block
    pub block_position: Point3<i32>,
    /// The hit block
    pub block: Block,
    /// Face the ray entered through; `None` when the ray starts inside the block
    pub face: Option<BlockSide>,
    /// Distance along the ray to the entry point
    pub distance: f32,
}

impl PickHit {
    /// Cell on the entered side of the hit block, where a new block would be placed.
    pub fn adjacent_position(&self) -> Option<Point3<i32>> {
        self.face.map(|face| self.block_position + face.offset())
    }
}

/// Per-axis traversal state.
struct AxisStep {
    step: i32,
    t_delta: f32,
    t_max: f32,
}

impl AxisStep {
    fn new(origin: f32, direction: f32, cell: i32) -> Self {
        if direction > 0.0 {
            AxisStep {
                step: 1,
                t_delta: 1.0 / direction,
                t_max: (cell as f32 + 1.0 - origin) / direction,
            }
        } else if direction < 0.0 {
            AxisStep {
                step: -1,
                t_delta: -1.0 / direction,
                t_max: (cell as f32 - origin) / direction,
            }
        } else {
            AxisStep {
                step: 0,
                t_delta: f32::INFINITY,
                t_max: f32::INFINITY,
            }
        }
    }
}

/// Returns the first non-air block within `max_distance` of `origin` along
/// `direction`, or `None` if the ray only crosses air.
///
/// A zero direction yields `None` unless the origin cell itself is solid.
pub fn pick(
    world: &World,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<PickHit> {
    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );

    let start = world.get_block(cell.x, cell.y, cell.z);
    if !start.is_air() {
        return Some(PickHit {
            block_position: cell,
            block: start,
            face: None,
            distance: 0.0,
        });
    }

    if direction.magnitude2() == 0.0 {
        return None;
    }
    let direction = direction.normalize();

    let mut axes = [
        AxisStep::new(origin.x, direction.x, cell.x),
        AxisStep::new(origin.y, direction.y, cell.y),
        AxisStep::new(origin.z, direction.z, cell.z),
    ];

    loop {
        // Advance along the axis whose next boundary is closest
        let axis = if axes[0].t_max <= axes[1].t_max && axes[0].t_max <= axes[2].t_max {
            0
        } else if axes[1].t_max <= axes[2].t_max {
            1
        } else {
            2
        };

        let distance = axes[axis].t_max;
        if distance > max_distance {
            return None;
        }

        let step = axes[axis].step;
        cell[axis] += step;
        axes[axis].t_max += axes[axis].t_delta;

        let block = world.get_block(cell.x, cell.y, cell.z);
        if !block.is_air() {
            let face = match (axis, step > 0) {
                (0, true) => BlockSide::WEST,
                (0, false) => BlockSide::EAST,
                (1, true) => BlockSide::BOTTOM,
                (1, false) => BlockSide::TOP,
                (_, true) => BlockSide::NORTH,
                (_, false) => BlockSide::SOUTH,
            };
            return Some(PickHit {
                block_position: cell,
                block,
                face: Some(face),
                distance,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::chunk::Chunk;

    fn world_with_floor() -> World {
        let mut world = World::new();
        world.insert_chunk(Chunk::empty(Point2::new(0, 0)));
        world.insert_chunk(Chunk::empty(Point2::new(-1, 0)));
        for x in -16..16 {
            for z in 0..16 {
                world.set_block(x, 10, z, Block::STONE);
            }
        }
        world
    }

    #[test]
    fn looking_down_hits_the_top_face() {
        let world = world_with_floor();
        let hit = pick(
            &world,
            Point3::new(4.5, 20.5, 4.5),
            Vector3::new(0.0, -1.0, 0.0),
            32.0,
        )
        .expect("floor is in reach");

        assert_eq!(hit.block_position, Point3::new(4, 10, 4));
        assert_eq!(hit.block, Block::STONE);
        assert_eq!(hit.face, Some(BlockSide::TOP));
        assert!((hit.distance - 9.5).abs() < 1e-4);
        assert_eq!(hit.adjacent_position(), Some(Point3::new(4, 11, 4)));
    }

    #[test]
    fn rays_cross_into_negative_chunks() {
        let world = world_with_floor();
        let hit = pick(
            &world,
            Point3::new(2.5, 10.5, 3.5),
            Vector3::new(-1.0, 0.0, 0.0),
            10.0,
        );
        // Starting inside the floor layer
        assert_eq!(hit.map(|h| h.face), Some(None));

        let hit = pick(
            &world,
            Point3::new(0.5, 11.5, 3.5),
            Vector3::new(-1.0, -0.1, 0.0),
            30.0,
        )
        .expect("ray descends onto the floor");
        assert_eq!(hit.block_position.y, 10);
        assert!(hit.block_position.x < 0);
        assert_eq!(hit.face, Some(BlockSide::TOP));
    }

    #[test]
    fn misses_beyond_max_distance() {
        let world = world_with_floor();
        assert!(pick(
            &world,
            Point3::new(4.5, 30.5, 4.5),
            Vector3::new(0.0, -1.0, 0.0),
            5.0
        )
        .is_none());
        assert!(pick(
            &world,
            Point3::new(4.5, 30.5, 4.5),
            Vector3::new(0.0, 0.0, 0.0),
            5.0
        )
        .is_none());
    }
}
