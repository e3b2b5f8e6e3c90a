use cgmath::Point3;

use crate::engine_state::{
    rendering::{texture_atlas::UvRect, Vertex},
    voxels::block::block_side::BlockSide,
};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right,
/// upper-left) in chunk coordinates. The corners go counter-clockwise when the face is
/// seen from outside the block, so the two triangles emitted by [`Face::vertices`] share
/// that winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<usize>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<usize>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<usize>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<usize>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face of the voxel at `(i, j, k)` on `block_side`.
    pub fn new(i: usize, j: usize, k: usize, block_side: BlockSide) -> Self {
        let (ll, lr, ur, ul) = match block_side {
            BlockSide::NORTH => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
            ),

            BlockSide::SOUTH => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k + 1),
            ),

            BlockSide::EAST => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),

            BlockSide::WEST => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i, j + 1, k),
            ),

            BlockSide::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),

            BlockSide::BOTTOM => (
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ur,
            ul,
            block_side,
        }
    }

    /// The face as two triangles, `(ll, lr, ur)` and `(ll, ur, ul)`, textured with
    /// `uvs`. Image space has V growing downward, so the lower corners take `v_max`.
    pub fn vertices(&self, uvs: UvRect) -> [Vertex; 6] {
        let normal = self.block_side.normal();
        let ll = Vertex::new(self.ll, normal, [uvs.u, uvs.v_max()]);
        let lr = Vertex::new(self.lr, normal, [uvs.u_max(), uvs.v_max()]);
        let ur = Vertex::new(self.ur, normal, [uvs.u_max(), uvs.v]);
        let ul = Vertex::new(self.ul, normal, [uvs.u, uvs.v]);

        [ll, lr, ur, ll, ur, ul]
    }
}
