//! Corner-sampled ambient occlusion for top faces.
//!
//! The 3x3x3 block around a voxel is classified once into a 27-bit solidity
//! mask. Each top-face corner then reads three bits from the layer above:
//! the two edge neighbours touching that corner and the diagonal between them.

use glam::IVec3;
use voxgrid_shared::chunk::ChunkData;
use voxgrid_shared::voxel::VoxelTable;

use super::face::TOP_FACE;

/// Corner brightness for 0, 1, 2 and 3 solid contributors (`1 - n / 5`).
pub const AO_LEVELS: [f32; 4] = [1.0, 0.8, 0.6, 0.4];

pub fn corner_ao(side_a: bool, side_b: bool, diagonal: bool) -> f32 {
    let count = usize::from(side_a) + usize::from(side_b) + usize::from(diagonal);
    AO_LEVELS[count]
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    solid: u32,
}

impl Neighborhood {
    pub fn sample(chunk: &ChunkData, table: &VoxelTable, center: IVec3) -> Self {
        Self::from_fn(|offset| table.is_solid(chunk.get_checked(center + offset)))
    }

    /// Builds a mask by asking `is_solid` about every offset in `-1..=1`^3.
    pub fn from_fn(mut is_solid: impl FnMut(IVec3) -> bool) -> Self {
        let mut solid = 0u32;
        for dy in -1..=1 {
            for dz in -1..=1 {
                for dx in -1..=1 {
                    let offset = IVec3::new(dx, dy, dz);
                    if is_solid(offset) {
                        solid |= 1 << bit_index(offset);
                    }
                }
            }
        }
        Self { solid }
    }

    pub fn is_solid(&self, offset: IVec3) -> bool {
        self.solid & (1 << bit_index(offset)) != 0
    }

    pub fn solid_count(&self) -> u32 {
        self.solid.count_ones()
    }

    /// Per-vertex AO for the top face, in `TOP_FACE` vertex order.
    ///
    /// A vertex at corner offset `(ox, 1, oz)` samples the cells above the
    /// voxel at `(sx, 0)`, `(0, sz)` and `(sx, sz)` where `s = 2 * o - 1`.
    /// With the current vertex order that is (+X,-Z), (-X,-Z), (-X,+Z), (+X,+Z).
    pub fn top_face_ao(&self) -> [f32; 4] {
        let mut ao = [1.0f32; 4];
        for (i, value) in ao.iter_mut().enumerate() {
            let [ox, _, oz] = TOP_FACE.corner(i);
            let sx = if ox > 0.5 { 1 } else { -1 };
            let sz = if oz > 0.5 { 1 } else { -1 };

            *value = corner_ao(
                self.is_solid(IVec3::new(sx, 1, 0)),
                self.is_solid(IVec3::new(0, 1, sz)),
                self.is_solid(IVec3::new(sx, 1, sz)),
            );
        }
        ao
    }
}

fn bit_index(offset: IVec3) -> u32 {
    debug_assert!(offset.abs().max_element() <= 1, "offset outside 3x3x3: {offset}");
    ((offset.y + 1) * 9 + (offset.z + 1) * 3 + (offset.x + 1)) as u32
}
