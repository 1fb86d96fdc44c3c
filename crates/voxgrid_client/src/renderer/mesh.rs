use std::time::Instant;

use glam::IVec3;
use tracing::debug;
use voxgrid_shared::chunk::ChunkData;
use voxgrid_shared::coords::{ChunkPos, LocalPos, CHUNK_SIZE};
use voxgrid_shared::voxel::{VoxelId, VoxelTable};

use super::ao::Neighborhood;
use super::face::FaceDirection;

const INITIAL_SOLID_FACES: usize = 2_048;
const INITIAL_FLUID_FACES: usize = 256;

/// One emitted quad: a side of the voxel at `position` (chunk-local).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChunkFace {
    pub position: IVec3,
    pub direction: FaceDirection,
    pub texture: u16,
    pub shade: f32,
    /// Per-vertex occlusion in face-table vertex order; 1.0 is fully lit.
    pub ao: [f32; 4],
}

impl ChunkFace {
    pub fn vertex_positions(&self) -> [[f32; 3]; 4] {
        let base = self.position.as_vec3().to_array();
        let face = self.direction.descriptor();
        std::array::from_fn(|i| {
            let [cx, cy, cz] = face.corner(i);
            [base[0] + cx, base[1] + cy, base[2] + cz]
        })
    }

    /// Final per-vertex brightness: the face's base shade times its AO.
    pub fn vertex_shades(&self) -> [f32; 4] {
        self.ao.map(|ao| ao * self.shade)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub faces: Vec<ChunkFace>,
}

impl ChunkMesh {
    pub fn with_capacity(faces: usize) -> Self {
        Self {
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn add_face(&mut self, face: ChunkFace) {
        self.faces.push(face);
    }

    pub fn faces(&self) -> &[ChunkFace] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Everything produced for one chunk. Solid and fluid geometry are kept
/// apart because fluids draw in a separate translucent pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMeshCollection {
    pub position: ChunkPos,
    pub solid: ChunkMesh,
    pub fluid: ChunkMesh,
}

impl ChunkMeshCollection {
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            solid: ChunkMesh::with_capacity(INITIAL_SOLID_FACES),
            fluid: ChunkMesh::with_capacity(INITIAL_FLUID_FACES),
        }
    }

    pub fn face_count(&self) -> usize {
        self.solid.len() + self.fluid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.fluid.is_empty()
    }
}

/// A face between `voxel` and `neighbor` is drawn when the neighbor lets
/// light through and is not the very same voxel id. Two cells of one fluid
/// merge without a seam; different fluids still get a face between them.
pub fn should_emit_face(table: &VoxelTable, voxel: VoxelId, neighbor: VoxelId) -> bool {
    table.is_see_through(neighbor) && neighbor != voxel
}

/// Meshes a chunk without looking at any adjacent chunk: everything outside
/// the grid reads as air, so the chunk border always gets faces.
///
/// # Panics
///
/// Panics if the chunk holds an id the table does not define.
pub fn build_chunk_meshes(chunk: &ChunkData, table: &VoxelTable) -> ChunkMeshCollection {
    let started = Instant::now();
    let mut meshes = ChunkMeshCollection::new(chunk.position());

    for y in 0..CHUNK_SIZE as u8 {
        for z in 0..CHUNK_SIZE as u8 {
            for x in 0..CHUNK_SIZE as u8 {
                let local = LocalPos::new(x, y, z);
                let voxel = chunk.get(local);
                if voxel.is_air() {
                    continue;
                }

                let props = table.get(voxel);
                let mesh = if props.is_solid() {
                    &mut meshes.solid
                } else {
                    &mut meshes.fluid
                };

                let block = local.as_ivec();
                for direction in FaceDirection::ALL {
                    let neighbor = chunk.get_checked(block + direction.normal());
                    if !should_emit_face(table, voxel, neighbor) {
                        continue;
                    }

                    // Top appears once in ALL, so the neighborhood is sampled at most once per voxel.
                    let ao = if direction == FaceDirection::Top {
                        Neighborhood::sample(chunk, table, block).top_face_ao()
                    } else {
                        [1.0; 4]
                    };

                    mesh.add_face(ChunkFace {
                        position: block,
                        direction,
                        texture: props.texture(direction.texture_slot()),
                        shade: direction.descriptor().shade,
                        ao,
                    });
                }
            }
        }
    }

    debug!(
        "Meshed chunk {:?}: {} solid faces, {} fluid faces in {:.2?}",
        chunk.position(),
        meshes.solid.len(),
        meshes.fluid.len(),
        started.elapsed()
    );
    meshes
}
